//! Close notifications delivered with `on_close`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known WebSocket close codes
pub mod close_codes {
    /// Normal closure
    pub const NORMAL: u16 = 1000;
    /// Endpoint going away (server shutdown, page navigation)
    pub const GOING_AWAY: u16 = 1001;
    /// Protocol error
    pub const PROTOCOL_ERROR: u16 = 1002;
    /// Close frame carried no status code
    pub const NO_STATUS: u16 = 1005;
    /// Connection dropped without a close frame
    pub const ABNORMAL: u16 = 1006;
    /// Server hit an unexpected condition
    pub const INTERNAL_ERROR: u16 = 1011;
}

/// Details of a finished connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseInfo {
    /// Numeric close code
    pub code: u16,
    /// Close reason sent by the peer, if any
    pub reason: String,
    /// Whether the closing handshake completed
    pub was_clean: bool,
}

impl CloseInfo {
    /// Creates close info from its parts
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>, was_clean: bool) -> Self {
        Self {
            code,
            reason: reason.into(),
            was_clean,
        }
    }

    /// Clean close with code 1000
    #[must_use]
    pub fn normal() -> Self {
        Self::new(close_codes::NORMAL, "", true)
    }

    /// Unclean close with code 1006
    #[must_use]
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(close_codes::ABNORMAL, reason, false)
    }

    /// Returns true for code 1000
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        self.code == close_codes::NORMAL
    }

    /// Classifies the close code
    #[must_use]
    pub const fn kind(&self) -> CloseKind {
        CloseKind::from_code(self.code)
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "code {}", self.code)
        } else {
            write!(f, "code {} ({})", self.code, self.reason)
        }
    }
}

/// Coarse classification of a close code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseKind {
    /// 1000
    Normal,
    /// 1001
    GoingAway,
    /// Dropped without a closing handshake (1006)
    Abnormal,
    /// Protocol-level failure (1002, 1003, 1007 to 1011)
    ProtocolError,
    /// Peer sent a close frame without a code (1005)
    NoStatus,
    /// Application-defined or unrecognised code
    Other,
}

impl CloseKind {
    /// Maps a numeric close code to its kind
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            close_codes::NORMAL => Self::Normal,
            close_codes::GOING_AWAY => Self::GoingAway,
            close_codes::ABNORMAL => Self::Abnormal,
            close_codes::NO_STATUS => Self::NoStatus,
            1002 | 1003 | 1007..=1011 => Self::ProtocolError,
            _ => Self::Other,
        }
    }

    /// Short label for status output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::GoingAway => "going away",
            Self::Abnormal => "abnormal",
            Self::ProtocolError => "protocol error",
            Self::NoStatus => "no status",
            Self::Other => "other",
        }
    }
}
