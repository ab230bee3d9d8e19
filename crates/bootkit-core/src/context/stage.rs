//! Bootstrap lifecycle stages

use std::fmt;

/// Lifecycle of a [`RuntimeContext`](super::RuntimeContext).
///
/// Stages advance strictly in declaration order; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    PathsResolved,
    ConfigLoaded,
    PathsOverridden,
    DirectoriesEnsured,
    LoggingConfigured,
    Ready,
    Closed,
}

impl Stage {
    /// The stage that follows this one, or `None` once closed.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Uninitialized => Some(Self::PathsResolved),
            Self::PathsResolved => Some(Self::ConfigLoaded),
            Self::ConfigLoaded => Some(Self::PathsOverridden),
            Self::PathsOverridden => Some(Self::DirectoriesEnsured),
            Self::DirectoriesEnsured => Some(Self::LoggingConfigured),
            Self::LoggingConfigured => Some(Self::Ready),
            Self::Ready => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::PathsResolved => "paths-resolved",
            Self::ConfigLoaded => "config-loaded",
            Self::PathsOverridden => "paths-overridden",
            Self::DirectoriesEnsured => "directories-ensured",
            Self::LoggingConfigured => "logging-configured",
            Self::Ready => "ready",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
