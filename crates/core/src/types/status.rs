//! Health status enums.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single health check.
///
/// Variants are declared in ascending severity so the derived `Ord` ranks
/// `Pass < Warning < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Warning => "warning",
            Self::Fail => "fail",
        })
    }
}

/// Overall store health, ordered `Healthy < Warning < Unhealthy`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    #[default]
    Healthy,
    Warning,
    Unhealthy,
}

impl OverallStatus {
    /// Move to `to` if it is more severe; never lowers severity.
    ///
    /// ```
    /// use agent_helper_core::OverallStatus;
    ///
    /// let status = OverallStatus::Unhealthy.escalate(OverallStatus::Warning);
    /// assert_eq!(status, OverallStatus::Unhealthy);
    /// ```
    #[must_use]
    pub fn escalate(self, to: Self) -> Self {
        self.max(to)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Unhealthy => "unhealthy",
        })
    }
}
