use std::fmt;

use serde::Serialize;

/// Result recorded against a build.
///
/// Ladder: `Success` < `Unstable` < `Failure`. A result can only get worse
/// over a build's lifetime — see [`combine`](BuildResult::combine). The copy
/// step itself records at most `Unstable`: an I/O failure while copying the
/// log degrades the build, it never fails it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
}

impl BuildResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unstable => "unstable",
            Self::Failure => "failure",
        }
    }

    /// Process exit code reported for this result.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Unstable => 1,
            Self::Failure => 2,
        }
    }

    /// Combine two results, keeping the worse one.
    pub fn combine(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    fn severity(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Unstable => 1,
            Self::Failure => 2,
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
