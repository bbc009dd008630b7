//! Error taxonomy for pattern compilation, path matching and walking.
//!
//! A path that simply does not match is not an error; matching functions
//! return `None` for that.

use std::path::PathBuf;

use thiserror::Error;

use crate::WalkerError;
use crate::directive::Field;
use crate::pattern::Anchoring;

/// Errors raised by compiling patterns, matching paths and walking trees.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed pattern segment or structurally invalid pattern/path.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// A `..` segment appeared in a pattern or in a path.
    #[error("parent directory ('..') not allowed: {0}")]
    PathTraversal(String),

    /// Absolute path against a relative pattern, or the other way around.
    #[error("can not match {path_anchoring} path {path:?} against {pattern_anchoring} pattern {pattern:?}")]
    AnchoringMismatch {
        pattern: String,
        path: String,
        pattern_anchoring: Anchoring,
        path_anchoring: Anchoring,
    },

    /// A date view was requested but a required field was never matched.
    #[error("{0} was not matched, can not construct a date")]
    MissingField(Field),

    /// All date fields are present but do not name a calendar day.
    #[error("{year:04}-{month:02}-{day:02} is not a valid date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Patterns are text, so paths must be as well.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Listing a directory failed during a walk.
    #[error("failed to list {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: WalkerError,
    },
}
