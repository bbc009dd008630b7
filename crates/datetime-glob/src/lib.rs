//! datetime-glob: extract dates and times from paths.
//!
//! Patterns are glob wildcards (`*`, `?`) intermixed with a subset of
//! strftime directives (`%Y`, `%m`, `%d`, `%H`, `%M`, `%S`, `%f`, `%y`,
//! the unpadded `%-m`, `%-d`, `%-H`, `%-M`, `%-S`, and the literal `%%`).
//!
//! Provides:
//! - **tokenize** / **CompiledSegment**: compile one pattern segment into
//!   literal text or an anchored regex with a capture-group map
//! - **match_segment**: incremental matching that merges fields into a [`Match`]
//! - **Matcher**: whole-path matching and literal prefix splitting
//! - **Walker**: lazy, pattern-guided depth-first walk of a directory tree
//!
//! The walker is generic over `WalkerFs`, a minimal read-only filesystem
//! trait; [`LocalFs`] implements it over `std::fs`.
//!
//! ```no_run
//! for entry in datetime_glob::walk("/var/log/%Y-%m-%d/*.log")? {
//!     let (matched, path) = entry?;
//!     println!("{} {}", matched.as_date()?, path.display());
//! }
//! # Ok::<(), datetime_glob::Error>(())
//! ```

mod directive;
mod error;
mod lexer;
mod local;
mod matching;
mod pattern;
mod segment;
mod walker;

pub use directive::{Directive, Field};
pub use error::Error;
pub use lexer::{Token, tokenize};
pub use local::{LocalDirEntry, LocalFs};
pub use matching::{Match, days_in_month, match_segment};
pub use pattern::{Anchoring, Matcher};
pub use segment::CompiledSegment;
pub use walker::{ErrorPolicy, WalkOptions, Walker};

use std::path::Path;

/// Errors from filesystem operations within the walker.
#[derive(Debug, thiserror::Error)]
pub enum WalkerError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Minimal read-only filesystem abstraction for the walker.
///
/// Listing the direct children of a directory is the only capability the
/// walker needs.
pub trait WalkerFs {
    /// The directory entry type returned by `list_dir`.
    type DirEntry: WalkerDirEntry;

    /// List the entries in a directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<Self::DirEntry>, WalkerError>;
}

impl<F: WalkerFs + ?Sized> WalkerFs for &F {
    type DirEntry = F::DirEntry;

    fn list_dir(&self, path: &Path) -> Result<Vec<Self::DirEntry>, WalkerError> {
        (**self).list_dir(path)
    }
}

/// A single entry returned by `WalkerFs::list_dir`.
pub trait WalkerDirEntry {
    /// The entry name (file or directory name, not full path).
    fn name(&self) -> &str;

    /// True if this entry is a directory, or a symlink to one.
    fn is_dir(&self) -> bool;
}

/// Walk the local filesystem for paths matching `pattern`.
///
/// The pattern is compiled up front, so malformed patterns fail here rather
/// than during iteration. See [`Walker`] for the traversal rules.
pub fn walk(pattern: &str) -> Result<Walker<LocalFs>, Error> {
    let matcher = Matcher::new(pattern)?;
    Ok(Walker::new(LocalFs, &matcher))
}
