//! Whole-path patterns: compilation, matching and prefix splitting.
//!
//! A pattern is split on the host path separator. Empty and `.` segments
//! are dropped, so `a//b` and `a/./b` both mean `a/b`. `..` is rejected in
//! patterns and in the paths matched against them.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use crate::Error;
use crate::matching::{Match, match_segment};
use crate::segment::CompiledSegment;

/// Whether a pattern or path starts at the filesystem root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchoring {
    Absolute,
    Relative,
}

impl Anchoring {
    fn of(text: &str) -> Self {
        if text.starts_with(MAIN_SEPARATOR) {
            Anchoring::Absolute
        } else {
            Anchoring::Relative
        }
    }
}

impl fmt::Display for Anchoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchoring::Absolute => f.write_str("absolute"),
            Anchoring::Relative => f.write_str("relative"),
        }
    }
}

/// A compiled path pattern.
///
/// # Examples
/// ```
/// use datetime_glob::Matcher;
///
/// let matcher = Matcher::new("/var/log/%Y/%m/*-%d.log").unwrap();
/// let matched = matcher.match_path("/var/log/2016/12/app-02.log").unwrap().unwrap();
/// assert_eq!(matched.as_date().unwrap().to_string(), "2016-12-02");
///
/// assert!(matcher.match_path("/var/log/2016/12").unwrap().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pattern: String,
    segments: Vec<CompiledSegment>,
    anchoring: Anchoring,
}

impl Matcher {
    /// Compile `pattern`, one segment at a time.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        check_shape(pattern, "pattern")?;

        let segments = split_segments(pattern, "pattern")?
            .into_iter()
            .map(CompiledSegment::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            anchoring: Anchoring::of(pattern),
        })
    }

    /// The pattern this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled segments, with empty and `.` segments already dropped.
    pub fn segments(&self) -> &[CompiledSegment] {
        &self.segments
    }

    /// Whether the pattern starts at the root. Paths must agree.
    pub fn anchoring(&self) -> Anchoring {
        self.anchoring
    }

    /// Shorthand for `anchoring() == Anchoring::Absolute`.
    pub fn is_absolute(&self) -> bool {
        self.anchoring == Anchoring::Absolute
    }

    /// Match a whole path, segment by segment.
    ///
    /// `Ok(None)` means the path does not match. Errors are reserved for
    /// malformed paths and for mixing absolute and relative paths.
    pub fn match_path(&self, path: impl AsRef<Path>) -> Result<Option<Match>, Error> {
        let path = path.as_ref();
        let text = path
            .to_str()
            .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))?;

        check_shape(text, "path")?;

        let path_anchoring = Anchoring::of(text);
        if path_anchoring != self.anchoring {
            return Err(Error::AnchoringMismatch {
                pattern: self.pattern.clone(),
                path: text.to_string(),
                pattern_anchoring: self.anchoring,
                path_anchoring,
            });
        }

        let parts = split_segments(text, "path")?;
        if parts.len() != self.segments.len() {
            return Ok(None);
        }

        let matched = parts
            .into_iter()
            .zip(&self.segments)
            .try_fold(Match::new(), |acc, (part, compiled)| match_segment(part, compiled, acc));

        Ok(matched)
    }

    /// Split off the longest run of leading fixed-text segments.
    ///
    /// Returns the literal directory those segments name and the segments
    /// left to match below it. For an absolute pattern the prefix keeps the
    /// leading separator, so `/*` yields `/` and one remaining segment.
    ///
    /// # Examples
    /// ```
    /// use datetime_glob::Matcher;
    /// use std::path::PathBuf;
    ///
    /// let matcher = Matcher::new("/some-text/%Y/other-text").unwrap();
    /// let (prefix, rest) = matcher.split_prefix();
    /// assert_eq!(prefix, PathBuf::from("/some-text"));
    /// assert_eq!(rest.len(), 2);
    /// ```
    pub fn split_prefix(&self) -> (PathBuf, &[CompiledSegment]) {
        let fixed = self
            .segments
            .iter()
            .take_while(|segment| segment.is_fixed())
            .count();

        let parts: Vec<&str> = self.segments[..fixed]
            .iter()
            .filter_map(CompiledSegment::fixed_text)
            .collect();

        let separator = MAIN_SEPARATOR.to_string();
        let mut prefix = parts.join(&separator);
        if self.is_absolute() {
            prefix.insert(0, MAIN_SEPARATOR);
        }

        (PathBuf::from(prefix), &self.segments[fixed..])
    }
}

/// Reject inputs that can never name an entry: empty, root alone, or a
/// trailing separator.
fn check_shape(text: &str, what: &str) -> Result<(), Error> {
    if text.is_empty() {
        return Err(Error::InvalidPattern(format!("can not match empty {what}")));
    }
    if text.len() == MAIN_SEPARATOR.len_utf8() && text.starts_with(MAIN_SEPARATOR) {
        return Err(Error::InvalidPattern(format!("can not match root {what}: {text}")));
    }
    if text.ends_with(MAIN_SEPARATOR) {
        return Err(Error::InvalidPattern(format!(
            "unexpected trailing separator in {what}: {text}"
        )));
    }
    Ok(())
}

fn split_segments<'a>(text: &'a str, what: &str) -> Result<Vec<&'a str>, Error> {
    let parts: Vec<&str> = text
        .split(MAIN_SEPARATOR)
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    if parts.contains(&"..") {
        return Err(Error::PathTraversal(format!("{what} {text}")));
    }

    Ok(parts)
}
