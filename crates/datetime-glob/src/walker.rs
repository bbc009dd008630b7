//! Lazy, pattern-guided walker, generic over `WalkerFs`.
//!
//! The walk starts at the pattern's literal prefix and descends only into
//! directories whose names match the next pattern segment. It is driven by
//! an explicit stack, so tree depth is bounded by the pattern, not by the
//! call stack.

use std::path::{Path, PathBuf};

use crate::matching::{Match, match_segment};
use crate::pattern::Matcher;
use crate::segment::CompiledSegment;
use crate::{Error, WalkerDirEntry, WalkerFs};

/// What to do after a directory listing fails.
///
/// The failure itself is always yielded as an `Err` item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// End the walk after yielding the error.
    #[default]
    Abort,
    /// Drop the unreadable subtree and keep walking.
    Skip,
}

/// Options for walking.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Handling of directories that can not be listed.
    pub error_policy: ErrorPolicy,
    /// Sort each listing by name for a deterministic order. Otherwise
    /// siblings come in whatever order the filesystem lists them.
    pub sort_entries: bool,
}

/// One pending directory: where it is, which segment its children must
/// match, and the fields matched on the way down.
#[derive(Debug)]
struct Frame {
    dir: PathBuf,
    depth: usize,
    matched: Match,
}

/// A listed directory whose children have not all been matched yet.
struct Listing<E> {
    frame: Frame,
    entries: std::vec::IntoIter<E>,
}

/// Lazy walk yielding every `(Match, path)` under the pattern's prefix.
///
/// Nothing touches the filesystem until the first `next()`, and each call
/// lists at most the directories needed to produce one more item. Dropping
/// the walker stops the walk.
///
/// A pattern made only of fixed-text segments yields nothing; check such a
/// path for existence directly.
///
/// # Examples
/// ```no_run
/// use datetime_glob::{LocalFs, Matcher, WalkOptions, Walker};
///
/// let matcher = Matcher::new("/srv/backups/%Y-%m-%d/*.tar.gz").unwrap();
/// let walker = Walker::new(LocalFs, &matcher).with_options(WalkOptions {
///     sort_entries: true,
///     ..Default::default()
/// });
///
/// for entry in walker {
///     let (matched, path) = entry.unwrap();
///     println!("{:?} {}", matched.as_maybe_date(), path.display());
/// }
/// ```
pub struct Walker<F: WalkerFs> {
    fs: F,
    segments: Vec<CompiledSegment>,
    options: WalkOptions,
    stack: Vec<Frame>,
    listing: Option<Listing<F::DirEntry>>,
    finished: bool,
}

impl<F: WalkerFs> Walker<F> {
    /// Create a walker for `matcher`, starting at its literal prefix.
    pub fn new(fs: F, matcher: &Matcher) -> Self {
        let (prefix, remaining) = matcher.split_prefix();

        let mut stack = Vec::new();
        if remaining.is_empty() {
            tracing::debug!(pattern = matcher.pattern(), "pattern has no wildcard segments, nothing to walk");
        } else {
            tracing::debug!(
                prefix = %prefix.display(),
                segments = remaining.len(),
                "starting walk"
            );
            stack.push(Frame {
                dir: prefix,
                depth: 0,
                matched: Match::new(),
            });
        }

        Self {
            fs,
            segments: remaining.to_vec(),
            options: WalkOptions::default(),
            stack,
            listing: None,
            finished: false,
        }
    }

    /// Set walk options.
    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// List the directory of `frame` and make it the current listing.
    fn open(&mut self, frame: Frame) -> Result<(), Error> {
        // a relative pattern with no literal prefix walks the working directory
        let dir = if frame.dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            frame.dir.as_path()
        };

        tracing::trace!(dir = %dir.display(), depth = frame.depth, "listing");

        match self.fs.list_dir(dir) {
            Ok(mut entries) => {
                if self.options.sort_entries {
                    entries.sort_by(|a, b| a.name().cmp(b.name()));
                }
                self.listing = Some(Listing {
                    frame,
                    entries: entries.into_iter(),
                });
                Ok(())
            }
            Err(source) => {
                tracing::warn!(dir = %dir.display(), error = %source, "failed to list directory");
                Err(Error::Walk {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        }
    }
}

impl<F: WalkerFs> Iterator for Walker<F> {
    type Item = Result<(Match, PathBuf), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let Some(listing) = &mut self.listing {
                let depth = listing.frame.depth;
                let segment = &self.segments[depth];
                let is_last = depth + 1 == self.segments.len();
                let base = self.stack.len();

                for entry in listing.entries.by_ref() {
                    let Some(matched) = match_segment(entry.name(), segment, listing.frame.matched) else {
                        continue;
                    };

                    let path = listing.frame.dir.join(entry.name());
                    if is_last {
                        // terminal segment: files and directories alike
                        return Some(Ok((matched, path)));
                    }

                    if entry.is_dir() {
                        self.stack.push(Frame {
                            dir: path,
                            depth: depth + 1,
                            matched,
                        });
                    }
                }

                // pop children in listing order
                self.stack[base..].reverse();
                self.listing = None;
            }

            let Some(frame) = self.stack.pop() else {
                self.finished = true;
                break;
            };

            if let Err(err) = self.open(frame) {
                if self.options.error_policy == ErrorPolicy::Abort {
                    self.finished = true;
                    self.stack.clear();
                }
                return Some(Err(err));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WalkerDirEntry, WalkerError};
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};

    /// Simple in-memory dir entry for testing.
    struct MemEntry {
        name: String,
        is_dir: bool,
    }

    impl WalkerDirEntry for MemEntry {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_dir(&self) -> bool {
            self.is_dir
        }
    }

    /// In-memory filesystem for testing the walker.
    ///
    /// Listings come back in reverse name order, to show the walker does not
    /// depend on the filesystem sorting for it.
    #[derive(Default)]
    struct MemoryFs {
        files: BTreeSet<PathBuf>,
        dirs: BTreeSet<PathBuf>,
        forbidden: BTreeSet<PathBuf>,
        listed: RefCell<Vec<PathBuf>>,
    }

    impl MemoryFs {
        fn new() -> Self {
            let mut fs = Self::default();
            fs.dirs.insert(PathBuf::from("/"));
            fs
        }

        fn add_file(&mut self, path: &str) {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent() {
                self.ensure_dirs(parent);
            }
            self.files.insert(path);
        }

        fn add_dir(&mut self, path: &str) {
            self.ensure_dirs(Path::new(path));
        }

        fn forbid(&mut self, path: &str) {
            self.forbidden.insert(PathBuf::from(path));
        }

        fn ensure_dirs(&mut self, path: &Path) {
            let mut current = PathBuf::new();
            for component in path.components() {
                current.push(component);
                self.dirs.insert(current.clone());
            }
        }

        fn list_count(&self) -> usize {
            self.listed.borrow().len()
        }
    }

    impl WalkerFs for MemoryFs {
        type DirEntry = MemEntry;

        fn list_dir(&self, path: &Path) -> Result<Vec<MemEntry>, WalkerError> {
            self.listed.borrow_mut().push(path.to_path_buf());

            if self.forbidden.contains(path) {
                return Err(WalkerError::PermissionDenied(path.display().to_string()));
            }
            if !self.dirs.contains(path) {
                return Err(WalkerError::NotFound(path.display().to_string()));
            }

            let children = |set: &BTreeSet<PathBuf>, is_dir: bool| -> Vec<MemEntry> {
                set.iter()
                    .filter(|p| p.parent() == Some(path) && p.as_path() != path)
                    .filter_map(|p| p.file_name())
                    .map(|name| MemEntry {
                        name: name.to_string_lossy().into_owned(),
                        is_dir,
                    })
                    .collect()
            };

            let mut entries = children(&self.files, false);
            entries.extend(children(&self.dirs, true));
            entries.sort_by(|a, b| b.name.cmp(&a.name));
            Ok(entries)
        }
    }

    fn make_dated_fs() -> MemoryFs {
        let mut fs = MemoryFs::new();
        fs.add_file("/data/2016-10-03/21-22-23.txt");
        fs.add_file("/data/2016-10-03/unmatched.txt");
        fs.add_file("/data/2016-10-04/11-12-13.txt");
        fs.add_file("/data/2016-10-04/unmatched.txt");
        fs.add_file("/data/2016-10-05/01-02-03.txt");
        fs.add_file("/data/2016-10-05/unmatched.txt");
        fs.add_dir("/data/2016-10-06");
        fs.add_dir("/data/some-dummy-directory");
        fs
    }

    fn walk_all<F: WalkerFs>(fs: F, pattern: &str, options: WalkOptions) -> Vec<(Match, PathBuf)> {
        let matcher = Matcher::new(pattern).unwrap();
        Walker::new(fs, &matcher)
            .with_options(options)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_walk_dated_tree() {
        let fs = make_dated_fs();
        let mut found: Vec<(String, String)> = walk_all(&fs, "/data/%Y-%m-%d/%H-%M-%S.txt", WalkOptions::default())
            .into_iter()
            .map(|(m, p)| (m.as_datetime().unwrap().to_string(), p.display().to_string()))
            .collect();
        found.sort();

        assert_eq!(
            found,
            vec![
                ("2016-10-03 21:22:23".to_string(), "/data/2016-10-03/21-22-23.txt".to_string()),
                ("2016-10-04 11:12:13".to_string(), "/data/2016-10-04/11-12-13.txt".to_string()),
                ("2016-10-05 01:02:03".to_string(), "/data/2016-10-05/01-02-03.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_walk_starts_at_prefix() {
        let fs = make_dated_fs();
        walk_all(&fs, "/data/%Y-%m-%d/%H-%M-%S.txt", WalkOptions::default());

        let listed = fs.listed.borrow();
        assert_eq!(listed[0], PathBuf::from("/data"));
        assert!(!listed.contains(&PathBuf::from("/")));
        // non-matching directories are never entered
        assert!(!listed.contains(&PathBuf::from("/data/some-dummy-directory")));
    }

    #[test]
    fn test_walk_yields_directories_at_last_segment() {
        let fs = make_dated_fs();
        let found = walk_all(&fs, "/data/%Y-%m-%d", WalkOptions::default());

        let mut days: Vec<u32> = found.iter().filter_map(|(m, _)| m.day()).collect();
        days.sort_unstable();
        assert_eq!(days, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_walk_skips_files_in_directory_position() {
        let mut fs = MemoryFs::new();
        fs.add_file("/logs/2016/app.log");
        fs.add_file("/logs/2017");

        let found = walk_all(&fs, "/logs/%Y/*.log", WalkOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, PathBuf::from("/logs/2016/app.log"));
        assert_eq!(found[0].0.year(), Some(2016));
    }

    #[test]
    fn test_walk_branches_do_not_share_fields() {
        let mut fs = MemoryFs::new();
        fs.add_file("/a/2016/2016-01.txt");
        fs.add_file("/a/2016/2017-01.txt");
        fs.add_file("/a/2017/2017-02.txt");
        fs.add_file("/a/2017/2016-02.txt");

        let mut found: Vec<String> = walk_all(&fs, "/a/%Y/%Y-%m.txt", WalkOptions::default())
            .into_iter()
            .map(|(_, p)| p.display().to_string())
            .collect();
        found.sort();

        assert_eq!(found, vec!["/a/2016/2016-01.txt", "/a/2017/2017-02.txt"]);
    }

    #[test]
    fn test_walk_sorted_entries() {
        let mut fs = MemoryFs::new();
        fs.add_file("/r/charlie.txt");
        fs.add_file("/r/alpha.txt");
        fs.add_file("/r/bravo.txt");

        let names = |options: WalkOptions| -> Vec<PathBuf> {
            walk_all(&fs, "/r/*.txt", options).into_iter().map(|(_, p)| p).collect()
        };

        assert_eq!(
            names(WalkOptions {
                sort_entries: true,
                ..Default::default()
            }),
            vec![
                PathBuf::from("/r/alpha.txt"),
                PathBuf::from("/r/bravo.txt"),
                PathBuf::from("/r/charlie.txt"),
            ]
        );
        // unsorted: whatever the filesystem returned
        assert_eq!(names(WalkOptions::default())[0], PathBuf::from("/r/charlie.txt"));
    }

    #[test]
    fn test_walk_sorted_nested_order() {
        let fs = make_dated_fs();
        let options = WalkOptions {
            sort_entries: true,
            ..Default::default()
        };
        let paths: Vec<PathBuf> = walk_all(&fs, "/data/%Y-%m-%d/*.txt", options)
            .into_iter()
            .map(|(_, p)| p)
            .collect();

        let mut expected = paths.clone();
        expected.sort();
        assert_eq!(paths.len(), 6);
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_walk_fixed_pattern_yields_nothing() {
        let fs = make_dated_fs();
        let found = walk_all(&fs, "/data/2016-10-03/21-22-23.txt", WalkOptions::default());
        assert!(found.is_empty());
        assert_eq!(fs.list_count(), 0);
    }

    #[test]
    fn test_walk_is_lazy() {
        let fs = make_dated_fs();
        let matcher = Matcher::new("/data/%Y-%m-%d/%H-%M-%S.txt").unwrap();
        let mut walker = Walker::new(&fs, &matcher).with_options(WalkOptions {
            sort_entries: true,
            ..Default::default()
        });

        assert_eq!(fs.list_count(), 0);

        let first = walker.next().unwrap().unwrap();
        assert_eq!(first.1, PathBuf::from("/data/2016-10-03/21-22-23.txt"));
        // /data plus the one dated directory that produced the first item
        assert_eq!(fs.list_count(), 2);

        drop(walker);
        assert_eq!(fs.list_count(), 2);
    }

    #[test]
    fn test_walk_error_aborts_by_default() {
        let mut fs = make_dated_fs();
        fs.forbid("/data/2016-10-04");

        let matcher = Matcher::new("/data/%Y-%m-%d/%H-%M-%S.txt").unwrap();
        let results: Vec<_> = Walker::new(&fs, &matcher).collect();

        let errors: Vec<&Error> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            Error::Walk { path, source: WalkerError::PermissionDenied(_) } if path == Path::new("/data/2016-10-04")
        ));
        // nothing after the error
        assert!(results.last().unwrap().is_err());
    }

    #[test]
    fn test_walk_error_skip_continues() {
        let mut fs = make_dated_fs();
        fs.forbid("/data/2016-10-04");

        let matcher = Matcher::new("/data/%Y-%m-%d/%H-%M-%S.txt").unwrap();
        let results: Vec<_> = Walker::new(&fs, &matcher)
            .with_options(WalkOptions {
                error_policy: ErrorPolicy::Skip,
                ..Default::default()
            })
            .collect();

        let errors = results.iter().filter(|r| r.is_err()).count();
        let mut found: Vec<PathBuf> = results.into_iter().filter_map(|r| r.ok()).map(|(_, p)| p).collect();
        found.sort();

        assert_eq!(errors, 1);
        assert_eq!(
            found,
            vec![
                PathBuf::from("/data/2016-10-03/21-22-23.txt"),
                PathBuf::from("/data/2016-10-05/01-02-03.txt"),
            ]
        );
    }

    #[test]
    fn test_walk_missing_prefix_reports_error() {
        let fs = make_dated_fs();
        let matcher = Matcher::new("/nowhere/%Y").unwrap();
        let results: Vec<_> = Walker::new(&fs, &matcher).collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            &results[0],
            Err(Error::Walk { source: WalkerError::NotFound(_), .. })
        ));
    }

    #[test]
    fn test_walk_relative_pattern_without_prefix() {
        struct CwdFs(MemoryFs);

        impl WalkerFs for CwdFs {
            type DirEntry = MemEntry;

            fn list_dir(&self, path: &Path) -> Result<Vec<MemEntry>, WalkerError> {
                let rooted = Path::new("/").join(path.strip_prefix(".").unwrap_or(path));
                self.0.list_dir(&rooted)
            }
        }

        let mut inner = MemoryFs::new();
        inner.add_file("/2016-10-03.log");
        inner.add_file("/notes.txt");

        let found = walk_all(CwdFs(inner), "%Y-%m-%d.log", WalkOptions::default());
        assert_eq!(found.len(), 1);
        // yielded relative to the working directory, without a "./" prefix
        assert_eq!(found[0].1, PathBuf::from("2016-10-03.log"));
    }

    #[test]
    fn test_walk_relative_error_names_listed_dir() {
        // "." is not a directory of a MemoryFs, so the first listing fails
        let fs = MemoryFs::new();
        let matcher = Matcher::new("%Y/*.log").unwrap();
        let results: Vec<_> = Walker::new(&fs, &matcher).collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            &results[0],
            Err(Error::Walk { path, source: WalkerError::NotFound(_) }) if path == Path::new(".")
        ));
        assert_eq!(fs.listed.borrow().as_slice(), [PathBuf::from(".")]);
    }

    #[test]
    fn test_walk_deep_tree() {
        let mut fs = MemoryFs::new();
        let mut pattern = String::from("/deep");
        let mut path = String::from("/deep");
        for i in 0..200 {
            pattern.push_str("/d*");
            path.push_str(&format!("/d{i}"));
        }
        path.push_str("/2016.txt");
        pattern.push_str("/%Y.txt");
        fs.add_file(&path);

        let found = walk_all(&fs, &pattern, WalkOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.year(), Some(2016));

        let visits: BTreeMap<PathBuf, usize> = fs.listed.borrow().iter().fold(BTreeMap::new(), |mut acc, p| {
            *acc.entry(p.clone()).or_default() += 1;
            acc
        });
        assert!(visits.values().all(|&n| n == 1));
    }

    #[test]
    fn test_walk_counts_listing_calls() {
        let calls = Cell::new(0usize);

        struct CountingFs<'a> {
            inner: MemoryFs,
            calls: &'a Cell<usize>,
        }

        impl WalkerFs for CountingFs<'_> {
            type DirEntry = MemEntry;

            fn list_dir(&self, path: &Path) -> Result<Vec<MemEntry>, WalkerError> {
                self.calls.set(self.calls.get() + 1);
                self.inner.list_dir(path)
            }
        }

        let fs = CountingFs {
            inner: make_dated_fs(),
            calls: &calls,
        };
        let found = walk_all(fs, "/data/%Y-%m-%d/%H-%M-%S.txt", WalkOptions::default());

        assert_eq!(found.len(), 3);
        // /data plus four matching dated directories
        assert_eq!(calls.get(), 5);
    }
}
