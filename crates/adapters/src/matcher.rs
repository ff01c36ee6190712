// SPDX-License-Identifier: MIT

//! Glob-based include/ignore matching for the file watcher. A service's
//! `watch.include`/`watch.ignore` lists are compiled once at config-load
//! time and then consulted on every filesystem event and directory walk.

use std::path::Path;

use glob::Pattern;

/// Tests a path (relative to a service's watch root) against an include/
/// ignore glob set. A path matches iff it matches at least one `include`
/// pattern and no `ignore` pattern; an empty `include` set matches
/// everything (so a service with no explicit `watch.include` still watches
/// its whole tree, filtered only by `ignore`).
pub trait Matcher: Clone + Send + Sync + 'static {
    /// Whether a file at `rel` (relative to the watch root) should trigger
    /// the debouncer.
    fn is_match(&self, rel: &Path) -> bool;

    /// Whether a directory at `rel` should be descended into at all. Used
    /// to prune `walkdir` traversals and skip registering ignored
    /// directories with the underlying `notify` watcher.
    fn match_dir(&self, rel: &Path) -> bool;
}

/// Compiles `include`/`ignore` glob lists into [`glob::Pattern`]s.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    include: Vec<Pattern>,
    ignore: Vec<Pattern>,
}

impl GlobMatcher {
    /// Compiles the given glob strings. Invalid patterns are rejected by
    /// config validation before a `GlobMatcher` is ever constructed, so
    /// this takes already-known-good strings and panics only on a caller
    /// bug (mirrors the teacher's config-validates-first, adapter-trusts
    /// pattern).
    pub fn new(include: &[String], ignore: &[String]) -> Result<Self, glob::PatternError> {
        let include = include.iter().map(|p| Pattern::new(p)).collect::<Result<_, _>>()?;
        let ignore = ignore.iter().map(|p| Pattern::new(p)).collect::<Result<_, _>>()?;
        Ok(Self { include, ignore })
    }

    fn ignored(&self, rel: &Path) -> bool {
        self.ignore.iter().any(|p| p.matches_path(rel))
    }
}

impl Default for GlobMatcher {
    /// Matches every path, ignoring nothing.
    fn default() -> Self {
        Self {
            include: Vec::new(),
            ignore: Vec::new(),
        }
    }
}

impl Matcher for GlobMatcher {
    fn is_match(&self, rel: &Path) -> bool {
        if self.ignored(rel) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches_path(rel))
    }

    fn match_dir(&self, rel: &Path) -> bool {
        !self.ignored(rel)
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
