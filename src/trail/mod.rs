// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based backtracking for speculative moves.
//!
//! The trail is an undo log: every change the owner makes while a checkpoint
//! is active is recorded with enough information to reverse it. Rewinding to
//! a [`Bookmark`] hands the recorded entries back newest-first, so the owner
//! can restore exactly the state it had when the bookmark was taken.
//!
//! # Memory Model
//!
//! - Each scorer owns its own trail, so independent starts never share one
//! - Nothing is recorded while no checkpoint is active
//! - Checkpoints nest; rewinding or committing a bookmark also drops every
//!   checkpoint taken after it

/// Handle returned by [`Trail::checkpoint`].
///
/// Bookmarks are only meaningful for the trail that issued them, and only
/// while they are still on its checkpoint stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    /// Position on the checkpoint stack.
    level: usize,
    /// Trail length when the bookmark was taken.
    mark: usize,
}

impl Bookmark {
    /// Nesting depth of this bookmark (0 for the outermost).
    pub fn level(&self) -> usize {
        self.level
    }
}

/// Undo log with nested checkpoints.
#[derive(Debug)]
pub struct Trail<E> {
    /// Recorded changes, oldest first.
    entries: Vec<E>,
    /// Stack of trail lengths, one per active bookmark.
    checkpoints: Vec<usize>,
}

impl<E> Trail<E> {
    /// Create a new empty trail.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            checkpoints: Vec::with_capacity(16),
        }
    }

    /// Record a checkpoint for later backtracking.
    pub fn checkpoint(&mut self) -> Bookmark {
        let bookmark = Bookmark {
            level: self.checkpoints.len(),
            mark: self.entries.len(),
        };
        self.checkpoints.push(bookmark.mark);
        bookmark
    }

    /// True while at least one checkpoint is active.
    pub fn is_recording(&self) -> bool {
        !self.checkpoints.is_empty()
    }

    /// Record a state change. Ignored when no checkpoint is active.
    pub fn record(&mut self, entry: E) {
        if self.is_recording() {
            self.entries.push(entry);
        }
    }

    /// Rewind to `bookmark`, returning the undone entries newest-first.
    ///
    /// The bookmark and every later one are released.
    ///
    /// # Panics
    ///
    /// Panics if `bookmark` has already been released.
    pub fn rewind_to(&mut self, bookmark: Bookmark) -> Vec<E> {
        self.release(bookmark);
        let mut undone: Vec<E> = self.entries.drain(bookmark.mark..).collect();
        undone.reverse();
        if self.checkpoints.is_empty() {
            self.entries.clear();
        }
        undone
    }

    /// Keep every change since `bookmark` and release it.
    ///
    /// Changes stay on the trail while an outer checkpoint is active, so the
    /// outer bookmark can still undo them.
    ///
    /// # Panics
    ///
    /// Panics if `bookmark` has already been released.
    pub fn commit(&mut self, bookmark: Bookmark) {
        self.release(bookmark);
        if self.checkpoints.is_empty() {
            self.entries.clear();
        }
    }

    /// Drop every entry and checkpoint.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.checkpoints.clear();
    }

    fn release(&mut self, bookmark: Bookmark) {
        assert!(
            self.checkpoints.get(bookmark.level) == Some(&bookmark.mark),
            "Stale bookmark at level {}",
            bookmark.level
        );
        self.checkpoints.truncate(bookmark.level);
    }

    /// Get the current number of entries in the trail.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of active checkpoints.
    pub fn checkpoint_depth(&self) -> usize {
        self.checkpoints.len()
    }
}

impl<E> Default for Trail<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_new() {
        let trail: Trail<u32> = Trail::new();
        assert_eq!(trail.len(), 0);
        assert_eq!(trail.checkpoint_depth(), 0);
        assert!(trail.is_empty());
        assert!(!trail.is_recording());
    }

    #[test]
    fn test_no_recording_without_checkpoint() {
        let mut trail = Trail::new();
        trail.record(1);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_checkpoint_and_rewind() {
        let mut trail = Trail::new();
        let bookmark = trail.checkpoint();
        trail.record(3);
        trail.record(4);
        assert_eq!(trail.len(), 2);

        assert_eq!(trail.rewind_to(bookmark), vec![4, 3]);
        assert!(trail.is_empty());
        assert_eq!(trail.checkpoint_depth(), 0);
    }

    #[test]
    fn test_nested_checkpoints() {
        let mut trail = Trail::new();
        let outer = trail.checkpoint();
        trail.record(1);
        let inner = trail.checkpoint();
        trail.record(2);
        trail.record(3);
        assert_eq!(inner.level(), 1);

        // Rewind inner checkpoint
        assert_eq!(trail.rewind_to(inner), vec![3, 2]);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.checkpoint_depth(), 1);

        // Rewind outer checkpoint
        assert_eq!(trail.rewind_to(outer), vec![1]);
        assert_eq!(trail.checkpoint_depth(), 0);
    }

    #[test]
    fn test_commit_inner_keeps_entries_for_outer() {
        let mut trail = Trail::new();
        let outer = trail.checkpoint();
        trail.record(1);
        let inner = trail.checkpoint();
        trail.record(2);

        trail.commit(inner);
        assert_eq!(trail.checkpoint_depth(), 1);
        assert_eq!(trail.len(), 2);

        assert_eq!(trail.rewind_to(outer), vec![2, 1]);
    }

    #[test]
    fn test_commit_outermost_clears() {
        let mut trail = Trail::new();
        let bookmark = trail.checkpoint();
        trail.record(1);
        trail.commit(bookmark);
        assert!(trail.is_empty());
        assert!(!trail.is_recording());
    }

    #[test]
    fn test_rewind_outer_releases_inner() {
        let mut trail = Trail::new();
        let outer = trail.checkpoint();
        trail.record(1);
        let _inner = trail.checkpoint();
        trail.record(2);

        assert_eq!(trail.rewind_to(outer), vec![2, 1]);
        assert_eq!(trail.checkpoint_depth(), 0);
    }

    #[test]
    #[should_panic(expected = "Stale bookmark")]
    fn test_stale_bookmark() {
        let mut trail: Trail<u32> = Trail::new();
        let bookmark = trail.checkpoint();
        trail.commit(bookmark);
        trail.rewind_to(bookmark);
    }
}
