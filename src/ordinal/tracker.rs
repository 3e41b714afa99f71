//! Per-thread ordinal cursor

use tracing::{trace, warn};

use super::Ordinal;

/// Issues strictly increasing ordinals for one thread of reporting.
///
/// A tracker is single-owner: both operations take `&mut self` and the type is
/// not `Clone`, so two threads never draw from the same sequence. To report
/// from a new thread, call [`Tracker::next_tracker`] and move the returned
/// tracker into it.
#[derive(Debug)]
pub struct Tracker {
    /// `None` once the final component has passed `u64::MAX`
    next: Option<Ordinal>,
}

impl Tracker {
    /// Tracker for run stamp 0
    pub fn new() -> Self {
        Self::with_baseline(Ordinal::new(0))
    }

    pub fn with_run_stamp(run_stamp: u64) -> Self {
        Self::with_baseline(Ordinal::new(run_stamp))
    }

    /// Tracker whose first ordinal is `baseline`
    pub fn with_baseline(baseline: Ordinal) -> Self {
        Self {
            next: Some(baseline),
        }
    }

    /// Return the current ordinal and move past it.
    ///
    /// # Panics
    ///
    /// Panics if the tracker is exhausted, i.e. it already issued an ordinal
    /// whose final component is `u64::MAX`. See [`Tracker::try_next_ordinal`].
    pub fn next_ordinal(&mut self) -> Ordinal {
        match self.try_next_ordinal() {
            Some(ordinal) => ordinal,
            None => panic!("tracker exhausted: final ordinal component reached u64::MAX"),
        }
    }

    /// Return the current ordinal, or `None` if the tracker is exhausted
    pub fn try_next_ordinal(&mut self) -> Option<Ordinal> {
        let current = self.next.take()?;
        self.next = current.checked_advance();
        if self.next.is_none() {
            warn!(last = %current, "Tracker exhausted");
        }
        Some(current)
    }

    /// Split off a tracker for a newly spawned thread.
    ///
    /// Everything the returned tracker issues sorts after what this tracker
    /// issued so far and before what it issues next.
    ///
    /// # Panics
    ///
    /// Panics if the tracker is exhausted. See [`Tracker::try_next_tracker`].
    pub fn next_tracker(&mut self) -> Tracker {
        match self.try_next_tracker() {
            Some(tracker) => tracker,
            None => panic!("tracker exhausted: cannot fork past u64::MAX"),
        }
    }

    /// Fork a new tracker, or `None` if this tracker is exhausted.
    ///
    /// Forking at a value whose final component is `u64::MAX` still yields a
    /// working tracker; only this one becomes exhausted.
    pub fn try_next_tracker(&mut self) -> Option<Tracker> {
        let current = self.next.take()?;
        let forked = current.branch();
        self.next = current.checked_advance();
        trace!(forked = %forked, continuing = ?self.next, "Forked tracker");
        Some(Tracker::with_baseline(forked))
    }

    /// Ordinal the next call to [`Tracker::next_ordinal`] will return
    pub fn peek(&self) -> Option<&Ordinal> {
        self.next.as_ref()
    }

    /// True once no further ordinal can be issued
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ord(components: &[u64]) -> Ordinal {
        Ordinal::from_components(components.to_vec()).unwrap()
    }

    #[test]
    fn test_fresh_tracker_starts_at_baseline() {
        let mut tracker = Tracker::new();
        assert_eq!(tracker.next_ordinal(), ord(&[0, 0]));
        assert_eq!(tracker.next_ordinal(), ord(&[0, 1]));
        assert_eq!(tracker.peek(), Some(&ord(&[0, 2])));
    }

    #[test]
    fn test_strictly_increasing() {
        let mut tracker = Tracker::with_run_stamp(3);
        let mut previous = tracker.next_ordinal();
        for round in 0..200 {
            if round % 7 == 0 {
                let _child = tracker.next_tracker();
            }
            let current = tracker.next_ordinal();
            assert!(current > previous, "{current} should follow {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_walkthrough_from_single_component_root() {
        let mut t = Tracker::with_baseline(ord(&[0]));

        assert_eq!(t.next_ordinal(), ord(&[0]));
        assert_eq!(t.peek(), Some(&ord(&[1])));

        let mut t2 = t.next_tracker();
        let parent_next = t.next_ordinal();
        let child_first = t2.next_ordinal();

        assert_eq!(parent_next, ord(&[2]));
        assert_eq!(child_first, ord(&[1, 0]));

        // Forked work slots in between what the parent issued before and after
        assert!(ord(&[0]) < child_first);
        assert!(child_first < parent_next);
        assert!(t2.next_ordinal() < parent_next);
    }

    #[test]
    fn test_forks_in_sequence_keep_plan_order() {
        let mut parent = Tracker::new();
        let started = parent.next_ordinal();

        let mut first = parent.next_tracker();
        let mut second = parent.next_tracker();
        let mut third = parent.next_tracker();

        let a = first.next_ordinal();
        let b = second.next_ordinal();
        let c = third.next_ordinal();
        let completed = parent.next_ordinal();

        assert!(started < a);
        assert!(a < b);
        assert!(b < c);
        assert!(c < completed);
    }

    #[test]
    fn test_same_run_stamp_same_start() {
        let mut a = Tracker::with_run_stamp(9);
        let mut b = Tracker::with_run_stamp(9);
        assert_eq!(a.next_ordinal(), b.next_ordinal());

        let mut c = Tracker::with_run_stamp(10);
        assert_ne!(a.next_ordinal(), c.next_ordinal());
    }

    #[test]
    fn test_tracker_moves_to_thread() {
        let mut parent = Tracker::new();
        let child = parent.next_tracker();

        let handle = std::thread::spawn(move || {
            let mut child = child;
            (0..5).map(|_| child.next_ordinal()).collect::<Vec<_>>()
        });

        let mine: Vec<_> = (0..5).map(|_| parent.next_ordinal()).collect();
        let theirs = handle.join().unwrap();

        for o in &theirs {
            assert!(!mine.contains(o));
        }
    }

    #[test]
    fn test_last_representable_ordinal_is_issued() {
        let limit = ord(&[0, u64::MAX]);
        let mut tracker = Tracker::with_baseline(limit.clone());

        assert_eq!(tracker.next_ordinal(), limit);
        assert!(tracker.is_exhausted());
        assert_eq!(tracker.peek(), None);
        assert_eq!(tracker.try_next_ordinal(), None);
        assert!(tracker.try_next_tracker().is_none());
    }

    #[test]
    fn test_fork_at_limit_keeps_child_usable() {
        let limit = ord(&[0, u64::MAX]);
        let mut parent = Tracker::with_baseline(limit.clone());

        let mut child = parent.next_tracker();
        assert!(parent.is_exhausted());

        let first = child.next_ordinal();
        assert_eq!(first, ord(&[0, u64::MAX, 0]));
        assert!(limit < first);
        assert_eq!(child.next_ordinal(), ord(&[0, u64::MAX, 1]));
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn test_next_ordinal_past_limit_panics() {
        let mut tracker = Tracker::with_baseline(ord(&[u64::MAX]));
        tracker.next_ordinal();
        tracker.next_ordinal();
    }
}
