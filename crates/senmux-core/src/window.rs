//! Fixed-duration sampling window with reset-on-emit semantics.
//!
//! The window is a latest-value register per source. `record` overwrites a
//! slot (last write before emission wins); `maybe_emit` hands the register
//! to the caller exactly once per elapsed duration and clears every slot to
//! missing, regardless of whether fresh data arrived. Callers must check
//! `maybe_emit` every loop iteration so that silent periods still emit.

/// Sentinel rendered for a source that produced no data this window.
pub const MISSING: &str = "--";

/// One emitted window: epoch-ms timestamp plus the per-source register as
/// it stood at the boundary check. `None` means no data arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp_ms: u64,
    pub values: Vec<Option<String>>,
}

impl Snapshot {
    /// Value for one source with the missing sentinel applied.
    pub fn rendered(&self, index: usize) -> &str {
        self.values
            .get(index)
            .and_then(|v| v.as_deref())
            .unwrap_or(MISSING)
    }
}

#[derive(Debug)]
pub struct SamplingWindow {
    started_ms: u64,
    window_ms: u64,
    slots: Vec<Option<String>>,
}

impl SamplingWindow {
    pub fn new(source_count: usize, window_ms: u64, now_ms: u64) -> Self {
        Self {
            started_ms: now_ms,
            window_ms,
            slots: vec![None; source_count],
        }
    }

    pub fn source_count(&self) -> usize {
        self.slots.len()
    }

    /// Overwrite the latest-value entry for one source. Out-of-range
    /// indices are ignored; the slot set is fixed at construction.
    pub fn record(&mut self, index: usize, token: String) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(token);
        }
    }

    /// Emit iff the window duration has elapsed. Resets the register and
    /// restarts the window at `now_ms`, so exactly one emission occurs per
    /// elapsed duration.
    pub fn maybe_emit(&mut self, now_ms: u64) -> Option<Snapshot> {
        if now_ms.saturating_sub(self.started_ms) < self.window_ms {
            return None;
        }
        let count = self.slots.len();
        let values = std::mem::replace(&mut self.slots, vec![None; count]);
        self.started_ms = now_ms;
        Some(Snapshot {
            timestamp_ms: now_ms,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_emission_before_duration() {
        let mut w = SamplingWindow::new(3, 100, 1_000);
        w.record(0, "1.0".into());
        assert_eq!(w.maybe_emit(1_050), None);
        assert_eq!(w.maybe_emit(1_099), None);
    }

    #[test]
    fn emission_at_exact_boundary() {
        let mut w = SamplingWindow::new(3, 100, 1_000);
        let snap = w.maybe_emit(1_100).unwrap();
        assert_eq!(snap.timestamp_ms, 1_100);
        assert_eq!(snap.values, vec![None, None, None]);
    }

    #[test]
    fn silent_window_emits_all_missing() {
        let mut w = SamplingWindow::new(2, 20, 0);
        let snap = w.maybe_emit(25).unwrap();
        assert_eq!(snap.rendered(0), MISSING);
        assert_eq!(snap.rendered(1), MISSING);
    }

    #[test]
    fn last_write_before_emission_wins() {
        let mut w = SamplingWindow::new(1, 20, 0);
        w.record(0, "1.0".into());
        w.record(0, "2.0".into());
        let snap = w.maybe_emit(20).unwrap();
        assert_eq!(snap.rendered(0), "2.0");
    }

    #[test]
    fn register_resets_after_emission() {
        let mut w = SamplingWindow::new(2, 20, 0);
        w.record(0, "7.1".into());
        let first = w.maybe_emit(20).unwrap();
        assert_eq!(first.rendered(0), "7.1");

        // Nothing recorded since: the next window must not carry 7.1 over.
        let second = w.maybe_emit(40).unwrap();
        assert_eq!(second.rendered(0), MISSING);
        assert_eq!(second.rendered(1), MISSING);
    }

    #[test]
    fn one_emission_per_elapsed_duration() {
        let mut w = SamplingWindow::new(1, 20, 0);
        assert!(w.maybe_emit(20).is_some());
        // Same instant again: window restarted at 20, so nothing fires.
        assert!(w.maybe_emit(20).is_none());
        assert!(w.maybe_emit(39).is_none());
        assert!(w.maybe_emit(40).is_some());
    }

    #[test]
    fn window_restarts_at_emission_time_not_schedule() {
        // A late boundary check restarts from the observed now, matching a
        // loop that drifted; the next emission is a full duration later.
        let mut w = SamplingWindow::new(1, 20, 0);
        assert!(w.maybe_emit(33).is_some());
        assert!(w.maybe_emit(50).is_none());
        assert!(w.maybe_emit(53).is_some());
    }

    #[test]
    fn out_of_range_record_is_ignored() {
        let mut w = SamplingWindow::new(2, 20, 0);
        w.record(9, "x".into());
        let snap = w.maybe_emit(20).unwrap();
        assert_eq!(snap.values.len(), 2);
    }
}
