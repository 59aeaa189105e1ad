use log::trace;

use crate::field::{DOM_INDEX, DOW_INDEX};
use crate::instant::{Instant, NANOS_PER_SEC};
use crate::registry::Context;

/// 366 days, the fixed horizon `next_after` is willing to search within.
const HORIZON_SECONDS: i64 = 366 * 86_400;

impl Context {
    /// Decomposes `now`, then fires every registered job whose schedule
    /// matches it, skipping jobs already fired for this exact instant
    /// (last-fired de-duplication) and jobs tombstoned since the scope
    /// opened. Invalid instants and a latched destroy are silently ignored.
    pub fn execute_at(&mut self, now: Instant) {
        if !now.is_valid() || self.destroy_requested {
            return;
        }
        let Some(values) = now.decompose() else {
            return;
        };

        self.execution_depth += 1;

        // Snapshot job ids (not indices — a reentrant `add` prepends and
        // shifts every existing index) so reentrant removals inside a
        // callback can't invalidate this iteration.
        let ids = self.job_ids_snapshot();
        for id in ids {
            if self.destroy_requested {
                break;
            }
            let Some(idx) = self.find_index(id) else {
                continue;
            };
            if self.is_tombstoned(idx) {
                continue;
            }

            let schedule = self.job_schedule(idx);
            if !schedule.non_day_fields_match(&values, true) {
                continue;
            }
            if !schedule.day_rule_matches(values[DOM_INDEX], values[DOW_INDEX]) {
                continue;
            }

            let should_fire = match self.job_last_fired(idx) {
                None => true,
                Some(last) => now > last,
            };
            if !should_fire {
                continue;
            }

            // Set last_fired before dispatch: if the callback recursively
            // calls `execute_at(now)`, this job will not be considered due
            // again for the same instant.
            self.set_last_fired(idx, now);

            let mut callback = self.take_callback(idx);
            if let Some(cb) = callback.as_mut() {
                trace!("firing job {}", id);
                cb(self, now);
            }
            self.restore_callback(id, callback);
        }

        self.execution_depth -= 1;
        self.finalize_scope();
    }

    /// Convenience wrapper around [`Context::execute_at`] that samples the
    /// current UTC wall-clock time.
    pub fn tick(&mut self) {
        self.execute_at(Instant::now());
    }

    /// Earliest instant strictly after `after` that matches at least one
    /// job, searched second-by-second up to a 366-day horizon. Read-only:
    /// does not fire anything.
    pub fn next_after(&self, after: Instant) -> Option<Instant> {
        if self.destroy_requested || !after.is_valid() {
            return None;
        }

        for sec_off in 0..HORIZON_SECONDS {
            let sec = after.secs.checked_add(sec_off)?;
            let values = Instant::new(sec, 0).decompose()?;

            let mut best_ns: Option<u32> = None;

            for (schedule, is_removed) in self.all_schedules() {
                if is_removed {
                    continue;
                }
                if !schedule.non_day_fields_match(&values, false) {
                    continue;
                }
                if !schedule.day_rule_matches(values[DOM_INDEX], values[DOW_INDEX]) {
                    continue;
                }

                let min_ns: u64 = if sec_off == 0 {
                    if after.nanos >= NANOS_PER_SEC {
                        continue;
                    }
                    after.nanos as u64 + 1
                } else {
                    0
                };

                if let Some(candidate) = schedule.field(0).next_match(min_ns, NANOS_PER_SEC as u64)
                {
                    let candidate = candidate as u32;
                    best_ns = Some(match best_ns {
                        Some(b) if b <= candidate => b,
                        _ => candidate,
                    });
                }
            }

            if let Some(ns) = best_ns {
                return Some(Instant::new(sec, ns));
            }
        }

        None
    }

    /// Fires every instant in the half-open window `(after, until]`, in
    /// ascending order, holding one execution scope across the whole
    /// window so reentrant mutations are deferred until it finishes. A
    /// no-op (returns `true`) if `until <= after`; fails (`false`) on an
    /// invalid bound or a latched destroy.
    pub fn execute_between(&mut self, after: Instant, until: Instant) -> bool {
        if self.destroy_requested {
            return false;
        }
        if !after.is_valid() || !until.is_valid() {
            return false;
        }
        if until <= after {
            return true;
        }

        self.execution_depth += 1;
        let mut cursor = after;
        while !self.destroy_requested {
            match self.next_after(cursor) {
                Some(next) if next <= until => {
                    self.execute_at(next);
                    cursor = next;
                }
                _ => break,
            }
        }
        self.execution_depth -= 1;
        self.finalize_scope();

        true
    }
}
