use log::{debug, trace};

use crate::error::ParseError;
use crate::instant::Instant;
use crate::schedule::Schedule;

/// A job's callback. It receives `&mut Context` (rather than a bare opaque
/// user-data pointer as the C original does) so a callback can recursively
/// call [`Context::remove`], [`Context::add_with_handle`], or
/// [`Context::execute_at`] on the registry that is invoking it; whatever
/// state the callback needs is simply captured by the closure, playing the
/// role of the C API's `void *user_data`.
pub type Callback = Box<dyn FnMut(&mut Context, Instant)>;

/// Non-owning reference to a registered job, used only to [`Context::remove`]
/// it. Remains valid (recognized by `remove`) until the job is physically
/// destroyed, even across a tombstone-then-sweep cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(u64);

struct Job {
    id: u64,
    schedule: Schedule,
    // `None` only for the duration of its own callback invocation (taken
    // out so the engine can pass `&mut Context` to it without aliasing).
    callback: Option<Callback>,
    last_fired: Option<Instant>,
    is_removed: bool,
}

/// Outcome of a failed [`Context::add_with_handle`] call. Bundled because the
/// C API collapses both causes into a single null return; Rust callers
/// usually want to distinguish "bad schedule string" from "registry is
/// shutting down".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
    Parse(ParseError),
    /// The context has a destroy latched; no further jobs are admitted.
    Rejected,
}

impl std::fmt::Display for AddError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddError::Parse(e) => write!(f, "{}", e),
            AddError::Rejected => write!(f, "context is being destroyed"),
        }
    }
}

impl std::error::Error for AddError {}

/// Owns every registered job and the reentrancy state that governs deferred
/// removal/destruction while a callback is running. The host exclusively
/// owns a `Context`; there is no internal locking, so the host must
/// serialize all calls on a given instance.
#[derive(Default)]
pub struct Context {
    jobs: Vec<Job>,
    next_id: u64,
    pub(crate) execution_depth: u32,
    pub(crate) destroy_requested: bool,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Registers a job, invoking `callback` once per instant that matches
    /// `schedule`. Rejected (destroy-requested) contexts and unparsable
    /// schedules are reported through [`AddError`]; a successful call
    /// prepends the job, so the newest job fires first in iteration order.
    pub fn add(
        &mut self,
        schedule: &str,
        callback: impl FnMut(&mut Context, Instant) + 'static,
    ) -> Result<JobHandle, AddError> {
        self.add_with_handle(schedule, |_| callback)
    }

    /// Like [`Context::add`], but `make_callback` is handed the job's own
    /// handle before the callback is constructed, so a job can remove (or
    /// otherwise reference) itself from within its own callback.
    pub fn add_with_handle<F, C>(
        &mut self,
        schedule: &str,
        make_callback: F,
    ) -> Result<JobHandle, AddError>
    where
        F: FnOnce(JobHandle) -> C,
        C: FnMut(&mut Context, Instant) + 'static,
    {
        if self.destroy_requested {
            return Err(AddError::Rejected);
        }

        let parsed = Schedule::parse(schedule).map_err(AddError::Parse)?;

        let id = self.next_id;
        self.next_id += 1;
        let handle = JobHandle(id);
        let callback = make_callback(handle);

        self.jobs.insert(
            0,
            Job {
                id,
                schedule: parsed,
                callback: Some(Box::new(callback)),
                last_fired: None,
                is_removed: false,
            },
        );

        trace!("registered job {} ({})", id, schedule);
        Ok(handle)
    }

    /// Removes a job. Tombstones it (deferred unlink) if called while an
    /// execution scope is open, otherwise unlinks it immediately. Returns
    /// `false` if the handle is unrecognized or the context is being
    /// destroyed.
    pub fn remove(&mut self, handle: JobHandle) -> bool {
        if self.destroy_requested {
            return false;
        }

        let Some(idx) = self.jobs.iter().position(|j| j.id == handle.0) else {
            return false;
        };

        if self.execution_depth > 0 {
            self.jobs[idx].is_removed = true;
        } else {
            self.jobs.remove(idx);
        }
        true
    }

    /// Latches destruction. While an execution scope is open this only sets
    /// the flag (teardown completes when the outermost scope exits); at
    /// rest it tears down immediately. After this call no further job may be
    /// added, removed, or fired — the context is inert until dropped.
    pub fn request_destroy(&mut self) {
        debug!("destroy requested (execution_depth={})", self.execution_depth);
        self.destroy_requested = true;
        self.finalize_scope();
    }

    pub fn is_destroy_requested(&self) -> bool {
        self.destroy_requested
    }

    pub(crate) fn job_ids_snapshot(&self) -> Vec<u64> {
        self.jobs.iter().map(|j| j.id).collect()
    }

    pub(crate) fn find_index(&self, id: u64) -> Option<usize> {
        self.jobs.iter().position(|j| j.id == id)
    }

    pub(crate) fn is_tombstoned(&self, idx: usize) -> bool {
        self.jobs[idx].is_removed
    }

    pub(crate) fn job_schedule(&self, idx: usize) -> &Schedule {
        &self.jobs[idx].schedule
    }

    pub(crate) fn job_last_fired(&self, idx: usize) -> Option<Instant> {
        self.jobs[idx].last_fired
    }

    pub(crate) fn set_last_fired(&mut self, idx: usize, now: Instant) {
        self.jobs[idx].last_fired = Some(now);
    }

    pub(crate) fn take_callback(&mut self, idx: usize) -> Option<Callback> {
        self.jobs[idx].callback.take()
    }

    pub(crate) fn restore_callback(&mut self, id: u64, callback: Option<Callback>) {
        if let Some(idx) = self.find_index(id) {
            self.jobs[idx].callback = callback;
        }
    }

    pub(crate) fn all_schedules(&self) -> impl Iterator<Item = (&Schedule, bool)> {
        self.jobs.iter().map(|j| (&j.schedule, j.is_removed))
    }

    pub(crate) fn sweep(&mut self) {
        if self.execution_depth != 0 {
            return;
        }
        let before = self.jobs.len();
        self.jobs.retain(|j| !j.is_removed);
        if self.jobs.len() != before {
            trace!("swept {} tombstoned job(s)", before - self.jobs.len());
        }
    }

    pub(crate) fn finalize_scope(&mut self) {
        if self.execution_depth != 0 {
            return;
        }
        self.sweep();
        if self.destroy_requested {
            self.jobs.clear();
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}
