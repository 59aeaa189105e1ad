//! A nanosecond-precision, reentrancy-safe in-process job scheduler.
//!
//! A [`Context`] owns a set of jobs, each keyed by a 7-field schedule string
//! (`nanosecond second minute hour day-of-month month day-of-week`, vixie-cron
//! order with the Day Rule between day-of-month and day-of-week preserved).
//! The host drives the scheduler itself — by calling [`Context::tick`] from
//! its own event loop, or [`Context::execute_between`] to catch a job up
//! across a gap — there is no background thread.
//!
//! ```
//! use nanosched::{Context, Instant};
//!
//! let mut ctx = Context::new();
//! ctx.add("0 0 * * * * *", |_ctx, now| {
//!     println!("top of the minute: {:?}", now);
//! }).unwrap();
//! ctx.tick();
//! ```

mod config;
mod engine;
mod error;
mod field;
mod instant;
mod registry;
mod schedule;

pub use config::{validate_config, ConfigError, NamedSchedule, ScheduleFile, ValidationIssue};
pub use error::{ParseError, ParseErrorKind};
pub use field::FieldKind;
pub use instant::{Instant, NANOS_PER_SEC};
pub use registry::{AddError, Callback, Context, JobHandle};
pub use schedule::{Schedule, MAX_SCHEDULE_LEN};
