use chrono::{DateTime, Datelike, Timelike, Utc};

pub const NANOS_PER_SEC: u32 = 999_999_999;

/// A (seconds, nanoseconds) pair in UTC, the unit of time the engine reasons
/// about. Distinct from `std::time::Instant`/`chrono`'s own types because the
/// engine needs plain arithmetic over seconds-since-epoch decoupled from how
/// the host samples wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    pub secs: i64,
    pub nanos: u32,
}

impl Instant {
    pub fn new(secs: i64, nanos: u32) -> Self {
        Instant { secs, nanos }
    }

    pub fn is_valid(&self) -> bool {
        self.nanos <= NANOS_PER_SEC
    }

    /// Wall-clock "now" in UTC, for [`crate::Context::tick`].
    pub fn now() -> Self {
        let now: DateTime<Utc> = Utc::now();
        Instant {
            secs: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }

    pub fn succ_second(self) -> Self {
        Instant {
            secs: self.secs + 1,
            nanos: 0,
        }
    }

    /// Breaks the instant into the seven positional field values in the
    /// same order as `FieldKind`: nanosecond, second, minute, hour,
    /// day-of-month, month (1-based), day-of-week (0=Sunday..6=Saturday).
    /// Returns `None` if the seconds component falls outside the range
    /// `chrono` can represent as a calendar date.
    pub fn decompose(&self) -> Option<[u64; 7]> {
        let naive = DateTime::<Utc>::from_timestamp(self.secs, 0)?.naive_utc();
        Some([
            self.nanos as u64,
            naive.second() as u64,
            naive.minute() as u64,
            naive.hour() as u64,
            naive.day() as u64,
            naive.month() as u64,
            naive.weekday().num_days_from_sunday() as u64,
        ])
    }
}
