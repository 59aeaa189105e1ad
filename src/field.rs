use crate::error::ParseErrorKind;

/// Maximum number of comma-separated atoms a single field may contain.
pub const MAX_ATOMS: usize = 12;

/// The seven positional fields of a schedule string, in canonical order,
/// with their inclusive `(min, max)` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Nanosecond,
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

pub const FIELD_ORDER: [FieldKind; 7] = [
    FieldKind::Nanosecond,
    FieldKind::Second,
    FieldKind::Minute,
    FieldKind::Hour,
    FieldKind::DayOfMonth,
    FieldKind::Month,
    FieldKind::DayOfWeek,
];

pub const DOM_INDEX: usize = 4;
pub const DOW_INDEX: usize = 6;

impl FieldKind {
    pub fn bounds(self) -> (u64, u64) {
        match self {
            FieldKind::Nanosecond => (0, 999_999_999),
            FieldKind::Second => (0, 59),
            FieldKind::Minute => (0, 59),
            FieldKind::Hour => (0, 23),
            FieldKind::DayOfMonth => (1, 31),
            FieldKind::Month => (1, 12),
            FieldKind::DayOfWeek => (0, 6),
        }
    }
}

/// One disjunct `start ..= end` stepped by `step`: matches `v` iff
/// `start <= v <= end` and `(v - start) % step == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    pub start: u64,
    pub end: u64,
    pub step: u32,
}

impl Atom {
    fn matches(&self, v: u64) -> bool {
        v >= self.start && v <= self.end && (v - self.start) % self.step as u64 == 0
    }
}

/// The parsed representation of one of the seven positional components of a
/// schedule: an ordered set of atoms plus whether the source text was
/// exactly `"*"` (relevant only to the Day Rule, see [`crate::day_rule_matches`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    atoms: Vec<Atom>,
    pub is_wildcard: bool,
}

impl Field {
    /// Parses one field's text against its declared `(min, max)` bounds.
    pub fn parse(text: &str, kind: FieldKind) -> Result<Self, ParseErrorKind> {
        let (min, max) = kind.bounds();

        if text.is_empty() {
            return Err(ParseErrorKind::EmptyField);
        }

        if text == "*" {
            return Ok(Field {
                atoms: vec![Atom {
                    start: min,
                    end: max,
                    step: 1,
                }],
                is_wildcard: true,
            });
        }

        let mut atoms = Vec::new();
        for item in text.split(',') {
            if atoms.len() >= MAX_ATOMS {
                return Err(ParseErrorKind::TooManyAtoms);
            }
            atoms.push(parse_item(item, min, max)?);
        }

        if atoms.is_empty() {
            return Err(ParseErrorKind::EmptyField);
        }

        Ok(Field {
            atoms,
            is_wildcard: false,
        })
    }

    /// True iff some atom of this field covers `v`.
    pub fn matches(&self, v: u64) -> bool {
        self.atoms.iter().any(|a| a.matches(v))
    }

    /// Smallest `v` in `[min_candidate, cap]` matching this field, if any.
    pub fn next_match(&self, min_candidate: u64, cap: u64) -> Option<u64> {
        if min_candidate > cap {
            return None;
        }

        let mut best: Option<u64> = None;
        for atom in &self.atoms {
            if atom.start > cap {
                continue;
            }
            let atom_end = atom.end.min(cap);
            if min_candidate > atom_end {
                continue;
            }

            let candidate = if min_candidate <= atom.start {
                atom.start
            } else {
                let step = atom.step as u64;
                let delta = min_candidate - atom.start;
                let rem = delta % step;
                if rem == 0 {
                    min_candidate
                } else {
                    match min_candidate.checked_add(step - rem) {
                        Some(c) => c,
                        None => continue,
                    }
                }
            };

            if candidate > atom_end {
                continue;
            }

            best = Some(match best {
                Some(b) if b <= candidate => b,
                _ => candidate,
            });
        }

        best
    }
}

/// Parses one comma-separated item: `*`, `value`, `value-value`,
/// `value/step`, `value-value/step`, or `*/step`.
fn parse_item(item: &str, min: u64, max: u64) -> Result<Atom, ParseErrorKind> {
    if item.is_empty() {
        return Err(ParseErrorKind::EmptyField);
    }

    let mut rest = item;

    let (start, mut end, had_range) = if let Some(r) = rest.strip_prefix('*') {
        rest = r;
        (min, max, true)
    } else {
        let (value, r) = take_raw_number(rest)?;
        if value < min || value > max {
            return Err(ParseErrorKind::OutOfRange);
        }
        rest = r;
        (value, value, false)
    };

    let mut had_range = had_range;
    if let Some(r) = rest.strip_prefix('-') {
        let (value, r) = take_raw_number(r)?;
        if value < min || value > max {
            return Err(ParseErrorKind::OutOfRange);
        }
        if value < start {
            return Err(ParseErrorKind::BadRangeOrder);
        }
        end = value;
        rest = r;
        had_range = true;
    }

    let mut step: u64 = 1;
    if let Some(r) = rest.strip_prefix('/') {
        let (value, r) = take_raw_number(r)?;
        if value == 0 {
            return Err(ParseErrorKind::StepZero);
        }
        step = value;
        rest = r;

        // "value/step" with no explicit range: standard cron "from value
        // onward, every step" convention.
        if !had_range {
            end = max;
        }
    }

    if !rest.is_empty() {
        return Err(ParseErrorKind::TrailingGarbage);
    }

    if step > u32::MAX as u64 {
        return Err(ParseErrorKind::StepTooLarge);
    }

    Ok(Atom {
        start,
        end,
        step: step as u32,
    })
}

/// Parses a leading decimal number; range bounds (where they apply) are
/// checked separately by the caller.
fn take_raw_number(s: &str) -> Result<(u64, &str), ParseErrorKind> {
    let end = s
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return Err(ParseErrorKind::BadNumber);
    }
    let value: u64 = s[..end].parse().map_err(|_| ParseErrorKind::BadNumber)?;
    Ok((value, &s[end..]))
}
