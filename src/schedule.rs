use log::trace;

use crate::error::{ParseError, ParseErrorKind};
use crate::field::{Field, DOM_INDEX, DOW_INDEX, FIELD_ORDER};

pub const MAX_SCHEDULE_LEN: usize = 512;

/// The parsed form of a 7-field schedule string: one [`Field`] per
/// position, in `nanosecond, second, minute, hour, day-of-month, month,
/// day-of-week` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    fields: [Field; 7],
}

impl Schedule {
    /// Splits `text` on ASCII whitespace runs into exactly seven tokens and
    /// parses each with the Field Parser using its positional bounds.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if text.len() > MAX_SCHEDULE_LEN {
            return Err(ParseError::whole(ParseErrorKind::ScheduleTooLong));
        }

        let tokens: Vec<&str> = text.split_ascii_whitespace().collect();
        if tokens.len() != 7 {
            return Err(ParseError::whole(ParseErrorKind::FieldCountMismatch));
        }

        let mut fields: Vec<Field> = Vec::with_capacity(7);
        for (idx, (token, kind)) in tokens.iter().zip(FIELD_ORDER).enumerate() {
            let field = Field::parse(token, kind).map_err(|kind| ParseError::at(idx, kind))?;
            fields.push(field);
        }

        trace!("parsed schedule {:?}", text);

        Ok(Schedule {
            fields: fields.try_into().unwrap_or_else(|_| unreachable!()),
        })
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    /// True iff every non-day field (including nanosecond when
    /// `include_nanosecond`) matches `values`, where `values` is indexed as
    /// returned by [`crate::Instant::decompose`].
    pub fn non_day_fields_match(&self, values: &[u64; 7], include_nanosecond: bool) -> bool {
        self.fields.iter().enumerate().all(|(idx, field)| {
            idx == DOM_INDEX
                || idx == DOW_INDEX
                || (idx == 0 && !include_nanosecond)
                || field.matches(values[idx])
        })
    }

    /// The vixie-cron Day Rule: AND when either DOM or DOW is the literal
    /// wildcard `"*"`, OR otherwise. `dom_value`/`dow_value` are the raw
    /// calendar values, not already-matched booleans, so the wildcard check
    /// stays tied to the field's source text rather than a derived
    /// "full range" property (a user writing `0-6` for DOW still gets OR
    /// semantics).
    pub fn day_rule_matches(&self, dom_value: u64, dow_value: u64) -> bool {
        let dom = &self.fields[DOM_INDEX];
        let dow = &self.fields[DOW_INDEX];
        let dom_match = dom.matches(dom_value);
        let dow_match = dow.matches(dow_value);

        if dom.is_wildcard || dow.is_wildcard {
            dom_match && dow_match
        } else {
            dom_match || dow_match
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            Schedule::parse("0 * * * *").unwrap_err().kind,
            ParseErrorKind::FieldCountMismatch
        );
    }

    #[test]
    fn rejects_oversized_schedule() {
        let long = "0".repeat(513);
        let text = format!("{} 0 0 0 1 1 0", long);
        assert_eq!(
            Schedule::parse(&text).unwrap_err().kind,
            ParseErrorKind::ScheduleTooLong
        );
    }

    #[test]
    fn accepts_exactly_512_bytes() {
        // Trailing whitespace is free: split_ascii_whitespace ignores it, so
        // padding a minimal valid schedule out to the byte cap still parses.
        let base = "0 0 0 0 1 1 0";
        let text = format!("{}{}", base, " ".repeat(MAX_SCHEDULE_LEN - base.len()));
        assert_eq!(text.len(), MAX_SCHEDULE_LEN);
        assert!(Schedule::parse(&text).is_ok());
    }

    #[test]
    fn rejects_513_bytes_regardless_of_content() {
        let text = "0".repeat(MAX_SCHEDULE_LEN + 1);
        assert_eq!(
            Schedule::parse(&text).unwrap_err().kind,
            ParseErrorKind::ScheduleTooLong
        );
    }

    #[test]
    fn day_rule_and_when_both_wildcard() {
        let s = Schedule::parse("0 0 0 0 * * *").unwrap();
        assert!(s.day_rule_matches(15, 3));
    }

    #[test]
    fn day_rule_and_when_dom_wildcard_dow_restricted() {
        let s = Schedule::parse("0 0 0 0 * * 5").unwrap();
        assert!(s.day_rule_matches(15, 5));
        assert!(!s.day_rule_matches(15, 3));
    }

    #[test]
    fn day_rule_or_when_both_restricted() {
        let s = Schedule::parse("0 0 0 0 1 * 5").unwrap();
        assert!(s.day_rule_matches(1, 3)); // DOM matches
        assert!(s.day_rule_matches(2, 5)); // DOW matches
        assert!(!s.day_rule_matches(2, 3)); // neither matches
    }
}
