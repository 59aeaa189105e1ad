use std::cell::RefCell;
use std::rc::Rc;

use nanosched::{Context, Instant, Schedule, NANOS_PER_SEC};

fn at(secs: i64, nanos: u32) -> Instant {
    Instant::new(secs, nanos)
}

#[test]
fn scenario_basic_fire_and_dedup() {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let mut ctx = Context::new();
    let f = fired.clone();
    ctx.add("0 * * * * * *", move |_, now| f.borrow_mut().push(now))
        .unwrap();

    let t0 = at(1_739_788_200, 0);
    ctx.execute_at(t0);
    ctx.execute_at(t0); // replaying the same instant must not re-fire
    ctx.execute_at(at(t0.secs + 1, 0));

    assert_eq!(fired.borrow().len(), 2);
    assert_eq!(fired.borrow()[0], t0);
}

#[test]
fn scenario_two_value_nanosecond_list() {
    let fired = Rc::new(RefCell::new(0u32));
    let mut ctx = Context::new();
    let f = fired.clone();
    ctx.add("100,200 * * * * * *", move |_, _| *f.borrow_mut() += 1)
        .unwrap();

    let sec = 1_739_788_200;
    ctx.execute_at(at(sec, 100));
    ctx.execute_at(at(sec, 200));
    ctx.execute_at(at(sec, 150));
    assert_eq!(*fired.borrow(), 2);
}

#[test]
fn scenario_day_rule_dom_or_dow_midnight_friday() {
    let fired = Rc::new(RefCell::new(0u32));
    let mut ctx = Context::new();
    let f = fired.clone();
    // Fires at midnight on the 1st of the month, or any Friday midnight.
    ctx.add("0 0 0 0 1 * 5", move |_, _| *f.borrow_mut() += 1)
        .unwrap();

    ctx.execute_at(at(1_738_368_000, 0)); // Sat 2025-02-01 00:00 UTC, DOM match
    assert_eq!(*fired.borrow(), 1);
    ctx.execute_at(at(1_738_886_400, 0)); // Fri 2025-02-07 00:00 UTC, DOW match
    assert_eq!(*fired.borrow(), 2);
    ctx.execute_at(at(1_738_540_800, 0)); // Mon 2025-02-03 00:00 UTC, no match
    assert_eq!(*fired.borrow(), 2);
}

#[test]
fn scenario_weekday_0930_next_trigger() {
    let ctx = {
        let mut ctx = Context::new();
        ctx.add("0 0 30 9 * * 1-5", |_, _| {}).unwrap();
        ctx
    };

    // Mon 2025-02-17 10:30:00 UTC -> Tue 2025-02-18 09:30:00 UTC
    let after = at(1_739_788_200, 0);
    let next = ctx.next_after(after).unwrap();
    assert_eq!(next, at(1_739_871_000, 0));
}

#[test]
fn scenario_two_value_next_trigger_crosses_second_boundary() {
    let mut ctx = Context::new();
    ctx.add("0,500000000 * * * * * *", |_, _| {}).unwrap();

    let t0 = at(1_739_788_200, 0);
    let half_second = ctx.next_after(t0).unwrap();
    assert_eq!(half_second, at(1_739_788_200, 500_000_000));

    let next_whole_second = ctx.next_after(half_second).unwrap();
    assert_eq!(next_whole_second, at(1_739_788_201, 0));
}

#[test]
fn scenario_catch_up_window_fires_each_missed_instant() {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let mut ctx = Context::new();
    let f = fired.clone();
    ctx.add("0 * * * * * *", move |_, now| f.borrow_mut().push(now))
        .unwrap();

    let after = at(1_739_788_200, 0);
    let until = at(after.secs + 3, 0);
    assert!(ctx.execute_between(after, until));

    let got = fired.borrow();
    assert_eq!(got.len(), 3);
    assert_eq!(*got, vec![at(after.secs + 1, 0), at(after.secs + 2, 0), at(after.secs + 3, 0)]);
}

#[test]
fn scenario_job_removes_itself_on_first_fire() {
    let fired = Rc::new(RefCell::new(0u32));
    let mut ctx = Context::new();
    let f = fired.clone();
    ctx.add_with_handle("0 * * * * * *", move |handle| {
        move |ctx: &mut Context, _now: Instant| {
            *f.borrow_mut() += 1;
            ctx.remove(handle);
        }
    })
    .unwrap();

    let t0 = at(1_739_788_200, 0);
    ctx.execute_at(t0);
    ctx.execute_at(at(t0.secs + 1, 0));
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(ctx.job_count(), 0);
}

#[test]
fn scenario_reentrant_execute_at_respects_dedup() {
    let fired = Rc::new(RefCell::new(0u32));
    let reentered = Rc::new(RefCell::new(false));
    let mut ctx = Context::new();
    let f = fired.clone();
    let r = reentered.clone();
    ctx.add("0 * * * * * *", move |ctx: &mut Context, now: Instant| {
        *f.borrow_mut() += 1;
        if !*r.borrow() {
            *r.borrow_mut() = true;
            // Reentrant call for the same instant must be a no-op, since
            // last_fired was already updated before this callback ran.
            ctx.execute_at(now);
        }
    })
    .unwrap();

    ctx.execute_at(at(1_739_788_200, 0));
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn schedule_at_exactly_512_bytes_is_accepted() {
    let base = "0 0 0 0 1 1 0";
    let text = format!("{}{}", base, " ".repeat(512 - base.len()));
    assert_eq!(text.len(), 512);
    assert!(Schedule::parse(&text).is_ok());
}

#[test]
fn schedule_over_512_bytes_is_rejected() {
    let text = "0".repeat(513);
    assert!(Schedule::parse(&text).is_err());
}

#[test]
fn invalid_nanosecond_instant_does_not_fire_anything() {
    let fired = Rc::new(RefCell::new(0u32));
    let mut ctx = Context::new();
    let f = fired.clone();
    ctx.add("* * * * * * *", move |_, _| *f.borrow_mut() += 1)
        .unwrap();

    ctx.execute_at(at(0, NANOS_PER_SEC + 1));
    assert_eq!(*fired.borrow(), 0);
}
