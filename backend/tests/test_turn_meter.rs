//! Tests for Speed and TurnMeter fixed-point arithmetic
//!
//! CRITICAL: accrual is exact. N ticks at speed s always gives N * s * 0.07,
//! with no drift however long a simulation runs.

use proptest::prelude::*;
use speed_tune_core_rs::{ParseDecimalError, Speed, TurnMeter, FULL_TURN_METER};

#[test]
fn test_accrual_matches_decimal_rate() {
    // 173 * 0.07 = 12.11
    assert_eq!(Speed::from_whole(173).accrual_per_tick().to_string(), "12.11");

    // 150.5 * 0.07 = 10.535
    let speed: Speed = "150.5".parse().unwrap();
    assert_eq!(speed.accrual_per_tick().to_string(), "10.535");
}

#[test]
fn test_exactly_one_hundred_is_not_full() {
    assert!(!FULL_TURN_METER.is_full());
    assert!(TurnMeter::from_raw(FULL_TURN_METER.raw() + 1).is_full());
    assert_eq!("100".parse::<TurnMeter>().unwrap(), FULL_TURN_METER);
}

#[test]
fn test_meter_crossing_one_hundred() {
    let speed = Speed::from_whole(231);
    assert_eq!(TurnMeter::after_ticks(speed, 6).to_string(), "97.02");
    assert!(!TurnMeter::after_ticks(speed, 6).is_full());
    assert_eq!(TurnMeter::after_ticks(speed, 7).to_string(), "113.19");
    assert!(TurnMeter::after_ticks(speed, 7).is_full());
}

#[test]
fn test_round_half_to_even() {
    assert_eq!("92.5".parse::<TurnMeter>().unwrap().round(), 92);
    assert_eq!("93.5".parse::<TurnMeter>().unwrap().round(), 94);
    assert_eq!("93.1".parse::<TurnMeter>().unwrap().round(), 93);
    assert_eq!("89.25".parse::<TurnMeter>().unwrap().round(), 89);
    assert_eq!("35.7".parse::<TurnMeter>().unwrap().round(), 36);
}

#[test]
fn test_speed_parse_errors() {
    assert_eq!("".parse::<Speed>(), Err(ParseDecimalError::Empty));
    assert!(matches!("-5".parse::<Speed>(), Err(ParseDecimalError::Negative(_))));
    assert!(matches!(
        "150.125".parse::<Speed>(),
        Err(ParseDecimalError::TooPrecise { .. })
    ));
    assert!(matches!("fast".parse::<Speed>(), Err(ParseDecimalError::Invalid(_))));
    assert!(Speed::from_hundredths(-1).is_err());
}

proptest! {
    #[test]
    fn prop_accrual_is_exact(hundredths in 0i64..=50_000, ticks in 0usize..=2_000) {
        let speed = Speed::from_hundredths(hundredths).unwrap();

        let mut tm = TurnMeter::ZERO;
        for _ in 0..ticks {
            tm.accrue(speed);
        }

        prop_assert_eq!(tm, TurnMeter::after_ticks(speed, ticks));
        prop_assert_eq!(tm.raw(), hundredths * 7 * ticks as i64);
    }

    #[test]
    fn prop_ticks_to_fill_is_first_full_tick(hundredths in 1i64..=100_000) {
        let speed = Speed::from_hundredths(hundredths).unwrap();
        let ticks = speed.ticks_to_fill().unwrap();

        prop_assert!(ticks >= 1);
        prop_assert!(!TurnMeter::after_ticks(speed, ticks - 1).is_full());
        prop_assert!(TurnMeter::after_ticks(speed, ticks).is_full());
    }

    #[test]
    fn prop_reset_is_idempotent(hundredths in 0i64..=50_000, ticks in 0usize..=100) {
        let speed = Speed::from_hundredths(hundredths).unwrap();
        let mut tm = TurnMeter::after_ticks(speed, ticks);

        tm.reset();
        prop_assert_eq!(tm, TurnMeter::ZERO);
        tm.reset();
        prop_assert_eq!(tm, TurnMeter::ZERO);

        // A reset meter accrues exactly like a fresh one
        for _ in 0..ticks {
            tm.accrue(speed);
        }
        prop_assert_eq!(tm, TurnMeter::after_ticks(speed, ticks));
    }

    #[test]
    fn prop_round_is_within_half_a_point(raw in 0i64..=10_000_000) {
        let tm = TurnMeter::from_raw(raw);
        let diff = (tm.round() * 10_000 - raw).abs();
        prop_assert!(diff <= 5_000);
    }

    #[test]
    fn prop_meter_display_parses_back(raw in 0i64..=10_000_000) {
        let tm = TurnMeter::from_raw(raw);
        prop_assert_eq!(tm.to_string().parse::<TurnMeter>().unwrap(), tm);
    }
}
