//! Fixed-point speed and turn-meter arithmetic
//!
//! Speeds are stored as i64 hundredths of a speed point and turn meters as
//! i64 ten-thousandths of a meter point. One tick accrues
//! `speed * TICK_SPEED_RATIO` of meter; with the ratio being 7/100 that is
//! exactly `speed_hundredths * 7` meter units, so accrual never rounds.
//!
//! CRITICAL: No floating point anywhere in the turn-meter path. Two runs of
//! the same roster must agree to the last meter unit on every platform.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fractional decimal digits carried by [`Speed`]
pub const SPEED_DECIMALS: u32 = 2;

/// Raw units per whole speed point
pub const SPEED_SCALE: i64 = 100;

/// Turn meter gained per tick per speed point, in hundredths (0.07)
pub const TICK_SPEED_RATIO_HUNDREDTHS: i64 = 7;

/// Largest speed, in hundredths, whose per-tick accrual fits a [`TurnMeter`]
pub const MAX_SPEED_HUNDREDTHS: i64 = i64::MAX / TICK_SPEED_RATIO_HUNDREDTHS;

/// Fractional decimal digits carried by [`TurnMeter`]
pub const METER_DECIMALS: u32 = 4;

/// Raw units per whole turn-meter point
pub const METER_SCALE: i64 = SPEED_SCALE * 100;

/// An actor acts once its meter is strictly above this value (100)
pub const FULL_TURN_METER: TurnMeter = TurnMeter::from_points(100);

/// Errors parsing a fixed-point decimal from text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseDecimalError {
    #[error("empty decimal value")]
    Empty,

    #[error("negative value not allowed: {0}")]
    Negative(String),

    #[error("'{text}' has more than {max_decimals} fractional digit(s)")]
    TooPrecise { text: String, max_decimals: u32 },

    #[error("invalid decimal '{0}'")]
    Invalid(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

/// Parse non-negative decimal text into raw units with `decimals` fractional digits
fn parse_fixed(text: &str, decimals: u32) -> Result<i64, ParseDecimalError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    if text.starts_with('-') {
        return Err(ParseDecimalError::Negative(text.to_string()));
    }

    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(ParseDecimalError::Invalid(text.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(ParseDecimalError::TooPrecise {
            text: text.to_string(),
            max_decimals: decimals,
        });
    }

    let out_of_range = || ParseDecimalError::OutOfRange(text.to_string());
    let scale = 10_i64.pow(decimals);
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| out_of_range())?
    };
    let frac_units: i64 = if frac.is_empty() {
        0
    } else {
        // Left-aligned: "5" with 2 decimals is 50 hundredths
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().map_err(|_| out_of_range())?
    };

    whole
        .checked_mul(scale)
        .and_then(|units| units.checked_add(frac_units))
        .ok_or_else(out_of_range)
}

/// Render raw units as a decimal without trailing fractional zeros
fn write_fixed(f: &mut fmt::Formatter<'_>, raw: i64, decimals: u32) -> fmt::Result {
    let scale = 10_i64.pow(decimals);
    let sign = if raw < 0 { "-" } else { "" };
    let magnitude = raw.unsigned_abs();
    let whole = magnitude / scale as u64;
    let frac = magnitude % scale as u64;
    if frac == 0 {
        return write!(f, "{}{}", sign, whole);
    }
    let digits = format!("{:0width$}", frac, width = decimals as usize);
    write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
}

// ============================================================================
// Speed
// ============================================================================

/// Actor speed, constant for a simulation run
///
/// # Example
/// ```
/// use speed_tune_core_rs::Speed;
///
/// let speed: Speed = "231.5".parse().unwrap();
/// assert_eq!(speed.hundredths(), 23150);
/// assert_eq!(speed.to_string(), "231.5");
/// assert_eq!(Speed::from_whole(190).to_string(), "190");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Speed(i64);

impl Speed {
    pub const ZERO: Speed = Speed(0);

    /// Speed of a whole number of points
    pub const fn from_whole(points: u32) -> Self {
        Speed(points as i64 * SPEED_SCALE)
    }

    /// Speed from raw hundredths
    ///
    /// Negative speeds and speeds above [`MAX_SPEED_HUNDREDTHS`] are rejected.
    pub fn from_hundredths(hundredths: i64) -> Result<Self, ParseDecimalError> {
        if hundredths < 0 {
            return Err(ParseDecimalError::Negative(hundredths.to_string()));
        }
        if hundredths > MAX_SPEED_HUNDREDTHS {
            return Err(ParseDecimalError::OutOfRange(hundredths.to_string()));
        }
        Ok(Speed(hundredths))
    }

    /// Raw value in hundredths of a speed point
    pub fn hundredths(self) -> i64 {
        self.0
    }

    /// Meter gained by an actor of this speed in one tick
    pub fn accrual_per_tick(self) -> TurnMeter {
        TurnMeter(self.0.saturating_mul(TICK_SPEED_RATIO_HUNDREDTHS))
    }

    /// Ticks needed for an empty meter to become strictly full
    ///
    /// Returns `None` for a zero speed, which never fills.
    ///
    /// # Example
    /// ```
    /// use speed_tune_core_rs::Speed;
    ///
    /// // 231 * 0.07 = 16.17 per tick: 97.02 after 6 ticks, 113.19 after 7
    /// assert_eq!(Speed::from_whole(231).ticks_to_fill(), Some(7));
    /// assert_eq!(Speed::ZERO.ticks_to_fill(), None);
    /// ```
    pub fn ticks_to_fill(self) -> Option<usize> {
        let rate = self.accrual_per_tick().raw();
        if rate <= 0 {
            return None;
        }
        usize::try_from(FULL_TURN_METER.raw() / rate + 1).ok()
    }
}

impl From<u32> for Speed {
    fn from(points: u32) -> Self {
        Speed::from_whole(points)
    }
}

impl FromStr for Speed {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hundredths = parse_fixed(s, SPEED_DECIMALS)?;
        if hundredths > MAX_SPEED_HUNDREDTHS {
            return Err(ParseDecimalError::OutOfRange(s.trim().to_string()));
        }
        Ok(Speed(hundredths))
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fixed(f, self.0, SPEED_DECIMALS)
    }
}

impl Serialize for Speed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % SPEED_SCALE == 0 {
            serializer.serialize_i64(self.0 / SPEED_SCALE)
        } else {
            serializer.collect_str(self)
        }
    }
}

/// Whole speeds may be written as JSON integers, fractional ones as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum SpeedRepr {
    Whole(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Speed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SpeedRepr::deserialize(deserializer)? {
            SpeedRepr::Whole(points) => i64::try_from(points)
                .ok()
                .and_then(|p| p.checked_mul(SPEED_SCALE))
                .filter(|&hundredths| hundredths <= MAX_SPEED_HUNDREDTHS)
                .map(Speed)
                .ok_or_else(|| de::Error::custom(format!("speed {} is out of range", points))),
            SpeedRepr::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

// ============================================================================
// Turn meter
// ============================================================================

/// Readiness accumulator of one actor
///
/// # Example
/// ```
/// use speed_tune_core_rs::{Speed, TurnMeter};
///
/// let mut tm = TurnMeter::ZERO;
/// for _ in 0..7 {
///     tm.accrue(Speed::from_whole(190));
/// }
/// assert_eq!(tm.to_string(), "93.1");
/// assert_eq!(tm.round(), 93);
/// assert!(!tm.is_full());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnMeter(i64);

impl TurnMeter {
    pub const ZERO: TurnMeter = TurnMeter(0);

    /// Meter holding a whole number of points
    pub const fn from_points(points: i64) -> Self {
        TurnMeter(points * METER_SCALE)
    }

    /// Meter from raw ten-thousandths
    pub const fn from_raw(raw: i64) -> Self {
        TurnMeter(raw)
    }

    /// Raw value in ten-thousandths of a meter point
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Meter reached by an empty meter after `ticks` ticks at `speed`
    pub fn after_ticks(speed: Speed, ticks: usize) -> Self {
        let ticks = i64::try_from(ticks).unwrap_or(i64::MAX);
        TurnMeter(speed.accrual_per_tick().0.saturating_mul(ticks))
    }

    /// Add one tick of accrual
    pub fn accrue(&mut self, speed: Speed) {
        self.0 = self.0.saturating_add(speed.accrual_per_tick().0);
    }

    /// Empty the meter after a turn
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Strictly above [`FULL_TURN_METER`]; a meter of exactly 100 is not full
    pub fn is_full(self) -> bool {
        self > FULL_TURN_METER
    }

    /// Nearest whole point, ties to even
    pub fn round(self) -> i64 {
        let quotient = self.0.div_euclid(METER_SCALE);
        let twice_remainder = 2 * self.0.rem_euclid(METER_SCALE);
        if twice_remainder > METER_SCALE || (twice_remainder == METER_SCALE && quotient % 2 != 0) {
            quotient + 1
        } else {
            quotient
        }
    }
}

impl FromStr for TurnMeter {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, METER_DECIMALS).map(TurnMeter)
    }
}

impl fmt::Display for TurnMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fixed(f, self.0, METER_DECIMALS)
    }
}

impl Serialize for TurnMeter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TurnMeter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_speed_forms() {
        assert_eq!("175".parse::<Speed>().unwrap().hundredths(), 17500);
        assert_eq!("175.5".parse::<Speed>().unwrap().hundredths(), 17550);
        assert_eq!("175.05".parse::<Speed>().unwrap().hundredths(), 17505);
        assert_eq!(".5".parse::<Speed>().unwrap().hundredths(), 50);
        assert_eq!(" 12 ".parse::<Speed>().unwrap().hundredths(), 1200);
    }

    #[test]
    fn test_parse_speed_rejects_bad_input() {
        assert_eq!("".parse::<Speed>(), Err(ParseDecimalError::Empty));
        assert!(matches!("-3".parse::<Speed>(), Err(ParseDecimalError::Negative(_))));
        assert!(matches!(
            "1.234".parse::<Speed>(),
            Err(ParseDecimalError::TooPrecise { max_decimals: 2, .. })
        ));
        assert!(matches!("fast".parse::<Speed>(), Err(ParseDecimalError::Invalid(_))));
        assert!(matches!(".".parse::<Speed>(), Err(ParseDecimalError::Invalid(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Speed>(),
            Err(ParseDecimalError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_speed_capped_where_accrual_still_fits() {
        let max = Speed::from_hundredths(MAX_SPEED_HUNDREDTHS).unwrap();
        assert_eq!(
            max.accrual_per_tick().raw(),
            MAX_SPEED_HUNDREDTHS * TICK_SPEED_RATIO_HUNDREDTHS
        );
        assert_eq!(max.ticks_to_fill(), Some(1));

        assert!(matches!(
            Speed::from_hundredths(MAX_SPEED_HUNDREDTHS + 1),
            Err(ParseDecimalError::OutOfRange(_))
        ));
        assert!(matches!(
            "90000000000000000".parse::<Speed>(),
            Err(ParseDecimalError::OutOfRange(_))
        ));
        assert!(serde_json::from_str::<Speed>("90000000000000000").is_err());
        assert!(serde_json::from_str::<Speed>("\"90000000000000000\"").is_err());
    }

    #[test]
    fn test_meter_display_trims_zeros() {
        assert_eq!(TurnMeter::from_raw(847_700).to_string(), "84.77");
        assert_eq!(TurnMeter::from_raw(931_000).to_string(), "93.1");
        assert_eq!(TurnMeter::ZERO.to_string(), "0");
        assert_eq!(TurnMeter::from_raw(5).to_string(), "0.0005");
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(TurnMeter::from_raw(845_000).round(), 84);
        assert_eq!(TurnMeter::from_raw(855_000).round(), 86);
        assert_eq!(TurnMeter::from_raw(855_001).round(), 86);
        assert_eq!(TurnMeter::from_raw(842_800).round(), 84);
    }

    #[test]
    fn test_speed_serde_whole_and_fractional() {
        let whole: Speed = serde_json::from_str("231").unwrap();
        assert_eq!(whole, Speed::from_whole(231));
        let frac: Speed = serde_json::from_str("\"231.25\"").unwrap();
        assert_eq!(frac.hundredths(), 23125);

        assert_eq!(serde_json::to_string(&whole).unwrap(), "231");
        assert_eq!(serde_json::to_string(&frac).unwrap(), "\"231.25\"");
        assert!(serde_json::from_str::<Speed>("231.5").is_err());
    }

    #[test]
    fn test_meter_serde_is_exact_text() {
        let tm = TurnMeter::from_raw(1_131_900);
        let json = serde_json::to_string(&tm).unwrap();
        assert_eq!(json, "\"113.19\"");
        assert_eq!(serde_json::from_str::<TurnMeter>(&json).unwrap(), tm);
    }

    #[test]
    fn test_full_is_strictly_above_one_hundred() {
        assert!(!FULL_TURN_METER.is_full());
        assert!(TurnMeter::from_raw(FULL_TURN_METER.raw() + 1).is_full());
        assert!(!TurnMeter::from_points(99).is_full());
    }

    #[test]
    fn test_ticks_to_fill() {
        // 250 * 0.07 = 17.5; 5 ticks = 87.5, 6 ticks = 105
        assert_eq!(Speed::from_whole(250).ticks_to_fill(), Some(6));
        // 0.01 * 0.07 = 0.0007 per tick
        let crawl = Speed::from_hundredths(1).unwrap();
        assert_eq!(crawl.ticks_to_fill(), Some(142_858));
    }
}
