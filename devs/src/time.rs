use std::{
    fmt::{self, Display},
    ops::{Add, Sub},
    str::FromStr,
};

use chrono::TimeDelta;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid duration literal '{0}', expected [HH:]MM:SS:mmm or 'inf'")]
pub struct TimeParseError(pub String);

/// Simulation time. Either a finite offset from the start of the run or
/// infinity, which is what a passivated model advances to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Time {
    Finite(TimeDelta),
    Infinity,
}

impl Time {
    pub fn zero() -> Time {
        Time::Finite(TimeDelta::zero())
    }

    pub fn infinity() -> Time {
        Time::Infinity
    }

    pub fn from_millis(millis: i64) -> Time {
        Time::Finite(TimeDelta::milliseconds(millis))
    }

    /// Microsecond resolution. Non finite inputs and values beyond the
    /// microsecond range map to infinity.
    pub fn from_secs_f64(seconds: f64) -> Time {
        let micros = (seconds * 1e6).round();

        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if !micros.is_finite() || micros >= i64::MAX as f64 || micros < i64::MIN as f64 {
            return Time::Infinity;
        }

        Time::Finite(TimeDelta::microseconds(micros as i64))
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Time::Infinity)
    }

    pub fn is_zero(&self) -> bool {
        *self == Time::zero()
    }

    pub fn delta(&self) -> Option<TimeDelta> {
        match self {
            Time::Finite(delta) => Some(*delta),
            Time::Infinity => None,
        }
    }

    pub fn seconds(&self) -> f64 {
        match self {
            Time::Finite(delta) => TD(*delta).seconds(),
            Time::Infinity => f64::INFINITY,
        }
    }

    pub fn to_std(&self) -> Option<std::time::Duration> {
        self.delta().and_then(|d| d.to_std().ok())
    }
}

impl Default for Time {
    fn default() -> Self {
        Time::zero()
    }
}

impl From<TimeDelta> for Time {
    fn from(value: TimeDelta) -> Self {
        Time::Finite(value)
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Self::Output {
        match (self, rhs) {
            (Time::Finite(a), Time::Finite(b)) => a
                .checked_add(&b)
                .map(Time::Finite)
                .unwrap_or(Time::Infinity),
            _ => Time::Infinity,
        }
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Self::Output {
        match (self, rhs) {
            (Time::Finite(a), Time::Finite(b)) => Time::Finite(a - b),
            (Time::Infinity, Time::Finite(_)) => Time::Infinity,
            (_, Time::Infinity) => Time::zero(),
        }
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Time::Infinity => write!(f, "inf"),
            Time::Finite(delta) => {
                let sign = if *delta < TimeDelta::zero() { "-" } else { "" };
                let millis = delta.num_milliseconds().abs();
                write!(
                    f,
                    "{sign}{:02}:{:02}:{:02}:{:03}",
                    millis / 3_600_000,
                    (millis / 60_000) % 60,
                    (millis / 1000) % 60,
                    millis % 1000
                )
            }
        }
    }
}

impl FromStr for Time {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("inf") {
            return Ok(Time::Infinity);
        }

        let bad = || TimeParseError(s.to_string());

        let fields = s
            .split(':')
            .map(|f| f.parse::<u32>().map_err(|_| bad()))
            .collect::<Result<Vec<_>, _>>()?;

        let (h, m, sec, ms) = match fields.as_slice() {
            [h, m, sec, ms] => (*h, *m, *sec, *ms),
            [m, sec, ms] => (0, *m, *sec, *ms),
            _ => return Err(bad()),
        };

        if m >= 60 || sec >= 60 || ms >= 1000 {
            return Err(bad());
        }

        let millis = ((h as i64 * 60 + m as i64) * 60 + sec as i64) * 1000 + ms as i64;
        Ok(Time::from_millis(millis))
    }
}

/// Source of monotonic wall time for the real-time runner.
pub trait Clock {
    /// Time elapsed since the clock was started.
    fn monotonic(&self) -> TimeDelta;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> TimeDelta {
        TimeDelta::from_std(self.start.elapsed()).unwrap_or(TimeDelta::MAX)
    }
}

pub struct TD(pub TimeDelta);

impl TD {
    pub fn seconds(&self) -> f64 {
        self.0.num_seconds() as f64 + self.0.subsec_nanos() as f64 / 1e9
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Time::zero() < Time::from_millis(1));
        assert!(Time::from_secs_f64(1e9) < Time::infinity());
        assert_eq!(
            Time::from_millis(5).min(Time::infinity()),
            Time::from_millis(5)
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = Time::from_millis(1500);
        let b = Time::from_millis(500);

        assert_eq!(a + b, Time::from_millis(2000));
        assert_eq!(a - b, Time::from_millis(1000));
        assert_eq!(b - a, Time::from_millis(-1000));
        assert_eq!(a + Time::infinity(), Time::infinity());
        assert_eq!(Time::infinity() - a, Time::infinity());
        assert_eq!(a - Time::infinity(), Time::zero());
    }

    #[test]
    fn test_seconds() {
        assert_relative_eq!(Time::from_millis(2250).seconds(), 2.25);
        assert_relative_eq!(Time::from_secs_f64(0.1).seconds(), 0.1);
        assert!(Time::infinity().seconds().is_infinite());
        assert!(Time::from_secs_f64(f64::INFINITY).is_infinity());
        assert!(Time::from_secs_f64(f64::NAN).is_infinity());
        assert!(Time::from_secs_f64(1e14).is_infinity());
        assert!(Time::from_secs_f64(-1e14).is_infinity());
        assert_eq!(Time::from_secs_f64(9e12), Time::from_millis(9_000_000_000_000_000));
    }

    #[test]
    fn test_parse() -> Result<(), TimeParseError> {
        assert_eq!("00:00:01:500".parse::<Time>()?, Time::from_millis(1500));
        assert_eq!("01:02:03:004".parse::<Time>()?, Time::from_millis(3_723_004));
        assert_eq!("00:03:000".parse::<Time>()?, Time::from_millis(3000));
        assert_eq!("inf".parse::<Time>()?, Time::infinity());

        assert!("00:61:00:000".parse::<Time>().is_err());
        assert!("1.5".parse::<Time>().is_err());
        assert!("".parse::<Time>().is_err());

        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(Time::from_millis(3_723_004).to_string(), "01:02:03:004");
        assert_eq!(Time::infinity().to_string(), "inf");
    }
}
