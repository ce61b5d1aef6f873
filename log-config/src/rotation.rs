//! Rotation policy parsing
//!
//! A policy is written either as a size threshold (`"5 MB"`, `"512KiB"`,
//! `"0.5 GB"`) or as a time interval (`"daily"`, `"6 hours"`, `"1 week"`).
//! Decimal units are powers of 1000, binary units powers of 1024.

use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// When the active log file is replaced by a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Rotate before a write would push the file past this many bytes.
    Size(u64),
    /// Rotate once the active file is this old, counted from its creation.
    Interval(Duration),
    Never,
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Size(5_000_000)
    }
}

impl FromStr for Rotation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        let invalid = |reason: &str| ConfigError::InvalidRotation {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        match value.as_str() {
            "never" | "none" => return Ok(Rotation::Never),
            "minutely" => return Ok(Rotation::Interval(Duration::from_secs(MINUTE))),
            "hourly" => return Ok(Rotation::Interval(Duration::from_secs(HOUR))),
            "daily" => return Ok(Rotation::Interval(Duration::from_secs(DAY))),
            "weekly" => return Ok(Rotation::Interval(Duration::from_secs(WEEK))),
            _ => {}
        }

        let split = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let amount: f64 = number
            .parse()
            .map_err(|_| invalid("expected a number followed by a unit"))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(invalid("threshold must be positive"));
        }

        let unit = unit.trim();
        if let Some(multiplier) = size_multiplier(unit) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let bytes = (amount * multiplier as f64).round() as u64;
            if bytes == 0 {
                return Err(invalid("threshold must be at least one byte"));
            }
            return Ok(Rotation::Size(bytes));
        }

        if let Some(seconds) = interval_seconds(unit) {
            #[allow(clippy::cast_precision_loss)]
            let interval = Duration::try_from_secs_f64(amount * seconds as f64)
                .map_err(|_| invalid("interval out of range"))?;
            return Ok(Rotation::Interval(interval));
        }

        Err(invalid("unknown unit"))
    }
}

fn size_multiplier(unit: &str) -> Option<u64> {
    let multiplier = match unit {
        "" | "b" | "byte" | "bytes" => 1,
        "kb" => 1_000,
        "mb" => 1_000_000,
        "gb" => 1_000_000_000,
        "tb" => 1_000_000_000_000,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        _ => return None,
    };
    Some(multiplier)
}

fn interval_seconds(unit: &str) -> Option<u64> {
    let seconds = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => WEEK,
        _ => return None,
    };
    Some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_five_megabytes() {
        assert_eq!(Rotation::default(), "5 MB".parse().unwrap());
    }

    #[test]
    fn test_size_units() {
        assert_eq!("5 MB".parse::<Rotation>().unwrap(), Rotation::Size(5_000_000));
        assert_eq!("512KiB".parse::<Rotation>().unwrap(), Rotation::Size(524_288));
        assert_eq!("0.5 gb".parse::<Rotation>().unwrap(), Rotation::Size(500_000_000));
        assert_eq!("100".parse::<Rotation>().unwrap(), Rotation::Size(100));
    }

    #[test]
    fn test_intervals() {
        assert_eq!(
            "daily".parse::<Rotation>().unwrap(),
            Rotation::Interval(Duration::from_secs(DAY))
        );
        assert_eq!(
            "6 hours".parse::<Rotation>().unwrap(),
            Rotation::Interval(Duration::from_secs(6 * HOUR))
        );
        assert_eq!(
            "1 week".parse::<Rotation>().unwrap(),
            Rotation::Interval(Duration::from_secs(WEEK))
        );
        assert_eq!(
            "30 min".parse::<Rotation>().unwrap(),
            Rotation::Interval(Duration::from_secs(30 * MINUTE))
        );
    }

    #[test]
    fn test_never() {
        assert_eq!("never".parse::<Rotation>().unwrap(), Rotation::Never);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<Rotation>().is_err());
        assert!("five megabytes".parse::<Rotation>().is_err());
        assert!("5 parsecs".parse::<Rotation>().is_err());
        assert!("0 MB".parse::<Rotation>().is_err());
    }
}
