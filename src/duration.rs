//! Signed durations carrying sentinel values
//!
//! Timeouts, backoffs and connection ages are expressed as a signed count of
//! nanoseconds. Zero means "use the pool's default", positive values are real
//! durations, and small negative values are sentinels:
//!
//! * `-1` ([`SignedDuration::DISABLED`]) disables the behavior (no backoff,
//!   no idle eviction, block indefinitely on a read/write).
//! * `-2` ([`SignedDuration::NO_DEADLINE`]) disables deadline calls on the
//!   socket entirely (read/write timeouts only).
//!
//! [`std::time::Duration`] cannot represent these, so options keep the raw
//! signed value and only interpret it on demand via [`SignedDuration::timeout_kind`].

use crate::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const NANOS_PER_MICRO: i128 = 1_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SEC: i128 = 1_000_000_000;
const NANOS_PER_MIN: i128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MIN;

/// Signed nanosecond duration.
///
/// The value is stored verbatim; nothing in this crate normalizes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedDuration(i64);

/// Interpretation of a timeout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// Zero: the consumer picks its default
    Default,
    /// Positive: a hard deadline
    Deadline(Duration),
    /// Negative (other than `-2`): no deadline, block indefinitely
    Blocking,
    /// `-2`: do not set socket deadlines at all
    NoDeadline,
}

impl SignedDuration {
    /// Zero duration ("unset")
    pub const ZERO: Self = Self(0);

    /// `-1`: disables the behavior controlled by the field
    pub const DISABLED: Self = Self(-1);

    /// `-2`: disables socket deadline calls (read/write timeouts)
    pub const NO_DEADLINE: Self = Self(-2);

    /// Create from a raw nanosecond count
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create from microseconds (saturating)
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros.saturating_mul(1_000))
    }

    /// Create from milliseconds (saturating)
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Create from seconds (saturating)
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Create from seconds, or `None` if the value does not fit
    pub const fn checked_from_secs(secs: i64) -> Option<Self> {
        match secs.checked_mul(NANOS_PER_SEC as i64) {
            Some(nanos) => Some(Self(nanos)),
            None => None,
        }
    }

    /// Raw nanosecond count
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Whether the value is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the value is negative (a sentinel)
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the value is a positive duration
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Convert to a std duration; `None` for zero and sentinels.
    pub fn to_std(self) -> Option<Duration> {
        if self.0 > 0 {
            Some(Duration::from_nanos(self.0 as u64))
        } else {
            None
        }
    }

    /// Saturating addition of a std duration
    pub fn saturating_add(self, rhs: Duration) -> Self {
        self.saturating_add_signed(Self::from(rhs))
    }

    fn saturating_add_signed(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Interpret this value as a timeout
    pub fn timeout_kind(self) -> TimeoutKind {
        match self.0 {
            0 => TimeoutKind::Default,
            n if n > 0 => TimeoutKind::Deadline(Duration::from_nanos(n as u64)),
            -2 => TimeoutKind::NoDeadline,
            _ => TimeoutKind::Blocking,
        }
    }
}

impl From<Duration> for SignedDuration {
    fn from(d: Duration) -> Self {
        Self(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for SignedDuration {
    /// Negative values render as a bare nanosecond count so that sentinels
    /// round-trip through [`FromStr`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0 as i128;
        if n == 0 {
            return f.write_str("0s");
        }
        if n < 0 {
            return write!(f, "{}", n);
        }
        for (scale, unit) in [
            (NANOS_PER_HOUR, "h"),
            (NANOS_PER_MIN, "m"),
            (NANOS_PER_SEC, "s"),
            (NANOS_PER_MILLI, "ms"),
            (NANOS_PER_MICRO, "us"),
        ] {
            if n % scale == 0 {
                return write!(f, "{}{}", n / scale, unit);
            }
        }
        write!(f, "{}ns", n)
    }
}

impl FromStr for SignedDuration {
    type Err = Error;

    /// Parse a duration.
    ///
    /// Accepts unit-suffixed values (`"500ms"`, `"1m30s"`, `"1.5s"`), bare
    /// non-negative integers as seconds, and bare negative integers as raw
    /// sentinels (`"-1"`, `"-2"`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::config("empty duration"));
        }

        if let Ok(n) = s.parse::<i64>() {
            if n < 0 {
                return Ok(Self(n));
            }
            return Self::checked_from_secs(n)
                .ok_or_else(|| Error::config(format!("duration '{}' overflows", s)));
        }

        let (negative, mut rest) = match s.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if rest.is_empty() {
            return Err(Error::config(format!("invalid duration '{}'", s)));
        }

        let mut total: i128 = 0;
        while !rest.is_empty() {
            let num_end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(|| Error::config(format!("missing unit in duration '{}'", s)))?;
            let (num, tail) = rest.split_at(num_end);
            let unit_end = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_end);

            let scale = match unit {
                "ns" => 1,
                "us" | "µs" => NANOS_PER_MICRO,
                "ms" => NANOS_PER_MILLI,
                "s" => NANOS_PER_SEC,
                "m" => NANOS_PER_MIN,
                "h" => NANOS_PER_HOUR,
                _ => {
                    return Err(Error::config(format!(
                        "unknown unit '{}' in duration '{}'",
                        unit, s
                    )))
                }
            };
            total = total
                .checked_add(parse_scaled(num, scale, s)?)
                .ok_or_else(|| Error::config(format!("duration '{}' overflows", s)))?;
            rest = tail;
        }

        if negative {
            total = -total;
        }
        i64::try_from(total)
            .map(Self)
            .map_err(|_| Error::config(format!("duration '{}' overflows", s)))
    }
}

/// Parse `digits[.digits]` and multiply by `scale` nanoseconds.
fn parse_scaled(num: &str, scale: i128, original: &str) -> Result<i128> {
    let invalid = || Error::config(format!("invalid duration '{}'", original));

    let (int_part, frac_part) = match num.split_once('.') {
        Some((i, f)) => (i, f),
        None => (num, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if frac_part.contains('.') || frac_part.len() > 18 {
        return Err(invalid());
    }

    let whole: i128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid())?
    };
    let mut value = whole.checked_mul(scale).ok_or_else(invalid)?;

    if !frac_part.is_empty() {
        let digits: i128 = frac_part.parse().map_err(|_| invalid())?;
        let divisor = 10i128.pow(frac_part.len() as u32);
        value += digits * scale / divisor;
    }
    Ok(value)
}

impl Serialize for SignedDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SignedDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SignedDurationVisitor;

        impl<'de> Visitor<'de> for SignedDurationVisitor {
            type Value = SignedDuration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration string such as \"5s\" or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                if v < 0 {
                    return Ok(SignedDuration(v));
                }
                SignedDuration::checked_from_secs(v)
                    .ok_or_else(|| E::custom(format!("duration '{}' overflows", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(SignedDuration::checked_from_secs)
                    .ok_or_else(|| E::custom(format!("duration '{}' overflows", v)))
            }
        }

        deserializer.deserialize_any(SignedDurationVisitor)
    }
}
