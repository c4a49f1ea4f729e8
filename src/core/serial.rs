use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Prefix used when a seed string carries no digits at all.
pub const FALLBACK_PREFIX: &str = "DSK";
/// Number used when a seed string carries no digits at all.
pub const FALLBACK_NUMBER: u64 = 1001;
/// Digit width used when a seed string carries no digits at all.
pub const FALLBACK_WIDTH: usize = 5;

/// Starting serial split into its printable parts.
///
/// `digit_width` is the literal length of the digit run in the seed, so
/// leading zeros survive as width rather than value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSerial {
    pub prefix: String,
    pub number: u64,
    pub digit_width: usize,
}

impl SeedSerial {
    pub fn new<S: Into<String>>(prefix: S, number: u64, digit_width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            number,
            digit_width: digit_width.max(1),
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_PREFIX, FALLBACK_NUMBER, FALLBACK_WIDTH)
    }

    /// Parse a seed string; see [`parse`].
    pub fn parse(seed: &str) -> Self {
        parse(seed)
    }

    /// True when this value equals the substitute for a seed without digits.
    /// An explicit `"DSK01001"` seed is indistinguishable from it.
    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    /// Format `number` with this seed's prefix and width.
    pub fn render(&self, number: u64) -> String {
        format(&self.prefix, number, self.digit_width)
    }

    pub fn as_tuple(&self) -> (&str, u64, usize) {
        (&self.prefix, self.number, self.digit_width)
    }
}

impl fmt::Display for SeedSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.number))
    }
}

/// Split a seed into prefix, numeric value and digit width.
///
/// Only the first run of ASCII digits counts; anything after it is dropped,
/// so `"AB12CD34"` parses as `AB` / `12` / width 2. Seeds without digits, or
/// whose digit run does not fit a `u64`, yield [`SeedSerial::fallback`].
pub fn parse(seed: &str) -> SeedSerial {
    let Some(start) = seed.find(|c: char| c.is_ascii_digit()) else {
        return SeedSerial::fallback();
    };
    let rest = &seed[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    match digits.parse::<u64>() {
        Ok(number) => SeedSerial::new(&seed[..start], number, digits.len()),
        Err(_) => {
            warn!(seed, "seed digit run does not fit in 64 bits; using fallback serial");
            SeedSerial::fallback()
        }
    }
}

/// Zero-pad `number` to at least `digit_width` digits after `prefix`.
///
/// Wider numbers are never truncated: `format("DSK", 100000, 5)` is
/// `"DSK100000"`.
pub fn format(prefix: &str, number: u64, digit_width: usize) -> String {
    format!("{prefix}{number:0>digit_width$}")
}

/// Two-digit (minimum) sub-number used after the hyphen in case serials.
pub fn sub_number(index: usize) -> String {
    format!("{index:02}")
}
