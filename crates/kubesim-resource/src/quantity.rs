//! Exact resource quantities.
//!
//! A [`Quantity`] is a signed fixed-point amount counted in nano-units
//! (10^-9). Binary floating point is never involved, so `2Gi + 4Gi` is
//! exactly `6Gi`.
//!
//! Parsed magnitudes are capped at [`Quantity::MAX`] (`i64::MAX` whole
//! units, the range Kubernetes quantities use). The nano-unit counter has
//! room for billions of such values on top of that, and `+`/`-` saturate
//! at the counter's limits instead of wrapping.
//!
//! Accepted syntax is `<sign?><digits>[.<digits>]<suffix?>` where the
//! suffix is one of:
//!
//! - decimal SI: `n u m k M G T P E`
//! - binary SI: `Ki Mi Gi Ti Pi Ei`
//! - decimal exponent: `e<int>` / `E<int>` (a bare `E` is exa)
//!
//! Digits below one nano-unit round away from zero.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::QuantityError;

/// Nano-units per whole unit.
const NANO: i128 = 1_000_000_000;

const DECIMAL_SUFFIXES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];
const BINARY_SUFFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Integer digits are limited so the mantissa always fits an `i128`.
const MAX_MANTISSA_DIGITS: usize = 38;

/// Largest accepted magnitude, in nano-units.
const MAX_NANOS: i128 = i64::MAX as i128 * NANO;

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-]?)(?P<int>[0-9]*)(?:\.(?P<frac>[0-9]*))?(?P<suffix>.*)$")
        .expect("quantity pattern is a valid regex")
});

/// Suffix family a quantity was written with. Only affects display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    DecimalSI,
    BinarySI,
    DecimalExponent,
}

enum Scale {
    /// Multiply by 10^n.
    Decimal(i64),
    /// Multiply by 1024^n.
    Binary(u32),
}

/// An exact resource amount.
///
/// Equality, ordering and hashing look at the amount only: `2Gi` equals
/// `2147483648` even though they display differently.
#[derive(Clone, Copy, Default)]
pub struct Quantity {
    nanos: i128,
    format: Format,
}

impl Quantity {
    /// Largest magnitude [`Quantity::parse`] accepts: `i64::MAX` units.
    pub const MAX: Self = Self::from_nanos(MAX_NANOS);

    pub const fn zero() -> Self {
        Self {
            nanos: 0,
            format: Format::DecimalSI,
        }
    }

    /// Whole units, displayed with decimal suffixes.
    pub const fn from_units(units: i64) -> Self {
        Self {
            nanos: units as i128 * NANO,
            format: Format::DecimalSI,
        }
    }

    /// Thousandths of a unit (`from_milli(500)` is `500m`).
    pub const fn from_milli(milli: i64) -> Self {
        Self {
            nanos: milli as i128 * 1_000_000,
            format: Format::DecimalSI,
        }
    }

    pub const fn from_nanos(nanos: i128) -> Self {
        Self {
            nanos,
            format: Format::DecimalSI,
        }
    }

    /// Whole units, displayed with binary suffixes (`binary(1024)` is `1Ki`).
    pub const fn binary(units: i64) -> Self {
        Self {
            nanos: units as i128 * NANO,
            format: Format::BinarySI,
        }
    }

    pub const fn with_format(self, format: Format) -> Self {
        Self {
            nanos: self.nanos,
            format,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn nanos(&self) -> i128 {
        self.nanos
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// Whole units, rounded up.
    pub fn value(&self) -> i128 {
        ceil_div(self.nanos, NANO)
    }

    /// Thousandths of a unit, rounded up.
    pub fn milli_value(&self) -> i128 {
        ceil_div(self.nanos, 1_000_000)
    }

    /// Parse a quantity string such as `500m`, `2Gi` or `1e3`.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        if input.is_empty() {
            return Err(QuantityError::Empty);
        }

        let caps = QUANTITY_RE
            .captures(input)
            .ok_or_else(|| QuantityError::InvalidNumber(input.to_string()))?;

        let negative = &caps["sign"] == "-";
        let int = caps["int"].trim_start_matches('0');
        let frac = caps
            .name("frac")
            .map_or("", |m| m.as_str())
            .trim_end_matches('0');

        let has_frac_digits = caps.name("frac").is_some_and(|m| !m.as_str().is_empty());
        if caps["int"].is_empty() && !has_frac_digits {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let (scale, format) = parse_suffix(&caps["suffix"])
            .ok_or_else(|| QuantityError::UnknownSuffix(caps["suffix"].to_string()))?;

        let digits = format!("{int}{frac}");
        if digits.len() > MAX_MANTISSA_DIGITS {
            return Err(QuantityError::OutOfRange(input.to_string()));
        }
        let mantissa: i128 = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|_| QuantityError::InvalidNumber(input.to_string()))?
        };
        let frac_len = frac.len() as i64;

        let magnitude = match scale {
            Scale::Decimal(exp) => scale_decimal(mantissa, 9 + exp - frac_len),
            Scale::Binary(power) => scale_binary(mantissa, power, frac_len),
        }
        .filter(|magnitude| *magnitude <= MAX_NANOS)
        .ok_or_else(|| QuantityError::OutOfRange(input.to_string()))?;

        Ok(Self {
            nanos: if negative { -magnitude } else { magnitude },
            format,
        })
    }
}

fn parse_suffix(suffix: &str) -> Option<(Scale, Format)> {
    let decimal = |exp| Some((Scale::Decimal(exp), Format::DecimalSI));
    let binary = |power| Some((Scale::Binary(power), Format::BinarySI));

    match suffix {
        "" => decimal(0),
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        "Ki" => binary(1),
        "Mi" => binary(2),
        "Gi" => binary(3),
        "Ti" => binary(4),
        "Pi" => binary(5),
        "Ei" => binary(6),
        _ => {
            let exp = suffix.strip_prefix(['e', 'E'])?;
            if exp.is_empty() {
                return None;
            }
            let exp: i32 = exp.parse().ok()?;
            Some((Scale::Decimal(i64::from(exp)), Format::DecimalExponent))
        }
    }
}

/// `mantissa * 10^exp`, rounded up to a whole nano-unit.
fn scale_decimal(mantissa: i128, exp: i64) -> Option<i128> {
    if mantissa == 0 {
        return Some(0);
    }
    if exp >= 0 {
        let factor = 10i128.checked_pow(u32::try_from(exp).ok()?)?;
        mantissa.checked_mul(factor)
    } else {
        // Anything past 10^38 is below one nano-unit.
        match u32::try_from(-exp).ok().and_then(|e| 10i128.checked_pow(e)) {
            Some(divisor) => Some(ceil_div(mantissa, divisor)),
            None => Some(1),
        }
    }
}

/// `mantissa / 10^frac_len * 1024^power`, in nano-units, rounded up.
///
/// The multiplier is `2^(10 * power + 9) * 5^9` and the divisor
/// `2^frac_len * 5^frac_len`. Common factors are cancelled first and the
/// mantissa is split into quotient and remainder, so no intermediate
/// product is larger than the result needs.
fn scale_binary(mantissa: i128, power: u32, frac_len: i64) -> Option<i128> {
    let frac_len = u32::try_from(frac_len).ok()?;
    let num_twos = 10 * power + 9;
    let twos = frac_len.min(num_twos);
    let fives = frac_len.min(9);

    let num = 2i128
        .checked_pow(num_twos - twos)?
        .checked_mul(5i128.checked_pow(9 - fives)?)?;
    let den = 2i128
        .checked_pow(frac_len - twos)?
        .checked_mul(5i128.checked_pow(frac_len - fives)?)?;

    let whole = (mantissa / den).checked_mul(num)?;
    let rest = ceil_div((mantissa % den).checked_mul(num)?, den);
    whole.checked_add(rest)
}

fn ceil_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d > 0 { q + 1 } else { q }
}

/// Largest `k` such that `base^k` divides `value`, capped at 6.
fn largest_exact_power(value: u128, base: u128) -> usize {
    let mut k = 0;
    let mut divisor = base;
    while k < 6 && value % divisor == 0 {
        k += 1;
        divisor *= base;
    }
    k
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return f.write_str("0");
        }
        if self.nanos < 0 {
            f.write_str("-")?;
        }

        let abs = self.nanos.unsigned_abs();
        let nano = NANO as u128;

        if abs % nano != 0 {
            let (value, suffix) = if abs % 1_000_000 == 0 {
                (abs / 1_000_000, ["m", "e-3"])
            } else if abs % 1_000 == 0 {
                (abs / 1_000, ["u", "e-6"])
            } else {
                (abs, ["n", "e-9"])
            };
            let suffix = match self.format {
                Format::DecimalExponent => suffix[1],
                _ => suffix[0],
            };
            return write!(f, "{value}{suffix}");
        }

        let whole = abs / nano;
        match self.format {
            Format::BinarySI => {
                let k = largest_exact_power(whole, 1024);
                write!(f, "{}{}", whole / 1024u128.pow(k as u32), BINARY_SUFFIXES[k])
            }
            Format::DecimalSI => {
                let k = largest_exact_power(whole, 1000);
                write!(f, "{}{}", whole / 1000u128.pow(k as u32), DECIMAL_SUFFIXES[k])
            }
            Format::DecimalExponent => {
                let k = largest_exact_power(whole, 1000);
                if k == 0 {
                    write!(f, "{whole}")
                } else {
                    write!(f, "{}e{}", whole / 1000u128.pow(k as u32), 3 * k)
                }
            }
        }
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({self})")
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl std::hash::Hash for Quantity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nanos.hash(state);
    }
}

impl Add for Quantity {
    type Output = Self;

    /// Keeps the left operand's format unless it is zero. Saturates at the
    /// limits of the nano-unit counter.
    fn add(self, rhs: Self) -> Self {
        let format = if self.is_zero() { rhs.format } else { self.format };
        Self {
            nanos: self.nanos.saturating_add(rhs.nanos),
            format,
        }
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let format = if self.is_zero() { rhs.format } else { self.format };
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
            format,
        }
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Quantity {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            nanos: self.nanos.saturating_neg(),
            format: self.format,
        }
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl Visitor<'_> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a quantity string such as \"500m\" or \"2Gi\", or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
                Quantity::parse(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
                Ok(Quantity::from_units(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
                i64::try_from(v)
                    .map(Quantity::from_units)
                    .map_err(|_| E::custom(QuantityError::OutOfRange(v.to_string())))
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn parses_plain_integers() {
        assert_eq!(q("1"), Quantity::from_units(1));
        assert_eq!(q("0"), Quantity::zero());
        assert_eq!(q("007"), Quantity::from_units(7));
        assert_eq!(q("+3"), Quantity::from_units(3));
    }

    #[test]
    fn parses_binary_suffixes() {
        assert_eq!(q("1Ki").value(), 1024);
        assert_eq!(q("2Gi").value(), 2 * 1024 * 1024 * 1024);
        assert_eq!(q("1Ei").value(), 1 << 60);
        assert_eq!(q("2Gi").format(), Format::BinarySI);
    }

    #[test]
    fn parses_decimal_suffixes() {
        assert_eq!(q("500m"), Quantity::from_milli(500));
        assert_eq!(q("2k").value(), 2_000);
        assert_eq!(q("1G").value(), 1_000_000_000);
        assert_eq!(q("1E").value(), 1_000_000_000_000_000_000);
        assert_eq!(q("3u").nanos(), 3_000);
        assert_eq!(q("7n").nanos(), 7);
    }

    #[test]
    fn parses_fractions() {
        assert_eq!(q("0.5"), Quantity::from_milli(500));
        assert_eq!(q(".25"), Quantity::from_milli(250));
        assert_eq!(q("1.5Gi"), q("1536Mi"));
        assert_eq!(q("1.0"), Quantity::from_units(1));
    }

    #[test]
    fn parses_exponents() {
        assert_eq!(q("1e3"), Quantity::from_units(1000));
        assert_eq!(q("5E2"), Quantity::from_units(500));
        assert_eq!(q("1e-3"), Quantity::from_milli(1));
        assert_eq!(q("1e3").format(), Format::DecimalExponent);
    }

    #[test]
    fn long_binary_fractions_fit() {
        let just_over = q("1.0000000000000000000000000001Ei");
        assert_eq!(just_over.nanos(), q("1Ei").nanos() + 1);
        assert_eq!(just_over.format(), Format::BinarySI);

        assert_eq!(q("0.00000000000000000000000000000000000001Ki").nanos(), 1);
        assert_eq!(q("1.00000000000000000000000000000000000Ki"), q("1Ki"));
        assert_eq!(q("0.5Ki"), q("512"));
        assert_eq!(q("7.99999999999999999Ei").value(), (1 << 63) - 11);
    }

    #[test]
    fn sub_nano_precision_rounds_up() {
        assert_eq!(q("0.1n").nanos(), 1);
        assert_eq!(q("1e-20").nanos(), 1);
        assert_eq!(q("1.0000000001").nanos(), NANO + 1);
    }

    #[test]
    fn parses_negative_values() {
        let neg = q("-1Gi");
        assert!(neg.is_negative());
        assert_eq!(neg, -q("1Gi"));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Quantity::parse(""), Err(QuantityError::Empty));
        assert!(matches!(Quantity::parse("bar"), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(Quantity::parse("."), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(Quantity::parse("-"), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(Quantity::parse("Gi"), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(Quantity::parse("1K"), Err(QuantityError::UnknownSuffix(_))));
        assert!(matches!(Quantity::parse("1 "), Err(QuantityError::UnknownSuffix(_))));
        assert!(matches!(Quantity::parse("1e"), Err(QuantityError::UnknownSuffix(_))));
        assert!(matches!(Quantity::parse("1.2.3"), Err(QuantityError::UnknownSuffix(_))));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(Quantity::parse("1e40"), Err(QuantityError::OutOfRange(_))));
        assert!(matches!(
            Quantity::parse("1000000000000000000000000000000000000000"),
            Err(QuantityError::OutOfRange(_))
        ));
        // Zero is zero at any scale.
        assert_eq!(q("0e99"), Quantity::zero());
    }

    #[test]
    fn magnitude_is_capped_at_i64_units() {
        assert_eq!(q("9223372036854775807"), Quantity::MAX);
        assert_eq!(q("-9223372036854775807"), -Quantity::MAX);
        assert!(matches!(
            Quantity::parse("9223372036854775807.000000001"),
            Err(QuantityError::OutOfRange(_))
        ));
        assert!(matches!(Quantity::parse("1e19"), Err(QuantityError::OutOfRange(_))));
        assert!(matches!(Quantity::parse("8Ei"), Err(QuantityError::OutOfRange(_))));
        assert!(matches!(Quantity::parse("1e29"), Err(QuantityError::OutOfRange(_))));
        assert_eq!(q("9E").value(), 9_000_000_000_000_000_000);
    }

    #[test]
    fn arithmetic_at_the_ceiling_does_not_overflow() {
        let doubled = Quantity::MAX + Quantity::MAX;
        assert_eq!(doubled.nanos(), 2 * Quantity::MAX.nanos());

        let saturated = Quantity::from_nanos(i128::MAX) + Quantity::MAX;
        assert_eq!(saturated.nanos(), i128::MAX);
        assert!(!saturated.is_negative());

        let floor = Quantity::from_nanos(i128::MIN) - Quantity::MAX;
        assert_eq!(floor.nanos(), i128::MIN);
        assert_eq!((-floor).nanos(), i128::MAX);
    }

    #[test]
    fn equality_ignores_format() {
        assert_eq!(q("2Gi"), q("2147483648"));
        assert_eq!(q("1k"), q("1e3"));
        assert_eq!(q("1000m"), q("1"));
    }

    #[test]
    fn ordering_follows_amount() {
        assert!(q("1Gi") > q("1G"));
        assert!(q("999m") < q("1"));
        assert!(q("-1") < Quantity::zero());
    }

    #[test]
    fn displays_canonical_form() {
        assert_eq!(q("6Gi").to_string(), "6Gi");
        assert_eq!(q("1536Mi").to_string(), "1536Mi");
        assert_eq!(q("1.5Gi").to_string(), "1536Mi");
        assert_eq!(q("2048Ki").to_string(), "2Mi");
        assert_eq!(q("1000Ki").to_string(), "1000Ki");
        assert_eq!(q("3").to_string(), "3");
        assert_eq!(q("2000").to_string(), "2k");
        assert_eq!(q("1.5").to_string(), "1500m");
        assert_eq!(q("0.000001").to_string(), "1u");
        assert_eq!(q("1e3").to_string(), "1e3");
        assert_eq!(q("1e-3").to_string(), "1e-3");
        assert_eq!(q("-2Gi").to_string(), "-2Gi");
        assert_eq!(Quantity::zero().to_string(), "0");
    }

    #[test]
    fn display_round_trips() {
        for s in ["6Gi", "1500m", "2k", "1e3", "7n", "1000Ki"] {
            let parsed = q(s);
            assert_eq!(q(&parsed.to_string()), parsed, "{s}");
        }
    }

    #[test]
    fn addition_is_exact() {
        let total: Quantity = ["2Gi", "4Gi", "0.1", "0.2"].iter().map(|s| q(s)).sum();
        assert_eq!(total, q("6Gi") + q("300m"));
        assert_eq!(q("0.1") + q("0.2"), q("0.3"));
    }

    #[test]
    fn addition_keeps_left_format_unless_zero() {
        assert_eq!((q("1Gi") + q("1000")).format(), Format::BinarySI);
        assert_eq!((Quantity::zero() + q("2Gi")).to_string(), "2Gi");
    }

    #[test]
    fn subtraction() {
        let mut left = q("4Gi");
        left -= q("2Gi");
        assert_eq!(left, q("2Gi"));
        assert!((q("1") - q("2")).is_negative());
    }

    #[test]
    fn value_rounds_up() {
        assert_eq!(q("1500m").value(), 2);
        assert_eq!(q("1").value(), 1);
        assert_eq!(q("-1500m").value(), -1);
        assert_eq!(q("1.5u").milli_value(), 1);
    }

    #[test]
    fn serde_uses_canonical_strings() {
        let json = serde_json::to_string(&q("2048Mi")).unwrap();
        assert_eq!(json, "\"2Gi\"");

        let back: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q("2Gi"));

        let from_int: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(from_int, Quantity::from_units(3));
        assert!(serde_json::from_str::<Quantity>("18446744073709551615").is_err());

        assert!(serde_json::from_str::<Quantity>("\"bar\"").is_err());
    }
}
