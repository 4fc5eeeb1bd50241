use dashu::integer::{IBig, UBig};
use dashu::rational::RBig;

use crate::error::EvalError;

/// Read a decimal literal (`12`, `0.25`) as an exact rational.
pub fn parse_decimal(literal: &str) -> Result<RBig, EvalError> {
    let invalid = || EvalError::InvalidNumber(literal.to_string());

    let (int_part, frac_part) = match literal.split_once('.') {
        Some((i, f)) => (i, f),
        None => (literal, ""),
    };
    if int_part.is_empty() || literal.ends_with('.') {
        return Err(invalid());
    }

    let digits = format!("{}{}", int_part, frac_part);
    let numerator = UBig::from_str_radix(&digits, 10).map_err(|_| invalid())?;
    let denominator = UBig::from(10u8).pow(frac_part.len());
    Ok(RBig::from_parts(IBig::from(numerator), denominator))
}

/// Nearest `f64` to an exact rational.
pub fn to_f64(value: &RBig) -> f64 {
    value.to_f64().value()
}

/// Exact rational for a finite `f64`.
pub fn from_f64(value: f64) -> Result<RBig, EvalError> {
    finite(value, "f64 conversion")
}

pub(crate) fn finite(value: f64, what: &'static str) -> Result<RBig, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::NonFinite(what));
    }
    Ok(exact(value))
}

/// Every finite `f64` is `mantissa * 2^exp` for integers, so the rational is exact.
fn exact(value: f64) -> RBig {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };

    let mut numerator = IBig::from(mantissa);
    if bits >> 63 == 1 {
        numerator = -numerator;
    }
    if exp >= 0 {
        RBig::from(numerator << exp as usize)
    } else {
        RBig::from_parts(numerator, UBig::ONE << (-exp) as usize)
    }
}
