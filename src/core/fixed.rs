//! Fixed-point helpers over 256-bit unsigned integers.
//!
//! Prices carry [`PRICE_DECIMALS`] decimal places, weights are basis points
//! out of [`BPS_DENOMINATOR`]. Every arithmetic step is checked and surfaces
//! [`IndexError::ArithmeticOverflow`] instead of wrapping.

use super::error::IndexError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

/// Decimal places of a fixed-point price.
pub const PRICE_DECIMALS: u32 = 18;

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u16 = 10_000;

pub fn checked_mul(a: U256, b: U256, context: &'static str) -> Result<U256, IndexError> {
    a.checked_mul(b)
        .ok_or(IndexError::ArithmeticOverflow(context))
}

pub fn checked_add(a: U256, b: U256, context: &'static str) -> Result<U256, IndexError> {
    a.checked_add(b)
        .ok_or(IndexError::ArithmeticOverflow(context))
}

/// `10^exponent`, or `None` once it no longer fits in 256 bits.
pub fn pow10(exponent: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exponent))
}

/// `floor(a * b / denominator)` with a checked intermediate product.
pub fn mul_div_floor(
    a: U256,
    b: U256,
    denominator: U256,
    context: &'static str,
) -> Result<U256, IndexError> {
    let product = checked_mul(a, b, context)?;
    product
        .checked_div(denominator)
        .ok_or(IndexError::ArithmeticOverflow(context))
}

/// Converts an exact decimal into a fixed-point integer with `decimals` places.
///
/// Negative values and values with more fractional digits than `decimals`
/// are rejected rather than rounded.
pub fn from_decimal(value: Decimal, decimals: u32) -> Result<U256, IndexError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(IndexError::InvalidConfiguration(format!(
            "negative amount {value} is not allowed"
        )));
    }
    let value = value.normalize();
    let scale = value.scale();
    if scale > decimals {
        return Err(IndexError::InvalidConfiguration(format!(
            "{value} has more than {decimals} fractional digits"
        )));
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let unit = pow10(decimals - scale).ok_or(IndexError::ArithmeticOverflow("decimal scaling"))?;
    checked_mul(mantissa, unit, "decimal scaling")
}

/// Parses a decimal string such as `"2.5"` into fixed point.
pub fn parse_decimal(text: &str, decimals: u32) -> Result<U256, IndexError> {
    let value = Decimal::from_str(text.trim()).map_err(|e| {
        IndexError::InvalidConfiguration(format!("invalid decimal amount '{text}': {e}"))
    })?;
    from_decimal(value, decimals)
}

/// Converts a quoted floating point price into an 18-decimal fixed-point price.
pub fn price_from_f64(price: f64) -> Result<U256, IndexError> {
    let value = Decimal::from_f64(price).ok_or_else(|| {
        IndexError::InvalidConfiguration(format!("price {price} is not representable"))
    })?;
    from_decimal(value.round_dp(PRICE_DECIMALS), PRICE_DECIMALS)
}

/// Renders a fixed-point integer as a decimal string truncated to `precision`
/// fractional digits.
pub fn format_fixed(value: U256, decimals: u32, precision: u32) -> String {
    // a unit above U256::MAX leaves every value in the fraction
    let (whole, fraction) = match pow10(decimals) {
        Some(unit) => value.div_mod(unit),
        None => (U256::zero(), value),
    };
    let precision = precision.min(decimals);
    if precision == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{whole}.{}", &fraction[..precision as usize])
}

/// Renders basis points as a percentage, e.g. `5000` as `50.00%`.
pub fn format_bps(weight: u16) -> String {
    format!("{}.{:02}%", weight / 100, weight % 100)
}
