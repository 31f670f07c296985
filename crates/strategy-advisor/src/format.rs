//! Presentation helpers
//!
//! Rounding happens here and only here; the engine works on exact fractions.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fraction as a one-decimal percentage, e.g. `0.1167` -> `"11.7%"`
pub fn format_percent(fraction: Decimal) -> String {
    match fraction.checked_mul(dec!(100)) {
        Some(percent) => {
            let percent = percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.1}%", percent)
        }
        // beyond the Decimal range as a percentage; the fractional digits no longer show
        None => format!("{}00%", fraction.trunc()),
    }
}

/// USD amount with thousands separators, e.g. `"$12,345.50"`
pub fn format_usd(amount: Decimal, decimals: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}${}.{}", sign, grouped, f),
        None => format!("{}${}", sign, grouped),
    }
}
