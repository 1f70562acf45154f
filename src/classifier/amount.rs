use std::str::FromStr;

use rust_decimal::Decimal;

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];
// Twice the digits a Decimal can carry; anything larger overflows or rounds to zero
const MAX_EXPONENT: u32 = 56;

/// Parses a spending amount out of a stringified cell.
///
/// Currency symbols and thousands separators (`,`) are dropped, then the
/// leading number is read with `.` as the decimal point; trailing text such
/// as `INR` or `Dr` is ignored. Returns `None` when there is no leading
/// number, when it does not fit a [`Decimal`], or when it is not positive.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    let number = leading_number(cleaned.trim_start());
    if number.is_empty() {
        return None;
    }

    let amount = match number.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => scale_by_power_of_ten(mantissa, exponent)?,
        None => Decimal::from_str(number).ok()?,
    };

    (amount > Decimal::ZERO).then_some(amount)
}

/// Longest prefix of `text` shaped like `[+-]digits[.digits][e[+-]digits]`.
///
/// Anything else, `_` included, ends the number.
fn leading_number(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let whole = count_digits(&bytes[end..]);
    end += whole;

    let fraction = match bytes.get(end) {
        Some(b'.') => count_digits(&bytes[end + 1..]),
        _ => 0,
    };
    if fraction > 0 {
        end += 1 + fraction;
    }
    if whole + fraction == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let digits = count_digits(&bytes[exponent..]);
        if digits > 0 {
            end = exponent + digits;
        }
    }

    &text[..end]
}

/// `mantissa × 10^exponent` with checked arithmetic.
fn scale_by_power_of_ten(mantissa: &str, exponent: &str) -> Option<Decimal> {
    let mut value = Decimal::from_str(mantissa).ok()?;
    let exponent: i32 = exponent.parse().ok()?;
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return None;
    }
    for _ in 0..exponent.unsigned_abs() {
        value = if exponent > 0 {
            value.checked_mul(Decimal::TEN)?
        } else {
            value.checked_div(Decimal::TEN)?
        };
    }
    Some(value)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
