use std::fmt;

/// Amounts are held as integer hundredths of the ledger's currency unit so
/// that sums over a whole ledger stay exact.
/// For PKR/USD/EUR, 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest magnitude a single amount may have: ten trillion units.
/// Anything larger is rejected as out of range, which keeps sums over
/// ledgers of realistic size far from `i64` limits.
pub const MAX_AMOUNT_CENTS: Cents = 1_000_000_000_000_000;

/// Add two amounts, clamping at the `i64` bounds instead of wrapping.
pub fn add_cents(a: Cents, b: Cents) -> Cents {
    a.saturating_add(b)
}

/// Format cents as a plain decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format cents as whole units with thousands separators, rounding half away
/// from zero. This is how the dashboard cards show money.
/// Example: 1380000 -> "13,800", -123456789 -> "-1,234,568"
pub fn format_units(cents: Cents) -> String {
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100 + u64::from(abs_cents % 100 >= 50);
    let sign = if cents < 0 && units > 0 { "-" } else { "" };

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

/// Parse a locale-neutral decimal string into cents.
/// Accepts an optional sign, whole units and any number of fraction digits.
/// More than two fraction digits are rounded to the nearest cent, half away
/// from zero. Magnitudes above [`MAX_AMOUNT_CENTS`] are out of range.
/// Example: "50.00" -> 5000, "+12.5" -> 1250, "-100" -> -10000, "0.005" -> 1
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, body) = match input.as_bytes()[0] {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    // Pad to at least three digits: "5" means 50 cents, the third digit
    // decides rounding.
    let digit = |i: usize| fraction.as_bytes().get(i).map_or(0, |b| i64::from(b - b'0'));
    let fraction_cents = digit(0) * 10 + digit(1) + i64::from(digit(2) >= 5);

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction_cents))
        .filter(|c| *c <= MAX_AMOUNT_CENTS)
        .ok_or(ParseCentsError::Overflow)?;
    Ok(if negative { -cents } else { cents })
}

/// Parse a ledger amount cell. Cells that are not numbers ("N/A", blanks,
/// typos) become `None` so they can be excluded from every sum instead of
/// silently counting as zero.
pub fn parse_amount(input: &str) -> Option<Cents> {
    parse_cents(input).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "empty amount"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_format_units_groups_thousands() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(99_900), "999");
        assert_eq!(format_units(100_000), "1,000");
        assert_eq!(format_units(1_380_000), "13,800");
        assert_eq!(format_units(123_456_789), "1,234,568");
        assert_eq!(format_units(-1_000_000), "-10,000");
    }

    #[test]
    fn test_format_units_rounds_half_away_from_zero() {
        assert_eq!(format_units(149), "1");
        assert_eq!(format_units(150), "2");
        assert_eq!(format_units(-150), "-2");
        assert_eq!(format_units(-49), "0");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents(" 12.34 "), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("7."), Ok(700));
        assert_eq!(parse_cents("+10"), Ok(1000));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
        assert_eq!(parse_cents("100.994"), Ok(10099));
        assert_eq!(parse_cents("100.995"), Ok(10100));
        assert_eq!(parse_cents("100.999"), Ok(10100));
        assert_eq!(parse_cents("-0.005"), Ok(-1));
    }

    #[test]
    fn test_parse_cents_caps_magnitude() {
        assert_eq!(parse_cents("10000000000000"), Ok(MAX_AMOUNT_CENTS));
        assert_eq!(parse_cents("-10000000000000"), Ok(-MAX_AMOUNT_CENTS));
        assert_eq!(parse_cents("10000000000000.01"), Err(ParseCentsError::Overflow));
        assert_eq!(parse_cents("50000000000000000"), Err(ParseCentsError::Overflow));
        assert_eq!(parse_amount("50000000000000000"), None);
    }

    #[test]
    fn test_add_cents_saturates() {
        assert_eq!(add_cents(1, 2), 3);
        assert_eq!(add_cents(i64::MAX, 1), i64::MAX);
        assert_eq!(add_cents(i64::MIN, -1), i64::MIN);
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert_eq!(parse_cents("abc"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("12.34.56"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("-"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1,000"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::Overflow)
        );
    }

    #[test]
    fn test_parse_amount_marks_non_numeric_missing() {
        assert_eq!(parse_amount("1200"), Some(120_000));
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("  "), None);
    }
}
