use bigdecimal::{BigDecimal, Zero};

/// Upper bound for a single entry and for one worker's day.
pub const MAX_DAILY_HOURS: i64 = 24;
/// Upper bound for one worker's Sunday-anchored week.
pub const MAX_WEEKLY_HOURS: i64 = 168;

pub fn hours(value: i64) -> BigDecimal {
    BigDecimal::from(value).with_scale(2)
}

pub fn zero_hours() -> BigDecimal {
    hours(0)
}

/// Hours are stored with two decimal places.
pub fn normalize_hours(value: &BigDecimal) -> BigDecimal {
    value.round(2).with_scale(2)
}

/// Normalizes a client-supplied amount, judging its magnitude from the
/// digits and exponent alone so that rescaling stays cheap.
///
/// `None` means the value is far outside any plausible number of hours.
/// Values with more than 40 fractional places round to zero.
pub fn input_hours(value: &BigDecimal) -> Option<BigDecimal> {
    if value.is_zero() {
        return Some(zero_hours());
    }
    let (digits, scale) = value.as_bigint_and_exponent();
    if digits.bits() > 64 || scale < -2 {
        return None;
    }
    if scale > 40 {
        return Some(zero_hours());
    }
    Some(normalize_hours(value))
}

pub fn sum_hours<'a, I>(values: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    values
        .into_iter()
        .fold(zero_hours(), |total, value| total + value)
}

/// `0 <= value <= 24`
pub fn within_entry_bounds(value: &BigDecimal) -> bool {
    *value >= zero_hours() && *value <= hours(MAX_DAILY_HOURS)
}

pub fn non_negative(value: BigDecimal) -> BigDecimal {
    if value < zero_hours() {
        zero_hours()
    } else {
        value
    }
}

/// `part / whole * 100`, rounded to two decimals; zero when `whole` is zero.
pub fn percentage(part: &BigDecimal, whole: &BigDecimal) -> BigDecimal {
    if *whole == zero_hours() {
        return zero_hours();
    }
    let scaled = part * &BigDecimal::from(100);
    normalize_hours(&(&scaled / whole))
}

/// `total / count`, rounded to two decimals; zero when `count` is zero.
pub fn average(total: &BigDecimal, count: usize) -> BigDecimal {
    if count == 0 {
        return zero_hours();
    }
    normalize_hours(&(total / &BigDecimal::from(count as u64)))
}
