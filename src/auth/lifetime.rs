use chrono::Duration;

/// Parses a token lifetime setting.
///
/// A bare integer is a number of minutes; `s`, `m`, `h` and `d` suffixes are
/// accepted as well. Anything else (including `-`, an empty string or a
/// non-positive amount) means the token never expires and yields `None`.
pub fn parse_lifetime(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (amount, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], c.to_ascii_lowercase()),
        _ => (value, 'm'),
    };

    let amount: i64 = amount.trim().parse().ok()?;
    if amount <= 0 {
        return None;
    }

    match unit {
        's' => Duration::try_seconds(amount),
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        _ => None,
    }
}
