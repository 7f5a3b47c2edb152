//! Postgres value notation: byte sizes (`64MB`, `2GB`) and plain decimals.

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;
pub const TB: u64 = 1024 * GB;

/// Parse a Postgres byte size such as `2GB`, `1.95GB` or `26214kB` into bytes.
///
/// Units are case-sensitive as in Postgres. A bare number has no defined unit
/// (it depends on the setting) and is rejected.
pub fn parse_bytes(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);

    let number: f64 = number.parse().ok()?;
    let multiplier = match unit.trim() {
        "B" => 1,
        "kB" => KB,
        "MB" => MB,
        "GB" => GB,
        "TB" => TB,
        _ => return None,
    };

    Some(number * multiplier as f64)
}

/// Parse a plain decimal setting value.
pub fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format bytes using the largest unit that divides them exactly, falling back
/// to whole kilobytes.
pub fn format_bytes(bytes: u64) -> String {
    for (unit, size) in [("TB", TB), ("GB", GB), ("MB", MB)] {
        if bytes >= size && bytes % size == 0 {
            return format!("{}{}", bytes / size, unit);
        }
    }
    format!("{}kB", bytes / KB)
}
