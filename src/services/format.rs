// src/services/format.rs

/// Renders a counter at human scale: plain digits below 1000, one decimal
/// with a `K` suffix below one million, `M` above. Sign is carried through.
pub fn format_compact(n: i64) -> String {
    let magnitude = n.unsigned_abs();
    if magnitude >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if magnitude >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Ratio as a percentage string with one decimal. A zero denominator yields
/// "0.0" instead of propagating NaN.
pub fn percentage(numerator: f64, denominator: f64) -> String {
    if denominator == 0.0 {
        "0.0".to_string()
    } else {
        format!("{:.1}", numerator / denominator * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_render_as_plain_digits() {
        assert_eq!(format_compact(0), "0");
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(-42), "-42");
    }

    #[test]
    fn thousands_get_one_decimal_and_k_suffix() {
        assert_eq!(format_compact(1_000), "1.0K");
        assert_eq!(format_compact(1_500), "1.5K");
        assert_eq!(format_compact(999_949), "999.9K");
        assert_eq!(format_compact(-1_500), "-1.5K");
    }

    #[test]
    fn millions_get_one_decimal_and_m_suffix() {
        assert_eq!(format_compact(1_000_000), "1.0M");
        assert_eq!(format_compact(704_753_890), "704.8M");
    }

    #[test]
    fn percentage_fixes_one_decimal() {
        assert_eq!(percentage(800.0, 1000.0), "80.0");
        assert_eq!(percentage(50.0, 1000.0), "5.0");
        assert_eq!(percentage(1.0, 3.0), "33.3");
    }

    #[test]
    fn percentage_degrades_on_zero_denominator() {
        assert_eq!(percentage(5.0, 0.0), "0.0");
        assert_eq!(percentage(0.0, 0.0), "0.0");
    }
}
