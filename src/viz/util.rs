//! Utility functions for visualization: colors, locale mapping, unit detection.

use num_format::{Locale, ToFormattedString};

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [&str; 10] = [
    "#4472C4", // blue
    "#ED7D31", // orange
    "#A5A5A5", // gray
    "#FFC000", // gold
    "#5B9BD5", // light blue
    "#70AD47", // green
    "#264478", // dark blue
    "#9E480E", // dark orange
    "#636363", // dark gray
    "#997300", // brownish gold
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> &'static str {
    OFFICE10[idx % OFFICE10.len()]
}

/// `#RRGGBB` -> `rgba(r,g,b,alpha)`. Malformed input falls back to grey.
pub fn hex_rgba(hex: &str, alpha: f64) -> String {
    let h = hex.trim_start_matches('#');
    let channel = |i: usize| h.get(i..i + 2).and_then(|s| u8::from_str_radix(s, 16).ok());
    match (h.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => format!("rgba({r},{g},{b},{alpha})"),
        _ => format!("rgba(128,128,128,{alpha})"),
    }
}

/// Heuristic: treat percent-like units as rates (zero line, no magnitude scaling).
pub fn is_percentage_like(unit: &str) -> bool {
    let u = unit.to_ascii_lowercase();
    u.contains('%') || u.contains("percent") || u.contains("percentage") || u.contains("per cent")
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Format with grouped thousands and `decimals` fraction digits in the given locale,
/// e.g. `12345.678` -> `12,345.68` (en) or `12.345,68` (de).
pub fn format_value(v: f64, decimals: usize, locale: &Locale, decimal_sep: char) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let grouped = int_part
        .parse::<u64>()
        .map(|n| n.to_formatted_string(locale))
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if v < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}{decimal_sep}{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(office_color(0), "#4472C4");
        assert_eq!(office_color(10), office_color(0));
    }

    #[test]
    fn rgba_from_hex() {
        assert_eq!(hex_rgba("#4472C4", 0.08), "rgba(68,114,196,0.08)");
        assert_eq!(hex_rgba("oops", 0.5), "rgba(128,128,128,0.5)");
    }

    #[test]
    fn percentage_units() {
        assert!(is_percentage_like("% y/y"));
        assert!(is_percentage_like("Percent of GDP"));
        assert!(!is_percentage_like("USD/bbl"));
    }

    #[test]
    fn locale_formatting() {
        let (loc_en, dot) = map_locale("en");
        assert_eq!(format_value(12345.678, 2, loc_en, dot), "12,345.68");
        let (loc_de, comma) = map_locale("de");
        assert_eq!(format_value(-1234.5, 1, loc_de, comma), "-1.234,5");
        assert_eq!(format_value(-0.001, 2, loc_en, dot), "0.00");
    }
}
