use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Currency decoration stripped before numeric parsing.
static CURRENCY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,]").unwrap());

/// Cell values read as missing. Matched exactly; `" "` is a value.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// 2) True when the cell holds no value.
pub fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw)
}

/// Parse `$1,234.56` style amounts. Plain numbers pass through unchanged.
pub fn parse_currency(raw: &str) -> Result<f64> {
    let cleaned = clean_str(raw);
    let stripped = CURRENCY_CHARS.replace_all(cleaned, "");
    stripped
        .trim()
        .parse::<f64>()
        .map_err(|e| anyhow!("could not convert {:?} to a currency amount: {}", raw, e))
}

/// Accepts `2014` or `2014.0`; anything else is not a year.
pub fn parse_year(raw: &str) -> Option<i32> {
    let cleaned = clean_str(raw);
    if let Ok(year) = cleaned.parse::<i32>() {
        return Some(year);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => {
            Some(v as i32)
        }
        _ => None,
    }
}
