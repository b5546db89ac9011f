use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Capitalize the first letter of every alphabetic run and lowercase the rest
/// (e.g., "west brom" -> "West Brom").
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_alpha = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }

    out
}

// Order matters: "%Y" also accepts two digits, so day-first forms go before "%Y/%m/%d".
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a dataset Date cell; unparseable input yields `None` rather than an error.
pub fn parse_match_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert a probability in [0, 1] to a percentage with one decimal place
pub fn to_percent(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}

/// Columns the dataset uses to describe recent form.
pub fn is_form_column(column: &str) -> bool {
    column.contains("form") || column.contains("win_pct")
}

/// Numerically stable softmax. NaN inputs propagate to every output.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    if scores.iter().any(|s| s.is_nan()) {
        return vec![f64::NAN; scores.len()];
    }
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
