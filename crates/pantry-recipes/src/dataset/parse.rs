//! Cell-level parsing for recipe datasets
//!
//! Food.com exports come out of R, so list columns look like
//! `c("flour", "sugar")`, empty lists are `character(0)` and missing values
//! are `NA`. JSON datasets carry real arrays instead; both end up here.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("Valid regex pattern")
});

/// Missing-value markers
fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("null")
}

/// Trimmed text, or `None` for empty and `NA` cells
pub fn text(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!is_missing(cell)).then(|| cell.to_string())
}

/// A finite number, or `None`
pub fn number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if is_missing(cell) {
        return None;
    }
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// A non-negative whole number, accepting `38` and `38.0`
pub fn id(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    cell.parse::<u64>().ok().or_else(|| {
        number(cell)
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    })
}

/// Total minutes from an ISO-8601 duration (`PT1H30M`) or a plain number
///
/// Seconds round up to the next minute.
pub fn minutes(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if is_missing(cell) {
        return None;
    }

    if let Some(caps) = ISO_DURATION.captures(cell) {
        if (1..=4).all(|i| caps.get(i).is_none()) {
            return None;
        }
        let mut total_secs: u64 = 0;
        for (i, unit) in [(1, 86_400u64), (2, 3_600), (3, 60), (4, 1)] {
            let Some(m) = caps.get(i) else { continue };
            let value = m.as_str().parse::<u64>().ok()?;
            total_secs = value
                .checked_mul(unit)
                .and_then(|secs| total_secs.checked_add(secs))?;
        }
        return u32::try_from(total_secs.div_ceil(60)).ok();
    }

    number(cell)
        .filter(|n| *n >= 0.0)
        .and_then(|n| u32::try_from(n.round() as u64).ok())
}

/// A list cell: R vector literal, JSON array or a single bare value
pub fn list(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    if is_missing(cell) || cell == "character(0)" {
        return Vec::new();
    }

    if let Some(inner) = cell.strip_prefix("c(").and_then(|rest| rest.strip_suffix(')')) {
        return r_vector(inner);
    }

    if cell.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(cell) {
            return items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => text(&s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
        }
    }

    vec![cell.to_string()]
}

/// Items of an R vector body such as `"a", "b, c", NA`
fn r_vector(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
            continue;
        }

        let mut item = String::new();
        if c == '"' {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            item.push(escaped);
                        }
                    }
                    '"' => break,
                    other => item.push(other),
                }
            }
            if let Some(value) = text(&item) {
                items.push(value);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                item.push(c);
                chars.next();
            }
            if let Some(value) = text(&item) {
                items.push(value);
            }
        }
    }

    items
}
