//! Deserialization helpers for browser form payloads.
//!
//! HTML forms submit everything as strings: numbers arrive as free text,
//! checkboxes are present-or-absent, and multi-selects are posted as a
//! JSON-encoded array in a single hidden field. These adapters turn that
//! field bag into the typed command structs the handlers work with.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use time::macros::format_description;
use time::PrimitiveDateTime;

/// String -> f64 with a default-on-unparseable policy (0.0).
pub(crate) fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<f64>().ok()).unwrap_or(0.0))
}

/// String -> i32 with a default-on-unparseable policy (0).
pub(crate) fn i32_or_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<i32>().ok()).unwrap_or(0))
}

/// String -> i32 defaulting to 1 (attempt counters, question points).
pub(crate) fn i32_or_one<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<i32>().ok()).unwrap_or(1))
}

pub(crate) fn f64_or_one<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<f64>().ok()).unwrap_or(1.0))
}

/// Optional numeric field: blank or unparseable input becomes None.
pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<f64>().ok()))
}

pub(crate) fn opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<i32>().ok()))
}

/// Checkbox semantics: the field only appears in the payload when checked.
/// Pair with `#[serde(default)]` so absence reads as false.
pub(crate) fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        None => false,
        Some("false") | Some("0") | Some("off") => false,
        // "on" is what browsers send; tolerate explicit truthy spellings too
        Some(_) => true,
    })
}

/// JSON-encoded array string (`["id-1","id-2"]`) -> Vec<String>. A blank
/// field is an empty set; anything else must parse.
pub(crate) fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<String>>(trimmed)
        .map_err(|err| D::Error::custom(format!("invalid id list: {err}")))
}

/// Blank text inputs become None instead of empty strings.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|value| value.trim().to_string()).filter(|value| !value.is_empty()))
}

/// `<input type="datetime-local">` posts `2025-01-02T10:30` (seconds
/// optional); blank or malformed input becomes None.
pub(crate) fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<PrimitiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");

    Ok(PrimitiveDateTime::parse(trimmed, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(trimmed, without_seconds))
        .ok())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::f64_or_zero")]
        price: f64,
        #[serde(default, deserialize_with = "super::checkbox")]
        featured: bool,
        #[serde(default, deserialize_with = "super::id_list")]
        category_ids: Vec<String>,
        #[serde(default, deserialize_with = "super::empty_as_none")]
        parent_id: Option<String>,
        #[serde(default, deserialize_with = "super::opt_datetime")]
        sale_starts_at: Option<time::PrimitiveDateTime>,
    }

    fn parse(query: &str) -> Probe {
        serde_urlencoded::from_str(query).expect("form decode")
    }

    #[test]
    fn numbers_default_on_garbage() {
        assert_eq!(parse("price=19.99").price, 19.99);
        assert_eq!(parse("price=not-a-number").price, 0.0);
        assert_eq!(parse("price=").price, 0.0);
        assert_eq!(parse("").price, 0.0);
    }

    #[test]
    fn checkbox_presence_means_true() {
        assert!(parse("featured=on").featured);
        assert!(parse("featured=true").featured);
        assert!(!parse("featured=off").featured);
        assert!(!parse("").featured);
    }

    #[test]
    fn id_list_parses_json_array() {
        let probe = parse("category_ids=%5B%22cat-1%22%2C%22cat-2%22%5D");
        assert_eq!(probe.category_ids, vec!["cat-1".to_string(), "cat-2".to_string()]);
        assert!(parse("category_ids=").category_ids.is_empty());
        assert!(parse("").category_ids.is_empty());
    }

    #[test]
    fn id_list_rejects_malformed_json() {
        let result: Result<Probe, _> = serde_urlencoded::from_str("category_ids=%5Bbroken");
        assert!(result.is_err());
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(parse("parent_id=cat-1").parent_id.as_deref(), Some("cat-1"));
        assert_eq!(parse("parent_id=").parent_id, None);
        assert_eq!(parse("parent_id=+++").parent_id, None);
    }

    #[test]
    fn datetime_local_with_and_without_seconds() {
        let probe = parse("sale_starts_at=2025-06-01T09%3A30");
        let value = probe.sale_starts_at.expect("datetime");
        assert_eq!((value.hour(), value.minute(), value.second()), (9, 30, 0));

        let probe = parse("sale_starts_at=2025-06-01T09%3A30%3A15");
        assert!(probe.sale_starts_at.is_some());

        assert!(parse("sale_starts_at=garbage").sale_starts_at.is_none());
        assert!(parse("").sale_starts_at.is_none());
    }
}
