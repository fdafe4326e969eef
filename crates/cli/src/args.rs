//! Parsing of repeated `key=value` style arguments.

use anyhow::{anyhow, bail, Context};
use serde_json::{Map, Value};

/// Build a JSON object from `--field` arguments and an optional `--json` document.
///
/// `key=value` sets a string; `key:=value` sets raw JSON (numbers, booleans, arrays). Fields are
/// applied on top of the `--json` document.
pub fn payload(fields: &[String], json: Option<&str>) -> anyhow::Result<Value> {
    let mut object = match json {
        Some(text) => match serde_json::from_str(text).context("--json is not valid JSON")? {
            Value::Object(map) => map,
            _ => bail!("--json must be a JSON object"),
        },
        None => Map::new(),
    };

    for field in fields {
        let (key, value) = field_value(field)?;
        object.insert(key, value);
    }

    Ok(Value::Object(object))
}

fn field_value(arg: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value or key:=json, got {arg:?}"))?;

    match key.strip_suffix(':') {
        Some(key) => {
            let parsed = serde_json::from_str(value)
                .with_context(|| format!("value of {key} is not valid JSON: {value}"))?;
            Ok((checked_key(key)?, parsed))
        }
        None => Ok((checked_key(key)?, Value::String(value.to_string()))),
    }
}

fn checked_key(key: &str) -> anyhow::Result<String> {
    let key = key.trim();
    if key.is_empty() {
        bail!("field name cannot be empty");
    }
    Ok(key.to_string())
}

/// Split a `--filter name=value` argument.
pub fn filter(arg: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got {arg:?}"))?;
    Ok((name.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_override_json_document() {
        let fields = vec![
            "department=cardiology".to_string(),
            "capacity:=12".to_string(),
            "symptoms:=[\"chest pain\"]".to_string(),
        ];
        let value = payload(&fields, Some(r#"{"department": "icu", "urgency": "high"}"#))
            .expect("payload");

        assert_eq!(
            value,
            json!({
                "department": "cardiology",
                "urgency": "high",
                "capacity": 12,
                "symptoms": ["chest pain"],
            })
        );
    }

    #[test]
    fn equals_inside_value_is_kept() {
        let value = payload(&["notes=a=b".to_string()], None).expect("payload");
        assert_eq!(value["notes"], "a=b");
    }

    #[test]
    fn malformed_fields_are_rejected() {
        assert!(payload(&["novalue".to_string()], None).is_err());
        assert!(payload(&["=x".to_string()], None).is_err());
        assert!(payload(&["n:=not json".to_string()], None).is_err());
        assert!(payload(&[], Some("[1, 2]")).is_err());
    }

    #[test]
    fn filter_splits_on_first_equals() {
        assert_eq!(filter("status = pending").expect("filter"), ("status", "pending"));
        assert!(filter("status").is_err());
    }
}
