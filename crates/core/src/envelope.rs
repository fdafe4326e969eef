//! Normalization of backend response envelopes.
//!
//! Hospital endpoints disagree on where they put the payload: some answer
//! `{success, doctors: [...]}`, some `{success, data: [...]}`, a few return the bare array or the
//! bare record. Everything past this module sees one canonical `Vec<R>` or `R`.

use crate::constants::{ITEM_FALLBACK_KEYS, LIST_FALLBACK_KEYS};
use crate::resource::Resource;
use crate::{OpsError, OpsResult};
use serde_json::Value;

/// Unwrap a list response into records of `R`.
///
/// Records that fail to decode are skipped with a warning; the rest of the collection is kept.
pub fn unwrap_list<R: Resource>(body: Value) -> OpsResult<Vec<R>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            reject_unsuccessful(&map)?;
            let key = std::iter::once(R::LIST_KEY)
                .chain(LIST_FALLBACK_KEYS.iter().copied())
                .find(|k| matches!(map.get(*k), Some(Value::Array(_))));
            match key.and_then(|k| map.remove(k)) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(OpsError::Decode(format!(
                        "no {} list found in response (looked for {}, {})",
                        R::LABEL,
                        R::LIST_KEY,
                        LIST_FALLBACK_KEYS.join(", ")
                    )))
                }
            }
        }
        other => {
            return Err(OpsError::Decode(format!(
                "expected a JSON object or array, got {}",
                json_type(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<R>(item) {
            Ok(record) => records.push(record.normalize()),
            Err(e) => tracing::warn!("skipping malformed {} record: {}", R::LABEL, e),
        }
    }

    Ok(records)
}

/// Unwrap a single-record response into `R`.
pub fn unwrap_item<R: Resource>(body: Value) -> OpsResult<R> {
    let Value::Object(mut map) = body else {
        return Err(OpsError::Decode(format!(
            "expected a JSON object for {}, got {}",
            R::LABEL,
            json_type(&body)
        )));
    };

    reject_unsuccessful(&map)?;

    let key = std::iter::once(R::ITEM_KEY)
        .chain(ITEM_FALLBACK_KEYS.iter().copied())
        .find(|k| matches!(map.get(*k), Some(Value::Object(_))));

    let record = match key.and_then(|k| map.remove(k)) {
        Some(record) => record,
        // Some endpoints answer with the record itself.
        None if map.contains_key("id") || map.contains_key("_id") => Value::Object(map),
        None => {
            return Err(OpsError::Decode(format!(
                "no {} found in response (looked for {}, {})",
                R::LABEL,
                R::ITEM_KEY,
                ITEM_FALLBACK_KEYS.join(", ")
            )))
        }
    };

    serde_json::from_value::<R>(record)
        .map(Resource::normalize)
        .map_err(|e| OpsError::Decode(format!("malformed {}: {e}", R::LABEL)))
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

/// Build the rejection for a non-2xx response from its raw body.
pub fn rejection(status: u16, body: &[u8]) -> OpsError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"));

    OpsError::Rejected {
        status: Some(status),
        message,
        missing_fields: parsed.missing_fields,
    }
}

fn reject_unsuccessful(map: &serde_json::Map<String, Value>) -> OpsResult<()> {
    if let Some(Value::Bool(false)) = map.get("success") {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful")
            .to_string();
        return Err(OpsError::rejected(None, message));
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
