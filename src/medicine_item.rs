//! Medicine record model: schema, construction, validation, and
//! defensive parsing of persisted JSON.
//!
//! The persisted unit is [`MedicineItem`], stored on the wire as a JSON
//! array of camelCase objects:
//!
//! ```json
//! {
//!   "id": "lx3k2a-9f4b1c8d2",
//!   "name": "Aspirin",
//!   "dosage": "100 mg",
//!   "expiryDate": "2026-03-01",
//!   "createdAt": "2025-09-01T10:30:00.000Z",
//!   "updatedAt": "2025-09-01T10:30:00.000Z"
//! }
//! ```
//!
//! The underlying storage gives no schema guarantees, so every record
//! coming back from it is gated through [`is_valid_medicine_item`]
//! before it is trusted. The recovery policy is fail-open: corrupt
//! collection text degrades to an empty collection and individual
//! invalid records are dropped, never surfaced as errors.

use chrono::{SecondsFormat, Utc};
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One persisted inventory entry.
///
/// `created_at` is immutable after creation. `updated_at` is refreshed
/// on every successful update and never moves backwards. Both are
/// RFC 3339 timestamps with millisecond precision, stamped by this
/// module rather than supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineItem {
    /// Opaque, non-empty identifier, unique within the collection.
    pub id: String,
    /// Display name, trimmed and non-empty.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    /// Expiry as an ISO date prefix (`YYYY-MM-DD`), optionally with a
    /// time suffix. Calendar validity is not enforced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a new record. An explicit `id` is honored as-is;
/// leave it `None` to have one generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineItemInput {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Partial update payload. A present field overrides the stored value,
/// including when it is an empty string; an absent field leaves the
/// record unchanged. A present `id` is always ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicineItemPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub expiry_date: Option<String>,
    pub notes: Option<String>,
}

/// Builds a new record from `input`: trims all string fields, stamps
/// `created_at = updated_at = now`, and assigns the id from the input
/// or generates a fresh one.
///
/// Never fails on well-typed input. Cross-record id uniqueness is the
/// store's responsibility, not this function's.
pub fn create_medicine_item(input: MedicineItemInput) -> MedicineItem {
    let now = now_timestamp();
    MedicineItem {
        id: input.id.unwrap_or_else(generate_id),
        name: input.name.trim().to_string(),
        dosage: input.dosage.map(|value| value.trim().to_string()),
        expiry_date: input.expiry_date.map(|value| value.trim().to_string()),
        notes: input.notes.map(|value| value.trim().to_string()),
        created_at: now.clone(),
        updated_at: now,
    }
}

/// Returns a new record with the present patch fields applied and
/// `updated_at` refreshed. `id` and `created_at` are taken from
/// `existing` unconditionally; a patch id cannot hijack the identity.
pub fn update_medicine_item(existing: &MedicineItem, patch: &MedicineItemPatch) -> MedicineItem {
    MedicineItem {
        id: existing.id.clone(),
        name: patch
            .name
            .as_deref()
            .unwrap_or(&existing.name)
            .trim()
            .to_string(),
        dosage: apply_field(&patch.dosage, &existing.dosage),
        expiry_date: apply_field(&patch.expiry_date, &existing.expiry_date),
        notes: apply_field(&patch.notes, &existing.notes),
        created_at: existing.created_at.clone(),
        updated_at: now_timestamp(),
    }
}

/// Structural predicate over untrusted deserialized data. This is the
/// sole gate before a persisted value is trusted as a [`MedicineItem`].
pub fn is_valid_medicine_item(value: &Value) -> bool {
    // `as_object` is None for null, arrays, and scalars.
    let Some(object) = value.as_object() else {
        return false;
    };

    let non_empty_string = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|text| !text.is_empty())
    };
    let optional_string = |key: &str| match object.get(key) {
        None => true,
        Some(field) => field.is_string(),
    };
    let expiry_ok = match object.get("expiryDate") {
        None => true,
        Some(field) => field.as_str().is_some_and(has_iso_date_prefix),
    };

    non_empty_string("id")
        && non_empty_string("name")
        && optional_string("dosage")
        && expiry_ok
        && optional_string("notes")
        && object.get("createdAt").is_some_and(Value::is_string)
        && object.get("updatedAt").is_some_and(Value::is_string)
}

/// Parses persisted collection text into the best-effort valid subset.
///
/// Unparsable text or a non-array top level yields an empty collection;
/// elements failing [`is_valid_medicine_item`] are dropped. Element
/// order is preserved. This function never fails.
pub fn parse_medicine_items_json(json: &str) -> Vec<MedicineItem> {
    parse_medicine_items_counted(json).0
}

/// Like [`parse_medicine_items_json`] but also reports how many
/// elements were dropped, for the store's observability counter.
pub(crate) fn parse_medicine_items_counted(json: &str) -> (Vec<MedicineItem>, usize) {
    let parsed: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(error) => {
            warn!("Medicine collection text is not valid JSON, recovering as empty: {error}");
            return (Vec::new(), 0);
        }
    };
    let Value::Array(elements) = parsed else {
        warn!("Medicine collection is not a JSON array, recovering as empty");
        return (Vec::new(), 0);
    };

    let mut items = Vec::with_capacity(elements.len());
    let mut dropped = 0usize;
    for element in elements {
        if !is_valid_medicine_item(&element) {
            dropped += 1;
            continue;
        }
        match serde_json::from_value::<MedicineItem>(element) {
            Ok(item) => items.push(item),
            Err(_) => dropped += 1,
        }
    }
    (items, dropped)
}

/// Lenient ISO date prefix check: `YYYY-MM-DD` at the start of the
/// string. Calendar validity is deliberately not verified.
fn has_iso_date_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

fn apply_field(patch: &Option<String>, existing: &Option<String>) -> Option<String> {
    match patch {
        Some(value) => Some(value.trim().to_string()),
        None => existing.clone(),
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generates an identifier from a base-36 millisecond timestamp plus a
/// random base-36 suffix, to minimize same-millisecond collisions.
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}-{}", to_base36(millis), random_base36(9))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    // u64::MAX needs 13 base-36 digits.
    let mut buffer = [0u8; 13];
    let mut position = buffer.len();
    while value > 0 {
        position -= 1;
        buffer[position] = DIGITS[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&buffer[position..]).into_owned()
}

fn random_base36(length: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
        .collect()
}
