use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::catalog::Catalog;
use crate::model::ids::ItemId;

/// Envelope version written by [`ProgressMap::to_versioned_json`].
pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressDecodeError {
    #[error("invalid JSON: {0}")]
    Syntax(String),

    #[error("progress must be a JSON object")]
    NotAnObject,

    #[error("value for {key:?} must be a boolean")]
    InvalidValue { key: String },

    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(String),

    #[error("unexpected key {0:?} next to envelope items")]
    UnexpectedEnvelopeKey(String),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Coercion {
    Strict,
    Lenient,
}

/// Completion flags keyed by item identifier.
///
/// Keys outside the catalog are kept as-is so that a snapshot taken against a
/// newer catalog survives a round-trip through an older one. Only catalog
/// members ever contribute to statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProgressMap {
    entries: BTreeMap<String, bool>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    items: &'a BTreeMap<String, bool>,
}

impl ProgressMap {
    /// A map with every catalog item present and not completed.
    #[must_use]
    pub fn empty_for(catalog: &Catalog) -> Self {
        Self {
            entries: catalog
                .item_ids()
                .map(|id| (id.as_str().to_owned(), false))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_completed(&self, id: &str) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Sets the flag for a single item, returning the previous value.
    pub fn set(&mut self, id: &ItemId, completed: bool) -> Option<bool> {
        self.entries.insert(id.as_str().to_owned(), completed)
    }

    /// All entries in key order, unknown keys included.
    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that are not members of the given catalog.
    #[must_use]
    pub fn unknown_keys<'a>(&'a self, catalog: &Catalog) -> Vec<&'a str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|key| !catalog.contains(key))
            .collect()
    }

    /// Serializes as a flat JSON object of `id -> bool`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; a map of strings to booleans does not
    /// fail in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Serializes as `{"version":1,"items":{...}}`.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressMap::to_json`].
    pub fn to_versioned_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope {
            version: SNAPSHOT_VERSION,
            items: &self.entries,
        })
    }

    /// Parses either a flat object or a versioned envelope.
    ///
    /// Values are coerced by truthiness: `false`, `null`, `0` and `""` are not
    /// completed, other scalars are. Nested arrays or objects are rejected.
    ///
    /// # Errors
    ///
    /// Returns `ProgressDecodeError` when the text is not a JSON object of
    /// scalar values or names an unknown envelope version.
    pub fn from_json(raw: &str) -> Result<Self, ProgressDecodeError> {
        Self::decode(raw, Coercion::Strict)
    }

    /// Parses previously persisted progress.
    ///
    /// Same as [`ProgressMap::from_json`] except that array and object values
    /// count as completed instead of failing, so one odd entry does not cost
    /// the rest of the stored map.
    ///
    /// # Errors
    ///
    /// Returns `ProgressDecodeError` when the text is not a JSON object or
    /// names an unknown envelope version.
    pub fn from_stored(raw: &str) -> Result<Self, ProgressDecodeError> {
        Self::decode(raw, Coercion::Lenient)
    }

    fn decode(raw: &str, coercion: Coercion) -> Result<Self, ProgressDecodeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| ProgressDecodeError::Syntax(err.to_string()))?;
        let Value::Object(top) = value else {
            return Err(ProgressDecodeError::NotAnObject);
        };

        let items = unwrap_envelope(top)?;

        let mut entries = BTreeMap::new();
        for (key, value) in items {
            let completed = match truthy(&value) {
                Some(completed) => Some(completed),
                None if coercion == Coercion::Lenient => Some(true),
                None => None,
            };
            let completed = completed.ok_or_else(|| ProgressDecodeError::InvalidValue {
                key: key.clone(),
            })?;
            entries.insert(key, completed);
        }
        Ok(Self { entries })
    }
}

// A flat map never has an object value, so an `items` object marks an envelope.
fn unwrap_envelope(mut top: Map<String, Value>) -> Result<Map<String, Value>, ProgressDecodeError> {
    if !matches!(top.get("items"), Some(Value::Object(_))) {
        return Ok(top);
    }

    match top.get("version") {
        Some(Value::Number(n)) if n.as_u64() == Some(SNAPSHOT_VERSION) => {}
        Some(other) => return Err(ProgressDecodeError::UnsupportedVersion(other.to_string())),
        None => return Err(ProgressDecodeError::UnsupportedVersion("missing".into())),
    }

    if let Some(extra) = top.keys().find(|key| !matches!(key.as_str(), "version" | "items")) {
        return Err(ProgressDecodeError::UnexpectedEnvelopeKey(extra.clone()));
    }

    match top.remove("items") {
        Some(Value::Object(items)) => Ok(items),
        _ => Err(ProgressDecodeError::NotAnObject),
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl FromIterator<(ItemId, bool)> for ProgressMap {
    fn from_iter<I: IntoIterator<Item = (ItemId, bool)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(id, completed)| (String::from(id), completed))
                .collect(),
        }
    }
}
