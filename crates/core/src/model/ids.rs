use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest identifier accepted for items and phases, in bytes.
pub const MAX_ID_LEN: usize = 64;

/// Identifier of a trackable roadmap item (e.g. `soc-networking`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new `ItemId` after validating its shape.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the value is empty, too long, or contains
    /// characters other than lowercase ASCII letters, digits and `-`.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let id = id.into();
        validate(&id, "ItemId")?;
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a roadmap phase (e.g. `soc`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhaseId(String);

impl PhaseId {
    /// Creates a new `PhaseId` after validating its shape.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` under the same rules as [`ItemId::new`].
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let id = id.into();
        validate(&id, "PhaseId")?;
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(raw: &str, kind: &'static str) -> Result<(), ParseIdError> {
    let well_formed = !raw.is_empty()
        && raw.len() <= MAX_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if well_formed {
        Ok(())
    } else {
        Err(ParseIdError {
            kind,
            raw: raw.to_owned(),
        })
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Debug for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhaseId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

/// Error type for parsing an identifier from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl ParseIdError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for ItemId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemId::new(s)
    }
}

impl FromStr for PhaseId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseId::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ItemId::new(value)
    }
}

impl TryFrom<String> for PhaseId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PhaseId::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl From<PhaseId> for String {
    fn from(id: PhaseId) -> Self {
        id.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
