//! Presence-aware field wrapper for partial updates.
//!
//! A PATCH body must distinguish a key that was omitted from a key that was
//! explicitly set to `null`: `{}` touches nothing, `{"make": null}` clears
//! the column, `{"make": "BMW"}` sets it. `Option<T>` alone cannot represent
//! all three, so update request fields use this tagged variant instead.

use serde::{Deserialize, Deserializer};

/// A request field annotated with whether it was actually supplied.
///
/// Deserialization rule (with `#[serde(default)]` on the field):
/// key absent → `Absent`, key present as `null` → `Null`, key present with
/// a value → `Value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not in the request body.
    #[default]
    Absent,
    /// The key was present with an explicit `null`.
    Null,
    /// The key was present with a concrete value.
    Value(T),
}

impl<T> Patch<T> {
    /// True when the field was supplied, whether as `null` or a value.
    pub fn is_present(&self) -> bool {
        !matches!(self, Patch::Absent)
    }

    /// True when the field was omitted.
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Collapse to the column value to assign: `None` writes SQL NULL.
    ///
    /// Only meaningful for present fields; `Absent` also yields `None` but
    /// callers must check [`is_present`](Self::is_present) first and skip
    /// absent fields entirely.
    pub fn into_column_value(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Null | Patch::Absent => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key exists; serde's field default covers
        // the absent case.
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => Patch::Null,
            Some(value) => Patch::Value(value),
        })
    }
}
