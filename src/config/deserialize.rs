// ABOUTME: Custom serde adapters for preference fields.
// ABOUTME: Blank strings mean "no preference"; unknown names are rejected.

use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;

/// Read an optional choice. Missing, null, and blank values all mean "unset".
pub fn deserialize_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Write an optional choice, using an empty string for "unset".
pub fn serialize_choice<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    match value {
        Some(choice) => serializer.collect_str(choice),
        None => serializer.serialize_str(""),
    }
}
