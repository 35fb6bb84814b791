//! Principal, profile and country records.
//!
//! DESIGN
//! ======
//! Rows arrive from PostgREST as JSON. Identifier columns may be text or
//! integer depending on the schema, so ids are normalized to `String` on the
//! way in. Missing optional columns default instead of failing the row.

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

// =============================================================================
// PRINCIPAL
// =============================================================================

/// Authenticated identity issued by the auth provider. Read only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Principal {
    #[must_use]
    pub fn new(id: impl Into<String>, email: Option<&str>) -> Self {
        Self { id: id.into(), email: email.map(str::to_owned) }
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Normalized application-level user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub country_id: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de_number_or_null")]
    pub merit_points: f64,
    #[serde(default, deserialize_with = "de_bool_or_null")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "de_bool_or_null")]
    pub initialized: bool,
}

impl Profile {
    /// Merge a profile store row with the principal's email and the resolved
    /// country name.
    #[must_use]
    pub fn assemble(row: ProfileRow, email: Option<String>, country_name: Option<String>) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name,
            country_id: row.country_id,
            country_name,
            email,
            merit_points: row.merit_points,
            is_admin: row.is_admin,
            initialized: row.initialized,
        }
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_or_null")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub country_id: Option<String>,
    #[serde(default, deserialize_with = "de_number_or_null")]
    pub merit_points: f64,
    #[serde(default, deserialize_with = "de_bool_or_null")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "de_bool_or_null")]
    pub initialized: bool,
}

/// A row of the `countries` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    pub name: String,
}

// =============================================================================
// DESERIALIZE HELPERS
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

fn de_string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_number_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_bool_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}
