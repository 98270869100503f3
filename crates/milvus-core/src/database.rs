use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::MilvusError;

const MAX_NAME_LEN: usize = 255;

/// Check a database name against the server's naming rules.
///
/// Names are 1–255 characters, start with a letter or underscore, and
/// contain only ASCII letters, digits and underscores.
pub fn validate_database_name(name: &str) -> Result<(), MilvusError> {
    if name.is_empty() {
        return Err(MilvusError::Validation(
            "database name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(MilvusError::Validation(format!(
            "database name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('_');
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(MilvusError::Validation(format!(
            "database name {name:?} must start with a letter or underscore"
        )));
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(MilvusError::Validation(format!(
            "database name {name:?} contains invalid character {bad:?}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DatabaseProperties
// ---------------------------------------------------------------------------

/// Database-level properties sent on create and alter.
///
/// ```
/// use milvus_core::DatabaseProperties;
///
/// let props = DatabaseProperties::new()
///     .with_replica_number(2)
///     .with_disk_quota_mb(1024)
///     .with_max_collections(2);
/// assert_eq!(props.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseProperties(Map<String, Value>);

impl DatabaseProperties {
    pub const REPLICA_NUMBER: &'static str = "database.replica.number";
    pub const DISK_QUOTA_MB: &'static str = "database.diskQuota.mb";
    pub const MAX_COLLECTIONS: &'static str = "database.max.collections";
    pub const FORCE_DENY_WRITING: &'static str = "database.force.deny.writing";
    pub const FORCE_DENY_READING: &'static str = "database.force.deny.reading";
    pub const RESOURCE_GROUPS: &'static str = "database.resource_groups";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replica_number(self, replicas: u32) -> Self {
        self.with_property(Self::REPLICA_NUMBER, replicas)
    }

    pub fn with_disk_quota_mb(self, megabytes: u64) -> Self {
        self.with_property(Self::DISK_QUOTA_MB, megabytes)
    }

    pub fn with_max_collections(self, max: u32) -> Self {
        self.with_property(Self::MAX_COLLECTIONS, max)
    }

    pub fn with_force_deny_writing(self, deny: bool) -> Self {
        self.with_property(Self::FORCE_DENY_WRITING, deny)
    }

    pub fn with_force_deny_reading(self, deny: bool) -> Self {
        self.with_property(Self::FORCE_DENY_READING, deny)
    }

    /// Resource groups are sent as a comma separated list.
    pub fn with_resource_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = groups
            .into_iter()
            .map(|g| g.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.with_property(Self::RESOURCE_GROUPS, joined)
    }

    /// Set an arbitrary property. A later value for the same key wins.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// DatabaseDescription
// ---------------------------------------------------------------------------

/// A database as reported by the server's describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseDescription {
    pub name: String,
    pub id: Option<String>,
    /// Property values exactly as the server reports them (always strings).
    pub properties: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescription {
    db_name: String,
    #[serde(rename = "dbID", default)]
    db_id: Option<Value>,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Deserialize)]
struct RawProperty {
    key: String,
    value: Value,
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl DatabaseDescription {
    /// Parse the `data` object of a describe response.
    pub fn from_value(data: Value) -> Result<Self, MilvusError> {
        let raw: RawDescription = serde_json::from_value(data).map_err(|e| {
            MilvusError::Parsing(format!("invalid database description: {e}"))
        })?;
        Ok(Self {
            name: raw.db_name,
            id: raw.db_id.filter(|v| !v.is_null()).map(scalar_to_string),
            properties: raw
                .properties
                .into_iter()
                .map(|p| (p.key, scalar_to_string(p.value)))
                .collect(),
        })
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_rules() {
        assert!(validate_database_name("default").is_ok());
        assert!(validate_database_name("_tmp").is_ok());
        assert!(validate_database_name("my_database_1").is_ok());
        assert!(validate_database_name(&"a".repeat(255)).is_ok());

        assert!(validate_database_name("").is_err());
        assert!(validate_database_name("1db").is_err());
        assert!(validate_database_name("my-db").is_err());
        assert!(validate_database_name("my db").is_err());
        assert!(validate_database_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn properties_serialize_as_object() {
        let props = DatabaseProperties::new()
            .with_replica_number(2)
            .with_disk_quota_mb(1024)
            .with_max_collections(2)
            .with_force_deny_writing(false);
        assert_eq!(
            serde_json::to_value(&props).unwrap(),
            json!({
                "database.replica.number": 2,
                "database.diskQuota.mb": 1024,
                "database.max.collections": 2,
                "database.force.deny.writing": false,
            })
        );
        assert_eq!(props.to_value(), serde_json::to_value(&props).unwrap());
    }

    #[test]
    fn later_value_wins() {
        let props = DatabaseProperties::new()
            .with_max_collections(2)
            .with_max_collections(10);
        assert_eq!(props.len(), 1);
        assert_eq!(props.get(DatabaseProperties::MAX_COLLECTIONS), Some(&json!(10)));
    }

    #[test]
    fn resource_groups_are_joined() {
        let props = DatabaseProperties::new().with_resource_groups(["rg1", "rg2"]);
        assert_eq!(
            props.get(DatabaseProperties::RESOURCE_GROUPS),
            Some(&json!("rg1,rg2"))
        );
    }

    #[test]
    fn description_parses_key_value_list() {
        let desc = DatabaseDescription::from_value(json!({
            "dbName": "my_database_1",
            "dbID": 455918384640262105_i64,
            "properties": [
                {"key": "database.replica.number", "value": "2"},
                {"key": "database.max.collections", "value": "10"}
            ]
        }))
        .unwrap();
        assert_eq!(desc.name, "my_database_1");
        assert_eq!(desc.id.as_deref(), Some("455918384640262105"));
        assert_eq!(desc.property("database.max.collections"), Some("10"));
        assert_eq!(desc.property("database.diskQuota.mb"), None);
    }

    #[test]
    fn description_without_properties() {
        let desc = DatabaseDescription::from_value(json!({"dbName": "default"})).unwrap();
        assert_eq!(desc.name, "default");
        assert!(desc.id.is_none());
        assert!(desc.properties.is_empty());
    }

    #[test]
    fn description_rejects_missing_name() {
        let err = DatabaseDescription::from_value(json!({"properties": []})).unwrap_err();
        assert!(matches!(err, MilvusError::Parsing(_)));
    }
}
