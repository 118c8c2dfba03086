use serde::{Deserialize, Serialize};

/// One (parent key column, child foreign key column) correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub primary_key_column: String,
    pub foreign_key_column: String,
}

impl KeyPair {
    pub fn new(primary_key_column: impl Into<String>, foreign_key_column: impl Into<String>) -> Self {
        Self {
            primary_key_column: primary_key_column.into(),
            foreign_key_column: foreign_key_column.into(),
        }
    }
}

/// A directed edge from a parent table (holding the key) to a child table
/// (holding the foreign key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Name of the navigation property on the parent side.
    pub name: String,
    /// Name of the navigation property on the child side, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_name: Option<String>,
    pub parent_table: String,
    pub child_table: String,
    #[serde(default = "default_many")]
    pub many: bool,
    #[serde(default)]
    pub key_pairs: Vec<KeyPair>,
}

fn default_many() -> bool {
    true
}

impl Relationship {
    /// A one-to-many relationship with a single key pair.
    pub fn one_to_many(
        name: impl Into<String>,
        parent_table: impl Into<String>,
        child_table: impl Into<String>,
        key_pair: KeyPair,
    ) -> Self {
        Self {
            name: name.into(),
            opposite_name: None,
            parent_table: parent_table.into(),
            child_table: child_table.into(),
            many: true,
            key_pairs: vec![key_pair],
        }
    }

    /// Foreign key column names on the child side, in key pair order.
    pub fn foreign_keys(&self) -> Vec<&str> {
        self.key_pairs
            .iter()
            .map(|k| k.foreign_key_column.as_str())
            .collect()
    }

    /// Primary key column names on the parent side, in key pair order.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.key_pairs
            .iter()
            .map(|k| k.primary_key_column.as_str())
            .collect()
    }

    pub fn is_self_referencing(&self) -> bool {
        self.parent_table.eq_ignore_ascii_case(&self.child_table)
    }

    pub fn connects(&self, parent: &str, child: &str) -> bool {
        self.parent_table.eq_ignore_ascii_case(parent) && self.child_table.eq_ignore_ascii_case(child)
    }
}
