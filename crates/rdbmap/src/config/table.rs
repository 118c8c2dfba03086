use serde::{Deserialize, Serialize};

/// A mapped column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name in the database.
    pub name: String,
    /// Name of the object property this column maps to (defaults to `name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
    /// Maintained by the execution layer as an optimistic lock token.
    #[serde(default)]
    pub managed: bool,
    /// The single column compared to detect concurrent writes.
    #[serde(default)]
    pub collision: bool,
    /// Value produced by the database on insert (identity, serial).
    #[serde(default)]
    pub generated: bool,
    /// Converter identifier applied between stored and in-memory values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The object property name, falling back to the column name.
    pub fn property(&self) -> &str {
        self.property_name.as_deref().unwrap_or(&self.name)
    }

    /// Matches either the column name or the mapped property name.
    pub fn matches_property(&self, property: &str) -> bool {
        self.name == property || self.property_name.as_deref() == Some(property)
    }
}

/// Hand-written SQL replacing a generated statement.
///
/// `parameters` lists object property names, separated by whitespace or
/// commas, bound in order to the statement's placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlOverride {
    pub sql: String,
    #[serde(default)]
    pub parameters: String,
}

impl SqlOverride {
    pub fn new(sql: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: parameters.into(),
        }
    }

    /// The parameter property names in binding order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
    }
}

/// A mapped table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table name; compared case-insensitively.
    pub name: String,
    /// Logical type name in the object graph; compared exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<SqlOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<SqlOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<SqlOverride>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The logical type name, falling back to the table name.
    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or(&self.name)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Exact match on column name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Match on column name or mapped property name.
    pub fn column_by_property_name(&self, property: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.matches_property(property))
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn primary_key_names(&self) -> Vec<&str> {
        self.primary_key_columns().map(|c| c.name.as_str()).collect()
    }

    pub fn primary_key_properties(&self) -> Vec<&str> {
        self.primary_key_columns().map(Column::property).collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    pub fn managed_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.managed)
    }

    pub fn collision_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.collision)
    }

    /// Converter id for a property, if its column declares one.
    pub fn converter(&self, property: &str) -> Option<&str> {
        self.column_by_property_name(property)
            .and_then(|c| c.converter.as_deref())
    }
}
