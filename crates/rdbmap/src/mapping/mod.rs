//! Schema registry and builder over a [`Config`].
//!
//! [`Mapping`] owns one mapping document for a data-access session. It is
//! populated once (programmatically, by naming-convention inference, or by
//! loading a document) and then read by the orderer and the generators.
//!
//! Table names are looked up case-insensitively, logical type names exactly;
//! the two lookups use separate indices.
//!
//! # Example
//!
//! ```ignore
//! use rdbmap::Mapping;
//!
//! let mut mapping = Mapping::new();
//! mapping.add_primary_key(["CUSTOMER.ID", "ANORDER.ID"])?;
//! mapping.add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", Some("orders"))?;
//! mapping.add_collision_column("CUSTOMER.VERSION")?;
//!
//! assert_eq!(mapping.insert_order()?, vec!["CUSTOMER", "ANORDER"]);
//! # Ok::<(), rdbmap::OrmError>(())
//! ```

mod qualified;
mod resolve;

#[cfg(test)]
mod tests;

pub use qualified::QualifiedColumn;

use crate::config::{
    Column, Command, CommandKind, Config, ConnectionInfo, ConnectionProperties, KeyPair,
    Relationship, SqlOverride, Table,
};
use crate::error::{OrmError, OrmResult};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Primary key column assumed on the parent side of an implied relationship.
pub const IMPLIED_PRIMARY_KEY: &str = "ID";

/// Schema registry and builder.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    config: Config,
    /// Lower-cased table name -> position in `config.tables`.
    by_name: HashMap<String, usize>,
    /// Exact logical type name -> position in `config.tables`.
    by_type: HashMap<String, usize>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing mapping document.
    ///
    /// When the document repeats a table name or type name, the first
    /// occurrence wins; [`Mapping::validate`] reports the duplicates.
    pub fn from_config(config: Config) -> Self {
        let mut mapping = Self {
            config,
            by_name: HashMap::new(),
            by_type: HashMap::new(),
        };
        mapping.reindex();
        mapping
    }

    /// Parse a JSON mapping document.
    pub fn from_json_str(json: &str) -> OrmResult<Self> {
        Ok(Self::from_config(Config::from_json_str(json)?))
    }

    /// Load a JSON mapping document from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Serialization(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&data)
    }

    fn reindex(&mut self) {
        self.by_name.clear();
        self.by_type.clear();
        for idx in 0..self.config.tables.len() {
            self.index_table(idx);
        }
    }

    fn index_table(&mut self, idx: usize) {
        let table = &self.config.tables[idx];
        self.by_name
            .entry(table.name.to_ascii_lowercase())
            .or_insert(idx);
        // Only declared type names; untyped tables are found by name.
        if let Some(type_name) = &table.type_name {
            self.by_type.entry(type_name.clone()).or_insert(idx);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn tables(&self) -> &[Table] {
        &self.config.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.config.relationships
    }

    pub fn commands(&self) -> &[Command] {
        &self.config.commands
    }

    pub fn connection_info(&self) -> Option<&ConnectionInfo> {
        self.config.connection_info.as_ref()
    }

    // ==================== Tables ====================

    /// Case-insensitive lookup by table name.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        tracing::trace!(table = name, "Looking for table");
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&idx| &self.config.tables[idx])
    }

    /// Exact lookup by logical type name.
    pub fn find_table_by_type(&self, type_name: &str) -> Option<&Table> {
        tracing::trace!(type_name, "Looking for table by type");
        self.by_type
            .get(type_name)
            .map(|&idx| &self.config.tables[idx])
    }

    fn table_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Register a new table.
    pub fn add_table(&mut self, name: &str, type_name: Option<&str>) -> OrmResult<&Table> {
        if self.find_table(name).is_some() {
            return Err(OrmError::DuplicateEntity(format!(
                "Table {name} already exists"
            )));
        }

        let mut table = Table::new(name);
        table.type_name = type_name.map(str::to_string);
        Ok(&*self.push_table(table))
    }

    /// Change the logical type name of an existing table.
    pub fn set_table_type_name(&mut self, table: &str, type_name: Option<&str>) -> OrmResult<()> {
        let Some(idx) = self.table_index(table) else {
            return Err(OrmError::not_found(format!("Table {table} is not registered")));
        };
        self.config.tables[idx].type_name = type_name.map(str::to_string);
        self.reindex();
        Ok(())
    }

    fn push_table(&mut self, table: Table) -> &mut Table {
        self.config.tables.push(table);
        let idx = self.config.tables.len() - 1;
        self.index_table(idx);
        &mut self.config.tables[idx]
    }

    /// Find a table by name, creating an unmapped one when absent.
    pub fn find_or_create_table(&mut self, name: &str) -> &Table {
        self.table_entry(name)
    }

    /// Mutable table for the builder methods. Name and type name must not
    /// change through it; the indices are keyed on them.
    fn table_entry(&mut self, name: &str) -> &mut Table {
        match self.table_index(name) {
            Some(idx) => &mut self.config.tables[idx],
            None => {
                tracing::debug!(table = name, "Creating table entry");
                self.push_table(Table::new(name))
            }
        }
    }

    /// Find a column by exact name, creating it (and its table) when absent.
    pub fn find_or_create_column(&mut self, table: &str, name: &str) -> &mut Column {
        let table = self.table_entry(table);
        match table.columns.iter().position(|c| c.name == name) {
            Some(idx) => &mut table.columns[idx],
            None => {
                table.columns.push(Column::new(name));
                let last = table.columns.len() - 1;
                &mut table.columns[last]
            }
        }
    }

    /// Append a column with an explicit property name.
    pub fn add_column(&mut self, table: &str, name: &str, property_name: Option<&str>) -> &mut Column {
        let table = self.table_entry(table);
        table.columns.push(Column {
            property_name: property_name.map(str::to_string),
            ..Column::new(name)
        });
        let last = table.columns.len() - 1;
        &mut table.columns[last]
    }

    /// Mutable access to an existing column (exact name).
    pub fn column_mut(&mut self, table: &str, column: &str) -> Option<&mut Column> {
        let idx = self.table_index(table)?;
        self.config.tables[idx].column_mut(column)
    }

    /// The logical type name of a table, or the table name itself when the
    /// table is unknown or has no type name.
    pub fn table_type_name<'a>(&'a self, table: &'a str) -> &'a str {
        match self.find_table(table) {
            Some(t) => t.type_name(),
            None => table,
        }
    }

    // ==================== Columns ====================

    /// Exact lookup of a column within a table.
    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        let found = self.find_table(table).and_then(|t| t.column(column));
        if found.is_none() {
            tracing::debug!(table, column, "Could not find column");
        }
        found
    }

    /// Lookup of a column by column name or property name.
    pub fn column_by_property_name(&self, table: &str, property: &str) -> Option<&Column> {
        let found = self
            .find_table(table)
            .and_then(|t| t.column_by_property_name(property));
        if found.is_none() {
            tracing::debug!(table, property, "Could not find column for property");
        }
        found
    }

    /// Property name for a column: the mapped property name, else the column
    /// name. Unknown columns map to themselves.
    pub fn column_property_name<'a>(&'a self, table: &str, column: &'a str) -> &'a str {
        match self.column(table, column) {
            Some(c) => c.property(),
            None => column,
        }
    }

    // ==================== Keys ====================

    /// Mark each `Table.Column` as a primary key column, creating table and
    /// column entries as needed.
    pub fn add_primary_key<I, S>(&mut self, columns: I) -> OrmResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in columns {
            let q = QualifiedColumn::parse(name.as_ref())?;
            self.find_or_create_column(q.table, q.column).primary_key = true;
        }
        Ok(())
    }

    /// Set `column` as the primary key only if the table has none yet.
    pub fn add_implied_primary_key(&mut self, table: &str, column: &str) {
        if self.table_entry(table).has_primary_key() {
            return;
        }
        tracing::debug!(table, column, "Implying primary key");
        self.find_or_create_column(table, column).primary_key = true;
    }

    // ==================== Column flags ====================

    /// Flag `Table.Column` as the managed (optimistic lock) column.
    pub fn add_managed_column(&mut self, qualified: &str) -> OrmResult<()> {
        let q = QualifiedColumn::parse(qualified)?;
        let table = self.table_entry(q.table);
        if let Some(existing) = table.managed_column()
            && existing.name != q.column
        {
            return Err(OrmError::validation(format!(
                "Table {} already has managed column {}",
                table.name, existing.name
            )));
        }
        self.find_or_create_column(q.table, q.column).managed = true;
        Ok(())
    }

    /// Flag `Table.Column` as the collision column.
    pub fn add_collision_column(&mut self, qualified: &str) -> OrmResult<()> {
        let q = QualifiedColumn::parse(qualified)?;
        self.find_or_create_column(q.table, q.column).collision = true;
        Ok(())
    }

    /// Flag `Table.Column` as database generated.
    pub fn add_generated_column(&mut self, qualified: &str) -> OrmResult<()> {
        let q = QualifiedColumn::parse(qualified)?;
        self.find_or_create_column(q.table, q.column).generated = true;
        Ok(())
    }

    // ==================== Converters ====================

    /// Attach a converter identifier to `Table.Column`.
    pub fn add_converter(&mut self, qualified: &str, converter: &str) -> OrmResult<()> {
        let q = QualifiedColumn::parse(qualified)?;
        self.find_or_create_column(q.table, q.column).converter = Some(converter.to_string());
        Ok(())
    }

    pub fn converter(&self, table: &str, column: &str) -> Option<&str> {
        self.column(table, column)
            .and_then(|c| c.converter.as_deref())
    }

    /// Property name -> converter id for every column of `table` that
    /// declares a converter.
    pub fn converters(&self, table: &str) -> BTreeMap<String, String> {
        let Some(table) = self.find_table(table) else {
            return BTreeMap::new();
        };
        table
            .columns
            .iter()
            .filter_map(|c| {
                c.converter
                    .as_ref()
                    .map(|conv| (c.property().to_string(), conv.clone()))
            })
            .collect()
    }

    // ==================== Relationships ====================

    /// Register a relationship inferred from a `<Parent>_ID`-style column.
    ///
    /// Returns `false` without changing anything when `parent == child` or a
    /// relationship between the two tables already exists.
    pub fn add_implied_relationship(&mut self, parent: &str, child: &str, fk_column: &str) -> bool {
        // A Book_ID column on BOOK is not a relationship.
        if parent.eq_ignore_ascii_case(child) {
            return false;
        }

        if self
            .config
            .relationships
            .iter()
            .any(|r| r.connects(parent, child))
        {
            return false;
        }

        tracing::debug!(parent, child, fk_column, "Implying relationship");
        self.config.relationships.push(Relationship::one_to_many(
            child,
            parent,
            child,
            KeyPair::new(IMPLIED_PRIMARY_KEY, fk_column),
        ));
        true
    }

    /// Register an explicit one-to-many relationship between two
    /// `Table.Column` ends. The name defaults to the child table name.
    pub fn add_relationship(
        &mut self,
        parent: &str,
        child: &str,
        name: Option<&str>,
    ) -> OrmResult<&mut Relationship> {
        let parent = QualifiedColumn::parse(parent)?;
        let child = QualifiedColumn::parse(child)?;

        let relationship = Relationship::one_to_many(
            name.unwrap_or(child.table),
            parent.table,
            child.table,
            KeyPair::new(parent.column, child.column),
        );
        tracing::debug!(
            parent = %relationship.parent_table,
            child = %relationship.child_table,
            name = %relationship.name,
            "Created relationship"
        );

        self.config.relationships.push(relationship);
        let last = self.config.relationships.len() - 1;
        Ok(&mut self.config.relationships[last])
    }

    // ==================== Hand-written SQL ====================

    pub fn add_create_statement(&mut self, table: &str, sql: &str, parameters: &str) {
        self.table_entry(table).create = Some(SqlOverride::new(sql, parameters));
    }

    pub fn add_update_statement(&mut self, table: &str, sql: &str, parameters: &str) {
        self.table_entry(table).update = Some(SqlOverride::new(sql, parameters));
    }

    pub fn add_delete_statement(&mut self, table: &str, sql: &str, parameters: &str) {
        self.table_entry(table).delete = Some(SqlOverride::new(sql, parameters));
    }

    // ==================== Commands & connection ====================

    pub fn add_command(&mut self, name: &str, sql: &str, kind: CommandKind) -> &Command {
        self.config.commands.push(Command {
            name: name.to_string(),
            kind,
            sql: sql.to_string(),
        });
        &self.config.commands[self.config.commands.len() - 1]
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.config.commands.iter().find(|c| c.name == name)
    }

    /// Use an externally managed data source.
    pub fn add_connection_info_data_source(&mut self, data_source: &str, managed_tx: bool) {
        self.config.connection_info = Some(ConnectionInfo {
            data_source: Some(data_source.to_string()),
            managed_tx,
            connection_properties: None,
        });
    }

    /// Connect directly with a database URL and credentials.
    pub fn add_connection_info(
        &mut self,
        database_url: &str,
        user_name: Option<&str>,
        password: Option<&str>,
        login_timeout: u64,
    ) {
        self.config.connection_info = Some(ConnectionInfo {
            data_source: None,
            managed_tx: false,
            connection_properties: Some(ConnectionProperties {
                database_url: database_url.to_string(),
                user_name: user_name.map(str::to_string),
                password: password.map(str::to_string),
                login_timeout,
            }),
        });
    }

    // ==================== Validation ====================

    /// Check invariants that a loaded document may violate.
    pub fn validate(&self) -> OrmResult<()> {
        let mut problems = Vec::new();

        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut types: HashMap<&str, &str> = HashMap::new();
        for table in &self.config.tables {
            if let Some(first) = seen.insert(table.name.to_ascii_lowercase(), &table.name) {
                problems.push(format!("table {} duplicates {first}", table.name));
            }
            if let Some(type_name) = &table.type_name
                && let Some(first) = types.insert(type_name, &table.name)
            {
                problems.push(format!(
                    "type {type_name} is mapped by both {first} and {}",
                    table.name
                ));
            }

            let managed: Vec<&str> = table
                .columns
                .iter()
                .filter(|c| c.managed)
                .map(|c| c.name.as_str())
                .collect();
            if managed.len() > 1 {
                problems.push(format!(
                    "table {} has more than one managed column: {}",
                    table.name,
                    managed.join(", ")
                ));
            }
        }

        for r in &self.config.relationships {
            if r.key_pairs.is_empty() {
                problems.push(format!("relationship {} has no key pairs", r.name));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(OrmError::Validation(problems.join("; ")))
        }
    }
}

impl From<Config> for Mapping {
    fn from(config: Config) -> Self {
        Self::from_config(config)
    }
}
