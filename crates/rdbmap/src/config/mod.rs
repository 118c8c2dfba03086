//! The mapping document: tables, columns, relationships, named commands and
//! connection settings.
//!
//! This is plain data. Queries and mutations go through
//! [`Mapping`](crate::Mapping), which keeps the lookup indices in sync.
//!
//! # Example
//!
//! ```ignore
//! let config = rdbmap::Config::from_json_str(r#"{
//!     "tables": [{ "name": "CUSTOMER", "typeName": "Customer",
//!                  "columns": [{ "name": "ID", "primaryKey": true }] }],
//!     "relationships": [{ "name": "orders", "parentTable": "CUSTOMER",
//!                         "childTable": "ANORDER",
//!                         "keyPairs": [{ "primaryKeyColumn": "ID",
//!                                        "foreignKeyColumn": "CUSTOMER_ID" }] }]
//! }"#)?;
//! ```

mod command;
mod relationship;
mod table;

pub use command::{Command, CommandKind, ConnectionInfo, ConnectionProperties};
pub use relationship::{KeyPair, Relationship};
pub use table::{Column, SqlOverride, Table};

use crate::error::OrmResult;
use serde::{Deserialize, Serialize};

/// Root of the mapping document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ConnectionInfo>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mapping document from JSON.
    pub fn from_json_str(json: &str) -> OrmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the mapping document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> OrmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_document_with_defaults() {
        let config = Config::from_json_str(
            r#"{
                "tables": [{
                    "name": "CUSTOMER",
                    "typeName": "Customer",
                    "columns": [
                        { "name": "ID", "primaryKey": true },
                        { "name": "LASTNAME", "propertyName": "lastName", "converter": "upper" }
                    ],
                    "update": { "sql": "update CUSTOMER set LASTNAME = ? where ID = ?", "parameters": "lastName ID" }
                }],
                "relationships": [{
                    "name": "orders",
                    "parentTable": "CUSTOMER",
                    "childTable": "ANORDER",
                    "keyPairs": [{ "primaryKeyColumn": "ID", "foreignKeyColumn": "CUSTOMER_ID" }]
                }],
                "commands": [{ "name": "all customers", "kind": "select", "sql": "select * from CUSTOMER" }],
                "connectionInfo": { "dataSource": "jdbc/customers" }
            }"#,
        )
        .unwrap();

        let customer = &config.tables[0];
        assert_eq!(customer.type_name(), "Customer");
        assert!(customer.columns[0].primary_key);
        assert_eq!(customer.columns[1].property(), "lastName");
        assert!(customer.update.is_some());

        let orders = &config.relationships[0];
        assert!(orders.many);
        assert_eq!(orders.foreign_keys(), vec!["CUSTOMER_ID"]);

        assert_eq!(config.commands[0].kind, CommandKind::Select);
        let info = config.connection_info.as_ref().unwrap();
        assert!(info.managed_tx);
        assert!(info.connection_properties.is_none());
    }

    #[test]
    fn serializes_back_to_json() {
        let mut config = Config::new();
        config.tables.push(Table::new("BOOK"));
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"BOOK\""));
        assert_eq!(Config::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = Config::from_json_str("{ tables: ").unwrap_err();
        assert!(matches!(err, crate::OrmError::Serialization(_)));
    }
}
