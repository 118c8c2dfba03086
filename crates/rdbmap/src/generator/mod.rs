//! Write command generation.
//!
//! Each generator turns one object (and its change log) into a single
//! [`WriteCommand`]: SQL with `?` placeholders plus typed, positional
//! parameters. Nothing here touches a database.
//!
//! | Generator | Statement |
//! |-----------|-----------|
//! | [`update_command`] | `update T set ... where <keys> and <optimistic predicate>` |
//! | [`insert_command`] | `insert into T (...) values (...)` |
//! | [`delete_command`] | `delete from T where <keys>` |
//!
//! Hand-written `create`/`update`/`delete` SQL on a table replaces the
//! generated statement.

mod delete;
mod insert;
mod update;

pub use delete::delete_command;
pub use insert::insert_command;
pub use update::update_command;

use crate::change::{ChangeEntry, DataObject};
use crate::config::{Column, CommandKind, SqlOverride, Table};
use crate::error::{OrmError, OrmResult};
use crate::mapping::{IMPLIED_PRIMARY_KEY, Mapping};
use crate::sql::{Parameter, ParameterKind, Statement};
use crate::value::{SqlType, Value};
use serde::Serialize;
use std::borrow::Cow;

/// A generated (or hand-written) write statement ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteCommand {
    pub kind: CommandKind,
    pub table: String,
    /// SQL with `?` placeholders.
    pub sql: String,
    pub parameters: Vec<Parameter>,
    /// Zero affected rows means a concurrent modification.
    pub optimistic: bool,
}

impl WriteCommand {
    fn from_statement(kind: CommandKind, table: &str, statement: Statement, optimistic: bool) -> Self {
        let (sql, parameters) = statement.into_parts();
        tracing::debug!(
            target: "rdbmap.sql",
            table,
            kind = %kind,
            params = parameters.len(),
            sql = %sql,
            "Generated write command"
        );
        Self {
            kind,
            table: table.to_string(),
            sql,
            parameters,
            optimistic,
        }
    }

    /// SQL with `$1, $2, ...` placeholders.
    pub fn numbered_sql(&self) -> String {
        crate::sql::numbered_placeholders(&self.sql)
    }

    pub fn has_managed_parameter(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.kind == ParameterKind::Managed)
    }
}

impl Mapping {
    /// The table an object is written to: by logical type name, then by
    /// table name, else an implied table named after the type whose key is
    /// `ID` when the object carries it.
    pub fn table_for_type(&self, object: &DataObject) -> Cow<'_, Table> {
        if let Some(t) = self
            .find_table_by_type(&object.type_name)
            .or_else(|| self.find_table(&object.type_name))
        {
            return Cow::Borrowed(t);
        }

        tracing::debug!(type_name = %object.type_name, "No table mapped, implying one");
        let mut table = Table::new(&object.type_name);
        if object.has_property(IMPLIED_PRIMARY_KEY) {
            table.columns.push(Column {
                primary_key: true,
                ..Column::new(IMPLIED_PRIMARY_KEY)
            });
        }
        Cow::Owned(table)
    }
}

/// A property whose value is written by an update or insert.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChangedField {
    pub property: String,
    pub new: Value,
    /// Value recorded in the change log before the edit. `None` for keys
    /// derived from a relationship change.
    pub old: Option<Value>,
    /// Name of the relationship this field was derived from.
    pub relationship: Option<String>,
}

/// Expand an object's change log into the fields to write, in log order.
///
/// To-one relationship changes become their foreign key properties, valued
/// from the new parent's key. To-many changes belong to the other side and
/// are skipped. The managed column is never diffed.
pub(crate) fn changed_fields(
    mapping: &Mapping,
    table: &Table,
    object: &DataObject,
) -> OrmResult<Vec<ChangedField>> {
    let mut fields: Vec<ChangedField> = Vec::new();

    for entry in object.changes.entries() {
        match entry {
            ChangeEntry::Scalar { property, old, new } => {
                if is_managed(table, property) || fields.iter().any(|f| f.property == *property) {
                    continue;
                }
                fields.push(ChangedField {
                    property: property.clone(),
                    new: new.clone(),
                    old: Some(old.clone()),
                    relationship: None,
                });
            }
            ChangeEntry::Relationship { reference, new, .. } => {
                if reference.many {
                    continue;
                }

                let r = mapping.relationship_by_reference(reference)?;
                if !r.child_table.eq_ignore_ascii_case(&table.name) {
                    tracing::debug!(
                        relationship = %r.name,
                        table = %table.name,
                        "Relationship change does not touch this table"
                    );
                    continue;
                }

                for pair in &r.key_pairs {
                    let property = mapping.column_property_name(&table.name, &pair.foreign_key_column);
                    if !object.has_property(property) {
                        return Err(OrmError::InvalidForeignKeyColumn(
                            pair.foreign_key_column.clone(),
                        ));
                    }
                    if is_managed(table, property) || fields.iter().any(|f| f.property == property) {
                        continue;
                    }

                    let parent_property =
                        mapping.column_property_name(&r.parent_table, &pair.primary_key_column);
                    let value = new
                        .as_ref()
                        .and_then(|parent| {
                            parent
                                .get(parent_property)
                                .or_else(|| parent.get(&pair.primary_key_column))
                        })
                        .cloned()
                        .unwrap_or(Value::Null);

                    fields.push(ChangedField {
                        property: property.to_string(),
                        new: value,
                        old: None,
                        relationship: Some(r.name.clone()),
                    });
                }
            }
        }
    }

    Ok(fields)
}

fn is_managed(table: &Table, property: &str) -> bool {
    table
        .column_by_property_name(property)
        .is_some_and(|c| c.managed)
}

/// Column name for a property, falling back to the property name.
pub(crate) fn column_name<'a>(table: &'a Table, property: &'a str) -> &'a str {
    table
        .column_by_property_name(property)
        .map_or(property, |c| c.name.as_str())
}

/// Declared type of a property, else the type its value carries.
pub(crate) fn declared_type(object: &DataObject, property: &str, value: &Value) -> SqlType {
    match object.property_type(property) {
        SqlType::Unknown => value.sql_type(),
        ty => ty,
    }
}

/// Current value of a property, `Null` when the object lacks it.
pub(crate) fn current_value(object: &DataObject, property: &str) -> Value {
    object.get(property).cloned().unwrap_or(Value::Null)
}

pub(crate) fn push_param(
    statement: &mut Statement,
    table: &Table,
    object: &DataObject,
    property: &str,
    value: Value,
    kind: ParameterKind,
) {
    let sql_type = declared_type(object, property, &value);
    let converter = table.converter(property).map(str::to_string);
    statement.push_param(property, value, sql_type, converter, kind);
}

/// Bind hand-written SQL to the object's current property values.
pub(crate) fn override_command(
    kind: CommandKind,
    table: &Table,
    object: &DataObject,
    sql: &SqlOverride,
) -> OrmResult<WriteCommand> {
    let mut statement = Statement::new(sql.sql.clone());
    for name in sql.parameter_names() {
        let value = current_value(object, name);
        let sql_type = declared_type(object, name, &value);
        let converter = table.converter(name).map(str::to_string);
        statement.bind_param(name, value, sql_type, converter);
    }
    statement.validate()?;
    Ok(WriteCommand::from_statement(kind, &table.name, statement, false))
}

/// Append `pk1 = ? and pk2 = ?` bound to current key values.
pub(crate) fn push_key_predicate(
    statement: &mut Statement,
    table: &Table,
    object: &DataObject,
) -> OrmResult<()> {
    if !table.has_primary_key() {
        return Err(OrmError::MissingPrimaryKey(table.name.clone()));
    }

    for (i, column) in table.primary_key_columns().enumerate() {
        if i > 0 {
            statement.push(" and ");
        }
        let property = column.property();
        statement.push(&column.name).push(" = ");
        push_param(
            statement,
            table,
            object,
            property,
            current_value(object, property),
            ParameterKind::Standard,
        );
    }
    Ok(())
}
