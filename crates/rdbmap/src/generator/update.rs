use super::{
    ChangedField, WriteCommand, changed_fields, column_name, current_value, override_command, push_key_predicate,
    push_param,
};
use crate::change::DataObject;
use crate::config::{CommandKind, Table};
use crate::error::{OrmError, OrmResult};
use crate::mapping::Mapping;
use crate::sql::{ParameterKind, Statement};

/// Build the optimistic `update` for one modified object.
///
/// Clause order:
///
/// 1. `set` every changed field (log order; to-one relationship changes
///    contribute their foreign key columns), skipping a column that is both
///    collision and primary key
/// 2. the managed column, last, as a [`ParameterKind::Managed`] parameter
/// 3. `where` every primary key column bound to its current value
/// 4. without a collision column, `and col = ?` per changed field bound to
///    its logged old value (`is null` when that value is null); with one, a
///    single `and collision = ?` bound to its pre-edit value
///
/// Keys are immutable: a change log that gives a primary key property a new
/// value is rejected with [`OrmError::Validation`].
///
/// ```ignore
/// // CUSTOMER(ID pk, NAME), NAME changed "A" -> "B"
/// let cmd = update_command(&mapping, &table, &customer)?;
/// assert_eq!(cmd.sql, "update CUSTOMER set NAME = ? where ID = ? and NAME = ?");
/// ```
pub fn update_command(
    mapping: &Mapping,
    table: &Table,
    object: &DataObject,
) -> OrmResult<WriteCommand> {
    if let Some(sql) = &table.update {
        return override_command(CommandKind::Update, table, object, sql);
    }

    let fields = changed_fields(mapping, table, object)?;
    reject_key_edits(table, object, &fields)?;

    let mut statement = Statement::new(format!("update {} set ", table.name));
    let mut assignments = 0;

    for field in &fields {
        if let Some(c) = table.column_by_property_name(&field.property)
            && c.collision
            && c.primary_key
        {
            continue;
        }
        if assignments > 0 {
            statement.push(", ");
        }
        statement
            .push(column_name(table, &field.property))
            .push(" = ");
        push_param(
            &mut statement,
            table,
            object,
            &field.property,
            field.new.clone(),
            ParameterKind::Standard,
        );
        assignments += 1;
    }

    if let Some(managed) = table.managed_column() {
        if assignments > 0 {
            statement.push(", ");
        }
        let property = managed.property();
        let read = object
            .changes
            .old_value(property)
            .cloned()
            .unwrap_or_else(|| current_value(object, property));
        statement.push(&managed.name).push(" = ");
        push_param(
            &mut statement,
            table,
            object,
            property,
            read,
            ParameterKind::Managed,
        );
        assignments += 1;
    }

    if assignments == 0 {
        return Err(OrmError::validation(format!(
            "Nothing to update in {} for {}",
            table.name, object.type_name
        )));
    }

    statement.push(" where ");
    push_key_predicate(&mut statement, table, object)?;

    match table.collision_column() {
        None => {
            for field in &fields {
                statement.push(" and ").push(column_name(table, &field.property));
                let expected = match &field.old {
                    Some(old) => old.clone(),
                    None => current_value(object, &field.property),
                };
                if expected.is_null() {
                    statement.push(" is null");
                } else {
                    statement.push(" = ");
                    push_param(
                        &mut statement,
                        table,
                        object,
                        &field.property,
                        expected,
                        ParameterKind::Collision,
                    );
                }
            }
        }
        Some(collision) => {
            let property = collision.property();
            let expected = object
                .changes
                .old_value(property)
                .cloned()
                .unwrap_or_else(|| current_value(object, property));
            statement.push(" and ").push(&collision.name).push(" = ");
            push_param(
                &mut statement,
                table,
                object,
                property,
                expected,
                ParameterKind::Collision,
            );
        }
    }

    Ok(WriteCommand::from_statement(
        CommandKind::Update,
        &table.name,
        statement,
        true,
    ))
}

fn reject_key_edits(table: &Table, object: &DataObject, fields: &[ChangedField]) -> OrmResult<()> {
    for field in fields {
        let Some(column) = table.column_by_property_name(&field.property) else {
            continue;
        };
        if !column.primary_key {
            continue;
        }
        let before = match &field.old {
            Some(old) => old.clone(),
            None => current_value(object, &field.property),
        };
        if before != field.new {
            return Err(OrmError::validation(format!(
                "Primary key {} of {} cannot be changed ({before} -> {})",
                column.name, table.name, field.new
            )));
        }
    }
    Ok(())
}
