//! Turning a change set into an ordered list of write commands.

use crate::change::{ChangeSet, DataObject};
use crate::config::CommandKind;
use crate::consistency::{ObjectState, check_foreign_keys};
use crate::error::OrmResult;
use crate::generator::{
    WriteCommand, changed_fields, delete_command, insert_command, update_command,
};
use crate::mapping::Mapping;
use serde::Serialize;

/// Write commands in execution order: inserts, then updates, then deletes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WritePlan {
    pub commands: Vec<WriteCommand>,
}

impl WritePlan {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WriteCommand> {
        self.commands.iter()
    }

    pub fn count(&self, kind: CommandKind) -> usize {
        self.commands.iter().filter(|c| c.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a WritePlan {
    type Item = &'a WriteCommand;
    type IntoIter = std::slice::Iter<'a, WriteCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Position of `table` in `order`; unordered tables sort after all others.
fn rank(order: &[String], table: &str) -> usize {
    order
        .iter()
        .position(|t| t.eq_ignore_ascii_case(table))
        .unwrap_or(order.len())
}

fn build<F>(objects: &[DataObject], order: &[String], mut generate: F) -> OrmResult<Vec<WriteCommand>>
where
    F: FnMut(&DataObject) -> OrmResult<Option<WriteCommand>>,
{
    let mut commands = Vec::with_capacity(objects.len());
    for object in objects {
        commands.extend(generate(object)?);
    }
    // Stable: objects of one table keep change-set order.
    commands.sort_by_key(|c| rank(order, &c.table));
    Ok(commands)
}

/// Check and generate every write of a change set.
///
/// Created and modified objects go through the foreign key consistency
/// check first; any failure aborts the whole plan. A modified object with
/// nothing of its own to write (say a parent whose only change is a to-many
/// list) produces no command.
pub fn plan(mapping: &Mapping, changes: &ChangeSet) -> OrmResult<WritePlan> {
    let insert_order = mapping.insert_order()?;
    let delete_order: Vec<String> = insert_order.iter().rev().cloned().collect();

    let inserts = build(&changes.created, &insert_order, |object| {
        let table = mapping.table_for_type(object);
        check_foreign_keys(mapping, &table, object, ObjectState::Created)?;
        insert_command(mapping, &table, object).map(Some)
    })?;

    let updates = build(&changes.modified, &insert_order, |object| {
        let table = mapping.table_for_type(object);
        check_foreign_keys(mapping, &table, object, ObjectState::Modified)?;
        if changed_fields(mapping, &table, object)?.is_empty() {
            tracing::debug!(
                type_name = %object.type_name,
                table = %table.name,
                "No column changes, skipping update"
            );
            return Ok(None);
        }
        update_command(mapping, &table, object).map(Some)
    })?;

    let deletes = build(&changes.deleted, &delete_order, |object| {
        let table = mapping.table_for_type(object);
        delete_command(&table, object).map(Some)
    })?;

    let mut commands = inserts;
    commands.extend(updates);
    commands.extend(deletes);

    tracing::debug!(
        commands = commands.len(),
        objects = changes.len(),
        "Planned writes"
    );
    Ok(WritePlan { commands })
}
