use super::{WriteCommand, override_command, push_key_predicate};
use crate::change::DataObject;
use crate::config::{CommandKind, Table};
use crate::error::OrmResult;
use crate::sql::Statement;

/// Build the `delete` for one removed object, keyed by its current primary
/// key values.
pub fn delete_command(table: &Table, object: &DataObject) -> OrmResult<WriteCommand> {
    if let Some(sql) = &table.delete {
        return override_command(CommandKind::Delete, table, object, sql);
    }

    let mut statement = Statement::new(format!("delete from {} where ", table.name));
    push_key_predicate(&mut statement, table, object)?;

    Ok(WriteCommand::from_statement(
        CommandKind::Delete,
        &table.name,
        statement,
        false,
    ))
}
