use super::{WriteCommand, changed_fields, column_name, override_command, push_param};
use crate::change::DataObject;
use crate::config::{CommandKind, Table};
use crate::error::OrmResult;
use crate::mapping::Mapping;
use crate::sql::{ParameterKind, Statement};
use crate::value::Value;

/// Build the `insert` for one created object.
///
/// Every non-null property is written except database generated columns.
/// To-one relationship entries in the object's change log supply the
/// foreign key values. A managed column without a value is written as a
/// [`ParameterKind::Managed`] parameter so the execution layer can start
/// its version.
pub fn insert_command(
    mapping: &Mapping,
    table: &Table,
    object: &DataObject,
) -> OrmResult<WriteCommand> {
    if let Some(sql) = &table.create {
        return override_command(CommandKind::Insert, table, object, sql);
    }

    let mut values: Vec<(String, Value)> = object
        .properties
        .iter()
        .map(|p| (p.name.clone(), p.value.clone()))
        .collect();

    for field in changed_fields(mapping, table, object)? {
        if field.relationship.is_none() {
            continue;
        }
        match values.iter_mut().find(|(name, _)| *name == field.property) {
            Some((_, v)) => *v = field.new,
            None => values.push((field.property, field.new)),
        }
    }

    let managed = table.managed_column().map(|c| c.property().to_string());
    let mut columns = Vec::new();
    let mut params: Vec<(String, Value, ParameterKind)> = Vec::new();

    for (property, value) in values {
        let is_managed = managed.as_deref() == Some(property.as_str());
        if value.is_null() && !is_managed {
            continue;
        }
        if table
            .column_by_property_name(&property)
            .is_some_and(|c| c.generated)
        {
            continue;
        }

        let kind = if is_managed && value.is_null() {
            ParameterKind::Managed
        } else {
            ParameterKind::Standard
        };
        columns.push(column_name(table, &property).to_string());
        params.push((property, value, kind));
    }

    let mut statement = Statement::new(format!("insert into {}", table.name));
    if columns.is_empty() {
        statement.push(" default values");
    } else {
        statement.push(&format!(" ({}) values (", columns.join(", ")));
        for (i, (property, value, kind)) in params.into_iter().enumerate() {
            if i > 0 {
                statement.push(", ");
            }
            push_param(&mut statement, table, object, &property, value, kind);
        }
        statement.push(")");
    }

    Ok(WriteCommand::from_statement(
        CommandKind::Insert,
        &table.name,
        statement,
        false,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ObjectRef, Reference};
    use crate::value::SqlType;

    fn mapping() -> Mapping {
        let mut m = Mapping::new();
        m.add_primary_key(["CUSTOMER.ID", "ANORDER.ID"]).unwrap();
        m.add_generated_column("ANORDER.ID").unwrap();
        m.add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", Some("orders"))
            .unwrap()
            .opposite_name = Some("customer".into());
        m
    }

    fn generate(m: &Mapping, object: &DataObject) -> WriteCommand {
        let table = m.table_for_type(object);
        insert_command(m, &table, object).unwrap()
    }

    #[test]
    fn writes_non_null_properties_in_order() {
        let m = mapping();
        let c = DataObject::new("CUSTOMER")
            .with("ID", 1)
            .with("NAME", "Ann")
            .with_typed("CITY", SqlType::Text, Value::Null);

        let cmd = generate(&m, &c);
        assert_eq!(cmd.sql, "insert into CUSTOMER (ID, NAME) values (?, ?)");
        assert_eq!(cmd.parameters.len(), 2);
        assert!(!cmd.optimistic);
    }

    #[test]
    fn generated_key_is_skipped_and_parent_key_is_copied() {
        let m = mapping();
        let mut order = DataObject::new("ANORDER")
            .with("ID", 0)
            .with_typed("CUSTOMER_ID", SqlType::Int, Value::Null)
            .with("TOTAL", 12.5);
        order.set_reference(
            Reference::to_one("customer"),
            None,
            Some(ObjectRef::new("CUSTOMER").with("ID", 5)),
        );

        let cmd = generate(&m, &order);
        assert_eq!(cmd.sql, "insert into ANORDER (CUSTOMER_ID, TOTAL) values (?, ?)");
        assert_eq!(cmd.parameters[0].value, Value::Int(5));
        assert_eq!(cmd.parameters[0].sql_type, SqlType::Int);
    }

    #[test]
    fn missing_managed_value_becomes_managed_parameter() {
        let mut m = mapping();
        m.add_managed_column("CUSTOMER.VERSION").unwrap();
        let c = DataObject::new("CUSTOMER")
            .with("ID", 1)
            .with_typed("VERSION", SqlType::Int, Value::Null);

        let cmd = generate(&m, &c);
        assert_eq!(cmd.sql, "insert into CUSTOMER (ID, VERSION) values (?, ?)");
        assert_eq!(cmd.parameters[1].kind, ParameterKind::Managed);
    }

    #[test]
    fn only_generated_columns_uses_default_values() {
        let m = mapping();
        let order = DataObject::new("ANORDER").with("ID", 0);
        assert_eq!(generate(&m, &order).sql, "insert into ANORDER default values");
    }

    #[test]
    fn hand_written_create_wins() {
        let mut m = mapping();
        m.add_create_statement("CUSTOMER", "insert into CUSTOMER values (?, ?)", "ID, NAME");
        let c = DataObject::new("CUSTOMER").with("ID", 1).with("NAME", "Ann");
        let cmd = generate(&m, &c);
        assert_eq!(cmd.sql, "insert into CUSTOMER values (?, ?)");
        assert_eq!(cmd.kind, CommandKind::Insert);
    }
}
