use crate::error::{OrmError, OrmResult};

/// A `Table.Column` reference. Everything before the last `.` is the table,
/// so schema-qualified tables (`sales.ORDERS.ID`) keep their schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedColumn<'a> {
    pub table: &'a str,
    pub column: &'a str,
}

impl<'a> QualifiedColumn<'a> {
    pub fn parse(name: &'a str) -> OrmResult<Self> {
        let name_trimmed = name.trim();
        match name_trimmed.rsplit_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                Ok(Self { table, column })
            }
            _ => Err(OrmError::InvalidQualifiedName(name.to_string())),
        }
    }
}
