//! Foreign key consistency between relationship changes and direct edits.
//!
//! A child's foreign key columns are derived from its parent reference. When
//! a change log both reassigns the reference and sets one of those columns
//! directly, there is no way to tell which one the caller meant, so the
//! whole object is rejected.

use crate::change::{ChangeEntry, DataObject};
use crate::config::Table;
use crate::error::{OrmError, OrmResult};
use crate::mapping::Mapping;

/// Whether an object is being inserted or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Every non-null property counts as set.
    Created,
    /// Only properties with a scalar entry in the change log count as set.
    Modified,
}

/// Reject an object whose change log reassigns a to-one reference and also
/// sets a foreign key property of that relationship.
///
/// Relationship foreign key columns the object does not carry are reported as
/// [`OrmError::InvalidForeignKeyColumn`].
pub fn check_foreign_keys(
    mapping: &Mapping,
    table: &Table,
    object: &DataObject,
    state: ObjectState,
) -> OrmResult<()> {
    for entry in object.changes.entries() {
        let ChangeEntry::Relationship { reference, .. } = entry else {
            continue;
        };
        if reference.many {
            continue;
        }

        let r = mapping.relationship_by_reference(reference)?;
        if !r.child_table.eq_ignore_ascii_case(&table.name) {
            continue;
        }

        for pair in &r.key_pairs {
            let property = mapping.column_property_name(&table.name, &pair.foreign_key_column);
            let Some(current) = object.get(property) else {
                return Err(OrmError::InvalidForeignKeyColumn(
                    pair.foreign_key_column.clone(),
                ));
            };

            let set_directly = match state {
                ObjectState::Created => !current.is_null(),
                ObjectState::Modified => object.changes.has_scalar_change(property),
            };
            if set_directly {
                tracing::debug!(
                    relationship = %r.name,
                    property,
                    "Foreign key set together with its relationship"
                );
                return Err(OrmError::ForeignKeyConflict {
                    relationship: r.name.clone(),
                });
            }
        }
    }
    Ok(())
}
