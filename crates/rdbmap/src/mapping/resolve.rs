use super::Mapping;
use crate::change::Reference;
use crate::config::Relationship;
use crate::error::{OrmError, OrmResult};

fn missing(name: &str) -> OrmError {
    OrmError::not_found(format!("Could not find relationship {name} in the configuration"))
}

impl Mapping {
    /// Exact lookup by relationship name.
    pub fn relationship_by_name(&self, name: &str) -> OrmResult<&Relationship> {
        self.relationships()
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| missing(name))
    }

    /// Resolve the relationship behind a navigation property.
    ///
    /// The forward name is tried first, then the opposite name declared on
    /// either the relationship or the reference.
    pub fn relationship_by_reference(&self, reference: &Reference) -> OrmResult<&Relationship> {
        let relationships = self.relationships();
        if let Some(r) = relationships.iter().find(|r| r.name == reference.name) {
            return Ok(r);
        }

        relationships
            .iter()
            .find(|r| {
                r.opposite_name.as_deref() == Some(reference.name.as_str())
                    || reference.opposite.as_deref() == Some(r.name.as_str())
            })
            .ok_or_else(|| missing(&reference.name))
    }

    /// Relationships whose child side is `table` (case-insensitive).
    pub fn relationships_by_child_table(&self, table: &str) -> Vec<&Relationship> {
        self.relationships()
            .iter()
            .filter(|r| r.child_table.eq_ignore_ascii_case(table))
            .collect()
    }

    /// Relationships whose parent side is `table` (case-insensitive).
    pub fn relationships_by_parent_table(&self, table: &str) -> Vec<&Relationship> {
        self.relationships()
            .iter()
            .filter(|r| r.parent_table.eq_ignore_ascii_case(table))
            .collect()
    }

    /// True when any relationship points from a table back to itself.
    pub fn has_recursive_relationships(&self) -> bool {
        self.relationships().iter().any(Relationship::is_self_referencing)
    }
}
