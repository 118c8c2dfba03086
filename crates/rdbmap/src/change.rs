//! Object state and change records handed over by the object graph.
//!
//! The graph container tracks edits; this crate only reads them. A
//! [`DataObject`] carries its current property values plus a [`ChangeLog`]
//! of what changed since the last synchronization point. A [`ChangeSet`]
//! groups the objects of one unit of work.

use crate::value::{SqlType, Value};
use serde::{Deserialize, Serialize};

/// One typed property of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SqlType,
    pub value: Value,
}

/// A navigation property between two object types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    /// Name of the navigation property on the other side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite: Option<String>,
    /// To-many on this side.
    #[serde(default)]
    pub many: bool,
}

impl Reference {
    /// A to-one reference (child pointing at its parent).
    pub fn to_one(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opposite: None,
            many: false,
        }
    }

    /// A to-many reference (parent holding its children).
    pub fn to_many(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opposite: None,
            many: true,
        }
    }

    pub fn with_opposite(mut self, opposite: impl Into<String>) -> Self {
        self.opposite = Some(opposite.into());
        self
    }
}

/// Identifies a related object by type and key property values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub type_name: String,
    pub key: Vec<(String, Value)>,
}

impl ObjectRef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key: Vec::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.key.push((property.into(), value.into()));
        self
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.key
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, v)| v)
    }
}

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEntry {
    /// A data property changed value.
    Scalar {
        property: String,
        old: Value,
        new: Value,
    },
    /// A navigation property now points at a different object (or none).
    Relationship {
        reference: Reference,
        old: Option<ObjectRef>,
        new: Option<ObjectRef>,
    },
}

impl ChangeEntry {
    /// Name of the changed property or reference.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { property, .. } => property,
            Self::Relationship { reference, .. } => &reference.name,
        }
    }
}

/// Ordered edits of one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record a scalar edit. Repeated edits of one property keep the first
    /// old value and the latest new value.
    pub fn record_scalar(&mut self, property: impl Into<String>, old: Value, new: Value) {
        let property = property.into();
        for entry in &mut self.entries {
            if let ChangeEntry::Scalar { property: p, new: n, .. } = entry
                && *p == property
            {
                *n = new;
                return;
            }
        }
        self.entries.push(ChangeEntry::Scalar { property, old, new });
    }

    /// Record a reference edit, merged the same way as scalar edits.
    pub fn record_relationship(
        &mut self,
        reference: Reference,
        old: Option<ObjectRef>,
        new: Option<ObjectRef>,
    ) {
        for entry in &mut self.entries {
            if let ChangeEntry::Relationship { reference: r, new: n, .. } = entry
                && r.name == reference.name
            {
                *n = new;
                return;
            }
        }
        self.entries
            .push(ChangeEntry::Relationship { reference, old, new });
    }

    /// The value a data property held before the first recorded edit.
    ///
    /// Relationship entries never answer here.
    pub fn old_value(&self, property: &str) -> Option<&Value> {
        self.entries.iter().find_map(|e| match e {
            ChangeEntry::Scalar { property: p, old, .. } if p == property => Some(old),
            _ => None,
        })
    }

    pub fn has_scalar_change(&self, property: &str) -> bool {
        self.old_value(property).is_some()
    }
}

/// Current state of one object plus its pending edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    pub type_name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "ChangeLog::is_empty")]
    pub changes: ChangeLog,
}

impl DataObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Vec::new(),
            changes: ChangeLog::new(),
        }
    }

    /// Add a property whose type is taken from its value.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.sql_type();
        self.with_typed(name, ty, value)
    }

    /// Add a property with an explicit declared type (needed for nulls).
    pub fn with_typed(mut self, name: impl Into<String>, ty: SqlType, value: impl Into<Value>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            ty,
            value: value.into(),
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.property(name).map(|p| &p.value)
    }

    /// Declared type of a property; `Unknown` when the object lacks it.
    pub fn property_type(&self, name: &str) -> SqlType {
        self.property(name).map_or(SqlType::Unknown, |p| p.ty)
    }

    /// Change a data property and record the edit.
    ///
    /// Setting a property the object does not carry adds it with a null old
    /// value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let old = match self.properties.iter_mut().find(|p| p.name == name) {
            Some(p) => {
                if p.ty == SqlType::Unknown {
                    p.ty = value.sql_type();
                }
                std::mem::replace(&mut p.value, value.clone())
            }
            None => {
                self.properties.push(Property {
                    name: name.to_string(),
                    ty: value.sql_type(),
                    value: value.clone(),
                });
                Value::Null
            }
        };
        self.changes.record_scalar(name, old, value);
        self
    }

    /// Point a navigation property at another object (or none) and record
    /// the edit.
    pub fn set_reference(
        &mut self,
        reference: Reference,
        old: Option<ObjectRef>,
        new: Option<ObjectRef>,
    ) -> &mut Self {
        self.changes.record_relationship(reference, old, new);
        self
    }

    /// This object as the target of a reference, keyed by `key_properties`.
    pub fn to_ref<'a>(&self, key_properties: impl IntoIterator<Item = &'a str>) -> ObjectRef {
        let mut r = ObjectRef::new(&self.type_name);
        for name in key_properties {
            r.key
                .push((name.to_string(), self.get(name).cloned().unwrap_or(Value::Null)));
        }
        r
    }
}

/// The objects touched by one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub created: Vec<DataObject>,
    #[serde(default)]
    pub modified: Vec<DataObject>,
    #[serde(default)]
    pub deleted: Vec<DataObject>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, object: DataObject) -> &mut Self {
        self.created.push(object);
        self
    }

    pub fn modify(&mut self, object: DataObject) -> &mut Self {
        self.modified.push(object);
        self
    }

    pub fn delete(&mut self, object: DataObject) -> &mut Self {
        self.deleted.push(object);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }
}
