//! Column converters.
//!
//! A column may name a converter id in the mapping. At execution time the id
//! is resolved through a [`Converters`] registry and the converter rewrites
//! the parameter value before it is bound.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Rewrite a property value into the value stored in its column.
pub trait Converter: Send + Sync {
    fn to_column(&self, value: Value) -> OrmResult<Value>;
}

/// A converter built from a closure.
pub struct FnConverter<F>(pub F);

impl<F> Converter for FnConverter<F>
where
    F: Fn(Value) -> OrmResult<Value> + Send + Sync,
{
    fn to_column(&self, value: Value) -> OrmResult<Value> {
        (self.0)(value)
    }
}

/// Converter id -> converter.
#[derive(Clone, Default)]
pub struct Converters {
    by_id: HashMap<String, Arc<dyn Converter>>,
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.by_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("Converters").field("ids", &ids).finish()
    }
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a converter.
    pub fn register(&mut self, id: impl Into<String>, converter: impl Converter + 'static) -> &mut Self {
        self.by_id.insert(id.into(), Arc::new(converter));
        self
    }

    /// Register a closure as a write-direction converter.
    pub fn register_fn<F>(&mut self, id: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Value) -> OrmResult<Value> + Send + Sync + 'static,
    {
        self.register(id, FnConverter(f))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> OrmResult<&dyn Converter> {
        self.by_id
            .get(id)
            .map(|c| c.as_ref())
            .ok_or_else(|| OrmError::not_found(format!("Converter {id} is not registered")))
    }

    /// Apply the converter named by `id`, if any.
    pub fn to_column(&self, id: Option<&str>, value: Value) -> OrmResult<Value> {
        match id {
            Some(id) => self.get(id)?.to_column(value),
            None => Ok(value),
        }
    }
}

/// Stores booleans as `'Y'`/`'N'` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct YesNo;

impl Converter for YesNo {
    fn to_column(&self, value: Value) -> OrmResult<Value> {
        match value {
            Value::Bool(true) => Ok(Value::from("Y")),
            Value::Bool(false) => Ok(Value::from("N")),
            Value::Null => Ok(Value::Null),
            other => Err(OrmError::conversion(
                "yes_no",
                format!("expected a boolean, got {other}"),
            )),
        }
    }
}
