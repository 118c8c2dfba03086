//! Statement builder for generated writes.
//!
//! A [`Statement`] stores SQL pieces and typed [`Parameter`]s separately, so a
//! placeholder and the parameter bound to it are always appended together and
//! the 1-based parameter index is assigned by the builder.
//!
//! Generated SQL uses `?` placeholders. Postgres needs `$1, $2, ...`;
//! [`Statement::to_numbered_sql`] and [`numbered_placeholders`] render that
//! form.
//!
//! # Example
//!
//! ```ignore
//! use rdbmap::sql::{Statement, ParameterKind};
//! use rdbmap::{SqlType, Value};
//!
//! let mut s = Statement::new("update CUSTOMER set NAME = ");
//! s.push_param("NAME", Value::from("B"), SqlType::Text, None, ParameterKind::Standard);
//! s.push(" where ID = ");
//! s.push_param("ID", Value::from(1), SqlType::Int, None, ParameterKind::Standard);
//!
//! assert_eq!(s.to_sql(), "update CUSTOMER set NAME = ? where ID = ?");
//! assert_eq!(s.to_numbered_sql(), "update CUSTOMER set NAME = $1 where ID = $2");
//! ```


use crate::error::{OrmError, OrmResult};
use crate::value::{SqlType, Value};
use serde::Serialize;
use std::fmt::Write;

/// How the execution layer treats a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Bound as-is (after conversion).
    Standard,
    /// Optimistic lock token: the bound value is the current one, the
    /// execution layer replaces it with the next version.
    Managed,
    /// Expected pre-edit value in an optimistic predicate.
    Collision,
}

/// One positional parameter of a generated statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// 1-based position.
    pub index: usize,
    /// Object property the value comes from.
    pub name: String,
    pub value: Value,
    pub sql_type: SqlType,
    /// Converter id applied before binding.
    pub converter: Option<String>,
    pub kind: ParameterKind,
}

#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// SQL text plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    parts: Vec<SqlPart>,
    params: Vec<Parameter>,
}

impl Statement {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a placeholder and the parameter bound to it.
    pub fn push_param(
        &mut self,
        name: impl Into<String>,
        value: Value,
        sql_type: SqlType,
        converter: Option<String>,
        kind: ParameterKind,
    ) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(Parameter {
            index: self.params.len() + 1,
            name: name.into(),
            value,
            sql_type,
            converter,
            kind,
        });
        self
    }

    /// Bind a parameter without emitting a placeholder. Used for
    /// hand-written SQL that already contains its `?` markers.
    pub fn bind_param(
        &mut self,
        name: impl Into<String>,
        value: Value,
        sql_type: SqlType,
        converter: Option<String>,
    ) -> &mut Self {
        self.params.push(Parameter {
            index: self.params.len() + 1,
            name: name.into(),
            value,
            sql_type,
            converter,
            kind: ParameterKind::Standard,
        });
        self
    }

    /// Render SQL with `?` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => out.push('?'),
            }
        }
        out
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_numbered_sql(&self) -> String {
        numbered_placeholders(&self.to_sql())
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Parameter>) {
        (self.to_sql(), self.params)
    }

    /// Check that every `?` outside quoted text has a parameter.
    pub fn validate(&self) -> OrmResult<()> {
        let placeholder_count = count_placeholders(&self.to_sql());
        if placeholder_count != self.params.len() {
            return Err(OrmError::Validation(format!(
                "Statement: {} placeholders but {} params",
                placeholder_count,
                self.params.len()
            )));
        }
        Ok(())
    }
}

/// Visit every `?` that is not inside a quoted literal or identifier.
fn scan_placeholders(sql: &str, mut on_placeholder: impl FnMut(&mut String), out: &mut String) {
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                // A doubled quote closes and reopens, which works out the same.
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => on_placeholder(out),
                _ => out.push(c),
            },
        }
    }
}

/// Rewrite `?` placeholders as `$1, $2, ...`, leaving quoted text alone.
pub fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut idx: usize = 0;
    scan_placeholders(
        sql,
        |out| {
            idx += 1;
            let _ = write!(out, "${idx}");
        },
        &mut out,
    );
    out
}

/// Number of `?` placeholders outside quoted text.
pub fn count_placeholders(sql: &str) -> usize {
    let mut out = String::with_capacity(sql.len());
    let mut count = 0;
    scan_placeholders(sql, |_| count += 1, &mut out);
    count
}
