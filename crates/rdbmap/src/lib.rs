//! # rdbmap
//!
//! Maps relational tables onto a graph of typed objects and turns edits of
//! that graph back into safely ordered, parameterized SQL.
//!
//! ## Pieces
//!
//! - **Mapping** ([`Mapping`]): tables, columns, keys, relationships, converters and
//!   hand-written SQL; built in code, inferred from naming conventions, or loaded
//!   from a JSON document ([`Config`])
//! - **Ordering**: [`Mapping::insert_order`] / [`Mapping::delete_order`] place parents
//!   before children (and fail on cycles)
//! - **Generation**: [`update_command`] builds an optimistic `update` from an object's
//!   change log; [`insert_command`] and [`delete_command`] cover the rest
//! - **Consistency**: [`check_foreign_keys`] rejects a relationship change combined with
//!   a direct edit of its foreign key
//! - **Execution**: [`plan`] + [`execute_plan`] run a [`ChangeSet`] against any
//!   [`GenericClient`], reporting stale rows as [`OrmError::StaleRecord`]
//!
//! ## Example
//!
//! ```ignore
//! use rdbmap::{ChangeSet, DataObject, Mapping};
//!
//! let mut mapping = Mapping::new();
//! mapping.add_primary_key(["CUSTOMER.ID"])?;
//!
//! let mut customer = DataObject::new("CUSTOMER").with("ID", 1).with("NAME", "A");
//! customer.set("NAME", "B");
//!
//! let mut changes = ChangeSet::new();
//! changes.modify(customer);
//!
//! let plan = rdbmap::plan(&mapping, &changes)?;
//! assert_eq!(
//!     plan.commands[0].sql,
//!     "update CUSTOMER set NAME = ? where ID = ? and NAME = ?"
//! );
//!
//! let report = rdbmap::execute_plan(&client, &plan, &rdbmap::Converters::new()).await?;
//! ```

pub mod change;
pub mod client;
pub mod config;
pub mod consistency;
pub mod convert;
pub mod error;
pub mod execute;
pub mod generator;
pub mod mapping;
pub mod order;
pub mod plan;
pub mod sql;
pub mod value;

pub use change::{ChangeEntry, ChangeLog, ChangeSet, DataObject, ObjectRef, Property, Reference};
pub use client::GenericClient;
pub use config::{
    Column, Command, CommandKind, Config, ConnectionInfo, ConnectionProperties, KeyPair,
    Relationship, SqlOverride, Table,
};
pub use consistency::{ObjectState, check_foreign_keys};
pub use convert::{Converter, Converters, FnConverter, YesNo};
pub use error::{OrmError, OrmResult};
pub use execute::{
    WriteReport, WriteStepReport, bind_values, execute_command, execute_plan,
    execute_plan_with_timeout,
};
pub use generator::{WriteCommand, delete_command, insert_command, update_command};
pub use mapping::{IMPLIED_PRIMARY_KEY, Mapping, QualifiedColumn};
pub use plan::{WritePlan, plan};
pub use sql::{Parameter, ParameterKind, Statement};
pub use value::{SqlType, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_info, create_pool_with_manager_config};

// Re-export deadpool_postgres types for convenience
#[cfg(feature = "pool")]
pub use deadpool_postgres::{Pool, PoolError};

// Re-export tokio_postgres types
pub use tokio_postgres;
