//! Running write commands against Postgres.
//!
//! This is the sink side of the generators: parameters are resolved
//! (managed versions, converters), `?` placeholders become `$n`, and zero
//! affected rows on an optimistic command becomes [`OrmError::StaleRecord`].
//!
//! Transactions are the caller's: pass a `Transaction` to run a plan
//! atomically.
//!
//! ```ignore
//! let tx = client.transaction().await?;
//! let report = rdbmap::execute_plan(&tx, &plan, &converters).await?;
//! tx.commit().await?;
//! ```

use crate::client::GenericClient;
use crate::config::CommandKind;
use crate::convert::Converters;
use crate::error::{OrmError, OrmResult};
use crate::generator::WriteCommand;
use crate::plan::WritePlan;
use crate::sql::ParameterKind;
use crate::value::Value;
use serde::Serialize;
use std::time::Duration;
use tokio_postgres::types::ToSql;

/// Outcome of one executed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteStepReport {
    pub table: String,
    pub kind: CommandKind,
    pub affected: u64,
}

/// Outcome of an executed plan, one step per command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub steps: Vec<WriteStepReport>,
}

impl WriteReport {
    pub fn total_affected(&self) -> u64 {
        self.steps.iter().map(|s| s.affected).sum()
    }

    pub fn affected_by(&self, kind: CommandKind) -> u64 {
        self.steps
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.affected)
            .sum()
    }
}

/// Final parameter values for a command, in placeholder order.
///
/// Managed parameters are replaced by their next version; converters run
/// last.
pub fn bind_values(command: &WriteCommand, converters: &Converters) -> OrmResult<Vec<Value>> {
    command
        .parameters
        .iter()
        .map(|p| {
            let value = match p.kind {
                ParameterKind::Managed => p.value.next_version(p.sql_type).ok_or_else(|| {
                    OrmError::validation(format!(
                        "Managed column {} in {} has no next version for {} value {}",
                        p.name, command.table, p.sql_type, p.value
                    ))
                })?,
                ParameterKind::Standard | ParameterKind::Collision => p.value.clone(),
            };
            converters.to_column(p.converter.as_deref(), value)
        })
        .collect()
}

/// Execute one command and return the affected row count.
pub async fn execute_command(
    conn: &impl GenericClient,
    command: &WriteCommand,
    converters: &Converters,
) -> OrmResult<u64> {
    let values = bind_values(command, converters)?;
    let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
    let sql = command.numbered_sql();

    tracing::debug!(
        target: "rdbmap.sql",
        table = %command.table,
        kind = %command.kind,
        params = params.len(),
        sql = %sql,
        "Executing write command"
    );

    let affected = conn.execute(&sql, &params).await?;
    if affected == 0 && command.optimistic {
        tracing::warn!(
            target: "rdbmap.sql",
            table = %command.table,
            sql = %command.sql,
            "Optimistic write matched no rows"
        );
        return Err(OrmError::StaleRecord {
            table: command.table.clone(),
            sql: command.sql.clone(),
        });
    }
    Ok(affected)
}

/// Execute every command of a plan in order, stopping at the first error.
pub async fn execute_plan(
    conn: &impl GenericClient,
    plan: &WritePlan,
    converters: &Converters,
) -> OrmResult<WriteReport> {
    let mut report = WriteReport::default();
    for command in plan {
        let affected = execute_command(conn, command, converters).await?;
        report.steps.push(WriteStepReport {
            table: command.table.clone(),
            kind: command.kind,
            affected,
        });
    }
    tracing::debug!(
        steps = report.steps.len(),
        affected = report.total_affected(),
        "Executed write plan"
    );
    Ok(report)
}

/// [`execute_plan`] bounded by `timeout`.
pub async fn execute_plan_with_timeout(
    conn: &impl GenericClient,
    plan: &WritePlan,
    converters: &Converters,
    timeout: Duration,
) -> OrmResult<WriteReport> {
    tokio::time::timeout(timeout, execute_plan(conn, plan, converters))
        .await
        .map_err(|_| OrmError::Timeout(timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ChangeSet, DataObject};
    use crate::mapping::Mapping;
    use crate::plan::plan;
    use crate::value::SqlType;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every statement; answers with queued row counts (default 1).
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        affected: Mutex<VecDeque<u64>>,
        delay: Option<Duration>,
    }

    impl Recorder {
        fn answering(counts: &[u64]) -> Self {
            Self {
                affected: Mutex::new(counts.iter().copied().collect()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GenericClient for Recorder {
        async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let rendered = params.iter().map(|p| format!("{p:?}")).collect();
            self.calls.lock().unwrap().push((sql.to_string(), rendered));
            Ok(self.affected.lock().unwrap().pop_front().unwrap_or(1))
        }
    }

    fn versioned_customer() -> (Mapping, ChangeSet) {
        let mut m = Mapping::new();
        m.add_primary_key(["CUSTOMER.ID"]).unwrap();
        m.add_managed_column("CUSTOMER.VERSION").unwrap();
        m.add_collision_column("CUSTOMER.VERSION").unwrap();
        m.add_column("CUSTOMER", "LAST_NAME", Some("lastName"));
        m.add_converter("CUSTOMER.LAST_NAME", "upper").unwrap();

        let mut c = DataObject::new("CUSTOMER")
            .with("ID", 1)
            .with("lastName", "smith")
            .with("VERSION", 4);
        c.set("lastName", "jones");

        let mut changes = ChangeSet::new();
        changes.modify(c);
        (m, changes)
    }

    fn upper() -> Converters {
        let mut converters = Converters::new();
        converters.register_fn("upper", |v| {
            Ok(match v {
                Value::Text(s) => Value::Text(s.to_uppercase()),
                other => other,
            })
        });
        converters
    }

    #[tokio::test]
    async fn binds_versions_and_converters_with_numbered_placeholders() {
        let (m, changes) = versioned_customer();
        let plan = plan(&m, &changes).unwrap();
        let client = Recorder::default();

        let report = execute_plan(&client, &plan, &upper()).await.unwrap();
        assert_eq!(report.total_affected(), 1);
        assert_eq!(report.affected_by(CommandKind::Update), 1);

        let calls = client.calls();
        assert_eq!(
            calls[0].0,
            "update CUSTOMER set LAST_NAME = $1, VERSION = $2 where ID = $3 and VERSION = $4"
        );
        assert_eq!(
            calls[0].1,
            vec![
                r#"Text("JONES")"#.to_string(),
                "Int(5)".to_string(),
                "Int(1)".to_string(),
                "Int(4)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn zero_rows_on_optimistic_update_is_stale() {
        let (m, changes) = versioned_customer();
        let plan = plan(&m, &changes).unwrap();
        let client = Recorder::answering(&[0]);

        let err = execute_plan(&client, &plan, &upper()).await.unwrap_err();
        assert!(err.is_stale());
    }

    #[tokio::test]
    async fn zero_rows_on_delete_is_not_an_error() {
        let mut m = Mapping::new();
        m.add_primary_key(["CUSTOMER.ID"]).unwrap();
        let mut changes = ChangeSet::new();
        changes.delete(DataObject::new("CUSTOMER").with("ID", 1));

        let plan = plan(&m, &changes).unwrap();
        let report = execute_plan(&Recorder::answering(&[0]), &plan, &Converters::new())
            .await
            .unwrap();
        assert_eq!(report.steps[0].affected, 0);
    }

    #[tokio::test]
    async fn stops_at_first_error() {
        let (m, mut changes) = versioned_customer();
        changes.create(DataObject::new("CUSTOMER").with("ID", 2).with("lastName", "x"));
        let plan = plan(&m, &changes).unwrap();
        assert_eq!(plan.len(), 2);

        // Converter missing: the insert (first) fails, nothing runs.
        let client = Recorder::default();
        let err = execute_plan(&client, &plan, &Converters::new()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(client.calls().is_empty());
    }

    #[test]
    fn unversionable_managed_value_is_rejected() {
        let mut m = Mapping::new();
        m.add_primary_key(["DOC.ID"]).unwrap();
        m.add_managed_column("DOC.TAG").unwrap();
        let mut d = DataObject::new("DOC")
            .with("ID", 1)
            .with_typed("TAG", SqlType::Text, "v1")
            .with("BODY", "a");
        d.set("BODY", "b");

        let mut changes = ChangeSet::new();
        changes.modify(d);
        let plan = plan(&m, &changes).unwrap();
        let err = bind_values(&plan.commands[0], &Converters::new()).unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[tokio::test]
    async fn slow_client_times_out() {
        let (m, changes) = versioned_customer();
        let plan = plan(&m, &changes).unwrap();
        let client = Recorder {
            delay: Some(Duration::from_millis(200)),
            ..Recorder::default()
        };

        let err = execute_plan_with_timeout(&client, &plan, &upper(), Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
