//! Example: apply a planned unit of work inside a transaction and watch an
//! optimistic update fail on a stale version.
//!
//! Run with: cargo run --example apply_changes -p rdbmap
//!
//! Requires `DATABASE_URL` (read from `.env` when present).

mod common;
#[path = "../common/output.rs"]
mod output;

use colored::Colorize;
use common::schema::setup_shop_schema;
use output::{
    plan_table, print_banner, print_done, print_header, print_info, print_success, print_warning,
};
use rdbmap::{
    ChangeSet, Converters, DataObject, Mapping, ObjectRef, OrmError, OrmResult, Reference,
    create_pool, execute_plan, plan,
};
use std::env;

fn shop_mapping() -> OrmResult<Mapping> {
    let mut mapping = Mapping::new();
    mapping.add_primary_key(["CUSTOMER.ID", "ANORDER.ID"])?;
    mapping.add_column("CUSTOMER", "LASTNAME", Some("lastName"));
    mapping.add_column("CUSTOMER", "VERSION", None);
    mapping.add_managed_column("CUSTOMER.VERSION")?;
    mapping.add_collision_column("CUSTOMER.VERSION")?;
    mapping.add_column("ANORDER", "PRODUCT", Some("product"));
    mapping.add_column("ANORDER", "CUSTOMER_ID", Some("customerId"));
    mapping
        .add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", Some("orders"))?
        .opposite_name = Some("customer".into());
    Ok(mapping)
}

fn renamed_customer(version: i32, name: &str) -> DataObject {
    let mut customer = DataObject::new("CUSTOMER")
        .with("ID", 1)
        .with("lastName", "Smith")
        .with("VERSION", version);
    customer.set("lastName", name);
    customer
}

#[tokio::main]
async fn main() -> Result<(), OrmError> {
    dotenvy::dotenv().ok();

    print_banner("Applying a Unit of Work");

    let database_url =
        env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env or environment");

    let pool = create_pool(&database_url)?;
    let mut client = pool.get().await?;

    print_header("Setup: Creating Tables and Test Data");
    setup_shop_schema(&client).await?;
    print_success("Created CUSTOMER and ANORDER with two customers and one order");

    let mapping = shop_mapping()?;
    let converters = Converters::new();

    // ============================================
    // Example 1: A unit of work in one transaction
    // ============================================
    print_header("1. Insert, Move and Rename in One Transaction");

    let mut moved = DataObject::new("ANORDER")
        .with("ID", 100)
        .with("product", "Widget")
        .with("customerId", 2);
    moved.set_reference(
        Reference::to_one("customer"),
        Some(ObjectRef::new("CUSTOMER").with("ID", 2)),
        Some(ObjectRef::new("CUSTOMER").with("ID", 1)),
    );

    let mut changes = ChangeSet::new();
    changes
        .create(
            DataObject::new("CUSTOMER")
                .with("ID", 3)
                .with("lastName", "Brown")
                .with("VERSION", 0),
        )
        .modify(moved)
        .modify(renamed_customer(0, "Smythe"));

    let write_plan = plan(&mapping, &changes)?;
    println!("{}", plan_table(&write_plan));

    let tx = client
        .transaction()
        .await
        .map_err(OrmError::from_db_error)?;
    let report = execute_plan(&tx, &write_plan, &converters).await?;
    tx.commit().await.map_err(OrmError::from_db_error)?;
    print_success(&format!(
        "Committed {} command(s), {} row(s) affected",
        report.steps.len(),
        report.total_affected()
    ));

    // ============================================
    // Example 2: Stale version
    // ============================================
    print_header("2. Version Conflict Detection (StaleRecord)");
    print_info("Customer 1 is now at VERSION 1; writing with VERSION 0 again");

    let mut changes = ChangeSet::new();
    changes.modify(renamed_customer(0, "Smith-Jones"));
    let write_plan = plan(&mapping, &changes)?;

    let tx = client
        .transaction()
        .await
        .map_err(OrmError::from_db_error)?;
    let outcome = execute_plan(&tx, &write_plan, &converters).await;
    tx.rollback().await.map_err(OrmError::from_db_error)?;

    match outcome {
        Ok(_) => print_warning("Unexpected success - this should have failed!"),
        Err(err @ OrmError::StaleRecord { .. }) => {
            print_warning(&format!("{err}"));
            print_info("The row was modified by someone else. Re-read and retry.");
        }
        Err(e) => return Err(e),
    }

    let row = client
        .query_one("SELECT lastname, version FROM customer WHERE id = 1", &[])
        .await
        .map_err(OrmError::from_db_error)?;
    let (name, version): (String, i32) = (row.get(0), row.get(1));
    println!();
    println!(
        "{} {} {}",
        "Stored:".bold(),
        name.yellow(),
        format!("(version {version})").magenta()
    );

    print_done();
    Ok(())
}
