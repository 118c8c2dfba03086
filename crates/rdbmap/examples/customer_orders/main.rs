//! Example: build a customer / order mapping in code and inspect the
//! statements generated for a unit of work. No database needed.
//!
//! Run with: cargo run --example customer_orders -p rdbmap

#[path = "../common/output.rs"]
mod output;

use colored::Colorize;
use output::{
    plan_table, print_banner, print_done, print_header, print_info, print_success, print_warning,
};
use rdbmap::{
    ChangeSet, DataObject, Mapping, ObjectRef, OrmError, OrmResult, Reference, SqlType, Value,
    plan,
};

fn build_mapping() -> OrmResult<Mapping> {
    let mut mapping = Mapping::new();
    mapping.add_table("CUSTOMER", Some("Customer"))?;
    mapping.add_table("ANORDER", Some("AnOrder"))?;
    mapping.add_primary_key(["CUSTOMER.ID", "ANORDER.ID"])?;

    mapping.add_column("CUSTOMER", "LASTNAME", Some("lastName"));
    mapping.add_column("CUSTOMER", "VERSION", None);
    mapping.add_managed_column("CUSTOMER.VERSION")?;
    mapping.add_collision_column("CUSTOMER.VERSION")?;

    mapping.add_column("ANORDER", "PRODUCT", Some("product"));
    mapping.add_column("ANORDER", "CUSTOMER_ID", Some("customerId"));
    mapping.add_generated_column("ANORDER.ID")?;

    mapping
        .add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", Some("orders"))?
        .opposite_name = Some("customer".into());

    mapping.validate()?;
    Ok(mapping)
}

fn customer(id: i32) -> ObjectRef {
    ObjectRef::new("Customer").with("ID", id)
}

fn main() -> OrmResult<()> {
    print_banner("Customer / Order Write Planning");

    let mapping = build_mapping()?;

    // ============================================
    // Ordering
    // ============================================
    print_header("1. Dependency Order");
    let order = mapping.insert_order()?;
    print_success(&format!("Insert order: {}", order.join(" -> ")));
    let order = mapping.delete_order()?;
    print_success(&format!("Delete order: {}", order.join(" -> ")));

    // ============================================
    // A unit of work
    // ============================================
    print_header("2. Unit of Work");

    let mut smith = DataObject::new("Customer")
        .with("ID", 1)
        .with("lastName", "Smith")
        .with("VERSION", 3);
    smith.set("lastName", "Smythe");
    print_info("Customer 1 renamed (versioned: only VERSION is compared)");

    let mut moved = DataObject::new("AnOrder")
        .with("ID", 100)
        .with("product", "Widget")
        .with("customerId", 2);
    moved.set_reference(Reference::to_one("customer"), Some(customer(2)), Some(customer(1)));
    print_info("Order 100 moved from customer 2 to customer 1");

    let mut fresh = DataObject::new("AnOrder")
        .with("product", "Gadget")
        .with_typed("customerId", SqlType::Int, Value::Null);
    fresh.set_reference(Reference::to_one("customer"), None, Some(customer(1)));
    print_info("New order for customer 1 (key taken from the parent)");

    let mut changes = ChangeSet::new();
    changes
        .create(fresh)
        .modify(smith)
        .modify(moved)
        .delete(DataObject::new("Customer").with("ID", 9).with("VERSION", 1));

    let plan = plan(&mapping, &changes)?;
    println!();
    println!("{}", "Generated commands:".bold());
    println!("{}", plan_table(&plan));

    // ============================================
    // Inconsistent edit
    // ============================================
    print_header("3. Conflicting Foreign Key Edit");

    let mut conflicted = DataObject::new("AnOrder")
        .with("ID", 101)
        .with("product", "Widget")
        .with("customerId", 2);
    conflicted.set_reference(Reference::to_one("customer"), Some(customer(2)), Some(customer(1)));
    conflicted.set("customerId", 1);

    let mut changes = ChangeSet::new();
    changes.modify(conflicted);
    match rdbmap::plan(&mapping, &changes) {
        Ok(_) => print_warning("Unexpected success - this should have failed!"),
        Err(err @ OrmError::ForeignKeyConflict { .. }) => {
            print_warning(&format!("Rejected: {err}"));
            print_info("Change the relationship or the key column, not both.");
        }
        Err(e) => return Err(e),
    }

    print_done();
    Ok(())
}
