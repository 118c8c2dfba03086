//! Loading a mapping document and querying the resulting registry.

use rdbmap::{CommandKind, Config, Mapping, OrmError};

fn fixture() -> Mapping {
    Mapping::from_json_file(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/customer_orders.json"
    ))
    .expect("fixture should load")
}

#[test]
fn document_loads_and_validates() {
    let mapping = fixture();
    mapping.validate().unwrap();

    assert_eq!(mapping.tables().len(), 4);
    assert_eq!(mapping.relationships().len(), 2);
    assert_eq!(mapping.find_table_by_type("AnOrder").unwrap().name, "ANORDER");
    assert_eq!(mapping.find_table("anorder").unwrap().type_name(), "AnOrder");
    assert_eq!(mapping.table_type_name("AUDIT_LOG"), "AUDIT_LOG");
}

#[test]
fn ordering_covers_related_and_unrelated_tables() {
    let mapping = fixture();
    assert_eq!(
        mapping.insert_order().unwrap(),
        vec!["CUSTOMER", "ANORDER", "ORDERDETAILS"]
    );
    assert_eq!(
        mapping.delete_order().unwrap(),
        vec!["ORDERDETAILS", "ANORDER", "CUSTOMER"]
    );
    assert_eq!(
        mapping.full_insert_order().unwrap(),
        vec!["CUSTOMER", "ANORDER", "ORDERDETAILS", "AUDIT_LOG"]
    );
}

#[test]
fn column_metadata_survives_loading() {
    let mapping = fixture();

    let converters = mapping.converters("CUSTOMER");
    assert_eq!(converters.len(), 1);
    assert_eq!(converters["lastName"], "upper");

    let customer = mapping.find_table("CUSTOMER").unwrap();
    assert_eq!(customer.managed_column().unwrap().name, "VERSION");
    assert_eq!(customer.collision_column().unwrap().name, "VERSION");
    assert_eq!(mapping.column_property_name("ANORDER", "CUSTOMER_ID"), "customerId");
    assert!(mapping.column("ANORDER", "ID").unwrap().generated);

    let details = mapping.find_table("ORDERDETAILS").unwrap();
    assert_eq!(details.primary_key_names(), vec!["ORDERID", "PRODUCTID"]);
}

#[test]
fn commands_and_connection_info() {
    let mapping = fixture();
    assert_eq!(
        mapping.command("all customers").unwrap().kind,
        CommandKind::Select
    );

    let info = mapping.connection_info().unwrap();
    assert!(!info.managed_tx);
    let props = info.connection_properties.as_ref().unwrap();
    assert_eq!(props.login_timeout, 5);
    assert!(props.password.is_none());
}

#[test]
fn round_trips_through_json() {
    let mapping = fixture();
    let json = mapping.config().to_json_pretty().unwrap();
    let reloaded = Config::from_json_str(&json).unwrap();
    assert_eq!(&reloaded, mapping.config());
}

#[test]
fn missing_file_is_serialization_error() {
    let err = Mapping::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, OrmError::Serialization(_)));
}
