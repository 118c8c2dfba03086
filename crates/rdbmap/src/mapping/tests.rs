use super::*;

fn customer_orders() -> Mapping {
    let mut m = Mapping::new();
    m.add_table("CUSTOMER", Some("Customer")).unwrap();
    m.add_table("ANORDER", Some("AnOrder")).unwrap();
    m.add_primary_key(["CUSTOMER.ID", "ANORDER.ID"]).unwrap();
    m.add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", Some("orders"))
        .unwrap();
    m
}

#[test]
fn table_lookup_is_case_insensitive_type_lookup_is_exact() {
    let m = customer_orders();

    assert_eq!(m.find_table("customer").unwrap().name, "CUSTOMER");
    assert_eq!(m.find_table("AnOrder"), None);
    assert_eq!(m.find_table("anorder").unwrap().name, "ANORDER");

    assert_eq!(m.find_table_by_type("Customer").unwrap().name, "CUSTOMER");
    assert!(m.find_table_by_type("customer").is_none());
}

#[test]
fn untyped_table_is_not_found_by_type() {
    let mut m = Mapping::new();
    m.find_or_create_table("CUSTOMER");
    assert!(m.find_table_by_type("CUSTOMER").is_none());
    assert_eq!(m.table_type_name("CUSTOMER"), "CUSTOMER");
}

#[test]
fn changing_type_name_reindexes() {
    let mut m = customer_orders();
    m.find_or_create_table("NOTE");
    m.set_table_type_name("note", Some("Note")).unwrap();
    m.set_table_type_name("CUSTOMER", Some("Client")).unwrap();

    assert_eq!(m.find_table_by_type("Note").unwrap().name, "NOTE");
    assert_eq!(m.find_table_by_type("Client").unwrap().name, "CUSTOMER");
    assert!(m.find_table_by_type("Customer").is_none());
    assert_eq!(m.find_table_by_type("AnOrder").unwrap().name, "ANORDER");

    m.set_table_type_name("NOTE", None).unwrap();
    assert!(m.find_table_by_type("Note").is_none());
    assert!(m.set_table_type_name("MISSING", Some("X")).unwrap_err().is_not_found());
}

#[test]
fn add_table_rejects_duplicates_in_any_case() {
    let mut m = customer_orders();
    let err = m.add_table("Customer", None).unwrap_err();
    assert!(matches!(err, OrmError::DuplicateEntity(_)));
    assert_eq!(m.tables().len(), 2);
}

#[test]
fn find_or_create_is_idempotent() {
    let mut m = Mapping::new();
    m.find_or_create_column("BOOK", "TITLE");
    m.find_or_create_column("book", "TITLE");
    m.find_or_create_table("Book");

    assert_eq!(m.tables().len(), 1);
    assert_eq!(m.find_table("BOOK").unwrap().columns.len(), 1);
}

#[test]
fn implied_relationship_skips_self_reference() {
    let mut m = Mapping::new();
    assert!(!m.add_implied_relationship("BOOK", "BOOK", "BOOK_ID"));
    assert!(!m.add_implied_relationship("Book", "BOOK", "BOOK_ID"));
    assert!(m.relationships().is_empty());
}

#[test]
fn implied_relationship_is_registered_once_per_pair() {
    let mut m = Mapping::new();
    assert!(m.add_implied_relationship("AUTHOR", "BOOK", "AUTHOR_ID"));
    assert!(!m.add_implied_relationship("AUTHOR", "BOOK", "WRITER_ID"));

    assert_eq!(m.relationships().len(), 1);
    let r = &m.relationships()[0];
    assert_eq!(r.name, "BOOK");
    assert!(r.many);
    assert_eq!(r.primary_keys(), vec![IMPLIED_PRIMARY_KEY]);
    assert_eq!(r.foreign_keys(), vec!["AUTHOR_ID"]);
}

#[test]
fn implied_primary_key_does_not_overwrite() {
    let mut m = Mapping::new();
    m.add_implied_primary_key("BOOK", "ID");
    m.add_implied_primary_key("BOOK", "ISBN");

    let book = m.find_table("BOOK").unwrap();
    assert_eq!(book.primary_key_names(), vec!["ID"]);
    assert!(book.column("ISBN").is_none());
}

#[test]
fn explicit_relationship_name_defaults_to_child_table() {
    let mut m = Mapping::new();
    let r = m
        .add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", None)
        .unwrap();
    assert_eq!(r.name, "ANORDER");
    assert_eq!(r.parent_table, "CUSTOMER");
    assert_eq!(r.child_table, "ANORDER");

    let err = m.add_relationship("CUSTOMER", "ANORDER.CUSTOMER_ID", None);
    assert!(matches!(err, Err(OrmError::InvalidQualifiedName(_))));
}

#[test]
fn converters_are_keyed_by_property_name() {
    let mut m = Mapping::new();
    m.add_column("CUSTOMER", "LAST_NAME", Some("lastName"));
    m.add_column("CUSTOMER", "FIRST_NAME", None);
    m.add_column("CUSTOMER", "NOTES", None);
    m.add_converter("CUSTOMER.LAST_NAME", "upper").unwrap();
    m.add_converter("CUSTOMER.FIRST_NAME", "trim").unwrap();

    let converters = m.converters("customer");
    assert_eq!(converters.len(), 2);
    assert_eq!(converters["lastName"], "upper");
    assert_eq!(converters["FIRST_NAME"], "trim");
    assert_eq!(m.converter("CUSTOMER", "NOTES"), None);
    assert!(m.converters("MISSING").is_empty());
}

#[test]
fn property_name_falls_back_to_column_name() {
    let mut m = Mapping::new();
    m.add_column("CUSTOMER", "LAST_NAME", Some("lastName"));
    m.add_column("CUSTOMER", "CITY", None);

    assert_eq!(m.column_property_name("CUSTOMER", "LAST_NAME"), "lastName");
    assert_eq!(m.column_property_name("CUSTOMER", "CITY"), "CITY");
    assert_eq!(m.column_property_name("CUSTOMER", "UNKNOWN"), "UNKNOWN");
    assert_eq!(
        m.column_by_property_name("CUSTOMER", "lastName").unwrap().name,
        "LAST_NAME"
    );
    assert_eq!(m.table_type_name("CUSTOMER"), "CUSTOMER");
    assert_eq!(m.table_type_name("NOPE"), "NOPE");
}

#[test]
fn second_managed_column_is_rejected() {
    let mut m = Mapping::new();
    m.add_managed_column("CUSTOMER.VERSION").unwrap();
    m.add_managed_column("CUSTOMER.VERSION").unwrap();
    let err = m.add_managed_column("CUSTOMER.STAMP").unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));

    m.add_collision_column("CUSTOMER.NAME").unwrap();
    m.add_generated_column("CUSTOMER.ID").unwrap();
    let t = m.find_table("CUSTOMER").unwrap();
    assert_eq!(t.managed_column().unwrap().name, "VERSION");
    assert_eq!(t.collision_column().unwrap().name, "NAME");
    assert!(t.column("ID").unwrap().generated);
}

#[test]
fn sql_overrides_and_commands() {
    let mut m = Mapping::new();
    m.add_update_statement("CUSTOMER", "update CUSTOMER set NAME = ? where ID = ?", "NAME ID");
    m.add_command("all customers", "select * from CUSTOMER", CommandKind::Select);

    let t = m.find_table("CUSTOMER").unwrap();
    assert_eq!(
        t.update.as_ref().unwrap().parameter_names().collect::<Vec<_>>(),
        vec!["NAME", "ID"]
    );
    assert!(t.create.is_none());
    assert_eq!(m.command("all customers").unwrap().kind, CommandKind::Select);
    assert!(m.command("missing").is_none());
}

#[test]
fn connection_info_variants() {
    let mut m = Mapping::new();
    m.add_connection_info_data_source("jdbc/customers", true);
    assert_eq!(
        m.connection_info().unwrap().data_source.as_deref(),
        Some("jdbc/customers")
    );

    m.add_connection_info("postgres://localhost/db", Some("app"), Some("secret"), 5);
    let props = m
        .connection_info()
        .unwrap()
        .connection_properties
        .as_ref()
        .unwrap();
    assert_eq!(props.login_timeout, 5);
    assert_eq!(props.to_string(), "postgres://localhost/db as app");
}

#[test]
fn validate_reports_document_problems() {
    let config = Config::from_json_str(
        r#"{
            "tables": [
                { "name": "BOOK", "columns": [
                    { "name": "V1", "managed": true },
                    { "name": "V2", "managed": true }
                ] },
                { "name": "book" },
                { "name": "AUTHOR", "typeName": "Writer" },
                { "name": "EDITOR", "typeName": "Writer" }
            ],
            "relationships": [
                { "name": "empty", "parentTable": "AUTHOR", "childTable": "BOOK" }
            ]
        }"#,
    )
    .unwrap();

    let m = Mapping::from_config(config);
    let err = m.validate().unwrap_err().to_string();
    assert!(err.contains("duplicates"), "{err}");
    assert!(err.contains("more than one managed column"), "{err}");
    assert!(err.contains("no key pairs"), "{err}");
    assert!(err.contains("type Writer is mapped by both AUTHOR and EDITOR"), "{err}");

    // The first of two same-named tables wins the lookup.
    assert_eq!(m.find_table("BOOK").unwrap().columns.len(), 2);
    assert!(customer_orders().validate().is_ok());
}
