use crate::cli::{DocumentArgs, OrderArgs};
use crate::document;
use rdbmap::Mapping;
use rdbmap::sql::count_placeholders;

pub fn check(args: DocumentArgs) -> anyhow::Result<()> {
    let mapping = document::load(&args)?;
    let (summary, problems) = check_report(&mapping);
    println!("{}: {summary}", args.file.display());
    for problem in &problems {
        println!("  error: {problem}");
    }
    for warning in warnings(&mapping) {
        println!("  warning: {warning}");
    }
    if !problems.is_empty() {
        anyhow::bail!("mapping check failed");
    }
    Ok(())
}

pub fn order(args: OrderArgs) -> anyhow::Result<()> {
    let mapping = document::load(&args.document)?;
    for (i, table) in order_lines(&mapping, args.delete, args.full)?
        .iter()
        .enumerate()
    {
        println!("{:>3}. {table}", i + 1);
    }
    Ok(())
}

pub fn relationships(args: DocumentArgs) -> anyhow::Result<()> {
    let mapping = document::load(&args)?;
    if mapping.relationships().is_empty() {
        println!("no relationships");
    }
    for line in relationship_lines(&mapping) {
        println!("{line}");
    }
    Ok(())
}

fn check_report(mapping: &Mapping) -> (String, Vec<String>) {
    let summary = format!(
        "{} table(s), {} relationship(s), {} command(s)",
        mapping.tables().len(),
        mapping.relationships().len(),
        mapping.commands().len()
    );

    let mut problems = Vec::new();
    if let Err(e) = mapping.validate() {
        problems.push(e.to_string());
    }
    if let Err(e) = mapping.insert_order() {
        problems.push(e.to_string());
    }
    for table in mapping.tables() {
        let overrides = [
            ("create", &table.create),
            ("update", &table.update),
            ("delete", &table.delete),
        ];
        for (kind, sql) in overrides {
            let Some(sql) = sql else { continue };
            let expected = count_placeholders(&sql.sql);
            let given = sql.parameter_names().count();
            if expected != given {
                problems.push(format!(
                    "{kind} statement for {} has {expected} placeholder(s) but {given} parameter(s)",
                    table.name
                ));
            }
        }
    }
    (summary, problems)
}

fn warnings(mapping: &Mapping) -> Vec<String> {
    let mut out: Vec<String> = mapping
        .tables()
        .iter()
        .filter(|t| !t.has_primary_key())
        .map(|t| format!("table {} has no primary key; updates and deletes will fail", t.name))
        .collect();
    if mapping.has_recursive_relationships() {
        out.push("self-referencing relationships do not constrain the table order".to_string());
    }
    out
}

fn order_lines(mapping: &Mapping, delete: bool, full: bool) -> anyhow::Result<Vec<String>> {
    let mut tables = if full {
        mapping.full_insert_order()?
    } else {
        mapping.insert_order()?
    };
    if delete {
        tables.reverse();
    }
    Ok(tables)
}

fn relationship_lines(mapping: &Mapping) -> Vec<String> {
    mapping
        .relationships()
        .iter()
        .map(|r| {
            let name = match &r.opposite_name {
                Some(opposite) => format!("{} / {opposite}", r.name),
                None => r.name.clone(),
            };
            let keys = r
                .key_pairs
                .iter()
                .map(|k| {
                    format!(
                        "{}.{} = {}.{}",
                        r.parent_table, k.primary_key_column, r.child_table, k.foreign_key_column
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            let cardinality = if r.many { "1:n" } else { "1:1" };
            format!(
                "{name}: {} -> {} ({cardinality}) on {keys}",
                r.parent_table, r.child_table
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdbmap::CommandKind;

    fn shop() -> Mapping {
        let mut m = Mapping::new();
        m.add_primary_key(["CUSTOMER.ID", "ANORDER.ID"]).unwrap();
        m.add_relationship("CUSTOMER.ID", "ANORDER.CUSTOMER_ID", Some("orders"))
            .unwrap()
            .opposite_name = Some("customer".into());
        m.find_or_create_table("AUDIT_LOG");
        m.add_command("all customers", "select * from CUSTOMER", CommandKind::Select);
        m
    }

    #[test]
    fn clean_document_has_no_problems() {
        let (summary, problems) = check_report(&shop());
        assert_eq!(summary, "3 table(s), 1 relationship(s), 1 command(s)");
        assert!(problems.is_empty());
    }

    #[test]
    fn override_parameter_mismatch_is_a_problem() {
        let mut m = shop();
        m.add_create_statement("AUDIT_LOG", "insert into AUDIT_LOG values (?, ?)", "ID");
        let (_, problems) = check_report(&m);
        assert_eq!(
            problems,
            vec!["create statement for AUDIT_LOG has 2 placeholder(s) but 1 parameter(s)"]
        );
    }

    #[test]
    fn keyless_table_is_a_warning() {
        assert_eq!(
            warnings(&shop()),
            vec!["table AUDIT_LOG has no primary key; updates and deletes will fail"]
        );
    }

    #[test]
    fn order_variants() {
        let m = shop();
        assert_eq!(order_lines(&m, false, false).unwrap(), vec!["CUSTOMER", "ANORDER"]);
        assert_eq!(order_lines(&m, true, false).unwrap(), vec!["ANORDER", "CUSTOMER"]);
        assert_eq!(
            order_lines(&m, true, true).unwrap(),
            vec!["AUDIT_LOG", "ANORDER", "CUSTOMER"]
        );
    }

    #[test]
    fn relationship_line_lists_key_pairs() {
        assert_eq!(
            relationship_lines(&shop()),
            vec!["orders / customer: CUSTOMER -> ANORDER (1:n) on CUSTOMER.ID = ANORDER.CUSTOMER_ID"]
        );
    }
}
