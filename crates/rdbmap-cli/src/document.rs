use crate::cli::{DocumentArgs, Format};
use rdbmap::{Config, Mapping};
use std::path::Path;

/// Read a mapping document and build the registry over it.
pub fn load(args: &DocumentArgs) -> anyhow::Result<Mapping> {
    let raw = std::fs::read_to_string(&args.file).map_err(|e| {
        anyhow::anyhow!("failed to read mapping document {}: {e}", args.file.display())
    })?;

    let format = args.format.unwrap_or_else(|| detect_format(&args.file));
    let config = parse(&raw, format).map_err(|e| {
        anyhow::anyhow!("failed to parse mapping document {}: {e}", args.file.display())
    })?;

    Ok(Mapping::from_config(config))
}

fn detect_format(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
        _ => Format::Json,
    }
}

fn parse(raw: &str, format: Format) -> anyhow::Result<Config> {
    Ok(match format {
        Format::Json => serde_json::from_str(raw)?,
        Format::Toml => toml::from_str(raw)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP_TOML: &str = r#"
[[tables]]
name = "CUSTOMER"
typeName = "Customer"
columns = [
    { name = "ID", primaryKey = true },
    { name = "VERSION", managed = true, collision = true },
]

[[tables]]
name = "ANORDER"
columns = [{ name = "ID", primaryKey = true }, { name = "CUSTOMER_ID" }]

[[relationships]]
name = "orders"
oppositeName = "customer"
parentTable = "CUSTOMER"
childTable = "ANORDER"
keyPairs = [{ primaryKeyColumn = "ID", foreignKeyColumn = "CUSTOMER_ID" }]
"#;

    #[test]
    fn extension_selects_format() {
        assert_eq!(detect_format(Path::new("shop.TOML")), Format::Toml);
        assert_eq!(detect_format(Path::new("shop.json")), Format::Json);
        assert_eq!(detect_format(Path::new("shop")), Format::Json);
    }

    #[test]
    fn toml_document_parses_into_config() {
        let config = parse(SHOP_TOML, Format::Toml).unwrap();
        let mapping = Mapping::from_config(config);
        mapping.validate().unwrap();
        assert_eq!(mapping.insert_order().unwrap(), vec!["CUSTOMER", "ANORDER"]);
        assert!(mapping.relationships()[0].many);
        assert_eq!(
            mapping.find_table("customer").unwrap().managed_column().unwrap().name,
            "VERSION"
        );
    }

    #[test]
    fn json_and_toml_agree() {
        let from_toml = parse(SHOP_TOML, Format::Toml).unwrap();
        let json = from_toml.to_json_pretty().unwrap();
        assert_eq!(parse(&json, Format::Json).unwrap(), from_toml);
    }

    #[test]
    fn missing_file_names_the_path() {
        let args = DocumentArgs {
            file: "/definitely/not/here.json".into(),
            format: None,
        };
        let err = load(&args).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
