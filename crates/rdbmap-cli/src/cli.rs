use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Check,
    Order,
    Relationships,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Check(DocumentArgs),
    Order(OrderArgs),
    Relationships(DocumentArgs),
}

/// Document encoding; inferred from the file extension unless forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

#[derive(Debug, Clone)]
pub struct DocumentArgs {
    pub file: PathBuf,
    pub format: Option<Format>,
}

#[derive(Debug, Clone)]
pub struct OrderArgs {
    pub document: DocumentArgs,
    /// Print the delete order instead of the insert order.
    pub delete: bool,
    /// Append tables that take part in no relationship.
    pub full: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    let rest = it.map(|s| s.as_str());
    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "check" => parse_document(rest, HelpTopic::Check).map(|d| match d {
            Parsed::Help(topic) => Command::Help(topic),
            Parsed::Args(args, _) => Command::Check(args),
        }),
        "order" => parse_document(rest, HelpTopic::Order).map(|d| match d {
            Parsed::Help(topic) => Command::Help(topic),
            Parsed::Args(document, flags) => Command::Order(OrderArgs {
                document,
                delete: flags.delete,
                full: flags.full,
            }),
        }),
        "relationships" => parse_document(rest, HelpTopic::Relationships).map(|d| match d {
            Parsed::Help(topic) => Command::Help(topic),
            Parsed::Args(args, _) => Command::Relationships(args),
        }),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

enum Parsed {
    Help(HelpTopic),
    Args(DocumentArgs, OrderFlags),
}

#[derive(Default)]
struct OrderFlags {
    delete: bool,
    full: bool,
}

fn parse_document<'a>(
    mut it: impl Iterator<Item = &'a str>,
    topic: HelpTopic,
) -> anyhow::Result<Parsed> {
    let mut file: Option<PathBuf> = None;
    let mut format: Option<Format> = None;
    let mut flags = OrderFlags::default();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Parsed::Help(topic)),
            "--format" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--format requires a value");
                };
                format = Some(parse_format(v)?);
            }
            _ if token.starts_with("--format=") => {
                format = Some(parse_format(token.trim_start_matches("--format="))?);
            }
            "--delete" if topic == HelpTopic::Order => flags.delete = true,
            "--full" if topic == HelpTopic::Order => flags.full = true,
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => {
                if file.is_some() {
                    anyhow::bail!("unexpected argument: {other}");
                }
                file = Some(PathBuf::from(other));
            }
        }
    }

    let Some(file) = file else {
        anyhow::bail!("missing mapping document path");
    };
    Ok(Parsed::Args(DocumentArgs { file, format }, flags))
}

fn parse_format(v: &str) -> anyhow::Result<Format> {
    match v {
        "json" => Ok(Format::Json),
        "toml" => Ok(Format::Toml),
        other => anyhow::bail!("unsupported format: {other} (expected json or toml)"),
    }
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
rdbmap - inspect relational mapping documents

USAGE:
  rdbmap <COMMAND> <FILE> [OPTIONS]

COMMANDS:
  check           Validate a mapping document
  order           Print the dependency-safe table order
  relationships   List relationships and their key pairs
  help            Print this message

Run `rdbmap <command> --help` for more."
            );
        }
        HelpTopic::Check => {
            println!(
                "\
USAGE:
  rdbmap check <FILE> [OPTIONS]

OPTIONS:
  --format <json|toml>  Document format (default: from file extension)
  -h, --help            Print help"
            );
        }
        HelpTopic::Order => {
            println!(
                "\
USAGE:
  rdbmap order <FILE> [OPTIONS]

OPTIONS:
  --format <json|toml>  Document format (default: from file extension)
  --delete              Print the delete order (children first)
  --full                Include tables without relationships
  -h, --help            Print help"
            );
        }
        HelpTopic::Relationships => {
            println!(
                "\
USAGE:
  rdbmap relationships <FILE> [OPTIONS]

OPTIONS:
  --format <json|toml>  Document format (default: from file extension)
  -h, --help            Print help"
            );
        }
    }
}
