mod cli;
mod document;
mod report;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Check(args) => report::check(args),
        cli::Command::Order(args) => report::order(args),
        cli::Command::Relationships(args) => report::relationships(args),
    }
}
