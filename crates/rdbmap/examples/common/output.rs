//! Terminal rendering shared by the examples: section rules, status lines
//! and a table view of a write plan.

use colored::{ColoredString, Colorize};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use rdbmap::{CommandKind, WritePlan};

const WIDTH: usize = 70;

pub fn print_banner(title: &str) {
    let inner = WIDTH - 2;
    println!();
    println!("{}", format!("╔{}╗", "═".repeat(inner)).cyan());
    println!("{}", format!("║{title:^inner$}║").cyan().bold());
    println!("{}", format!("╚{}╝", "═".repeat(inner)).cyan());
}

pub fn print_header(title: &str) {
    let rule = "─".repeat(WIDTH);
    println!();
    println!("{}", rule.bright_black());
    println!("{}", title.bold().cyan());
    println!("{}", rule.bright_black());
}

fn print_status(mark: ColoredString, msg: &str) {
    println!("  {mark} {msg}");
}

pub fn print_success(msg: &str) {
    print_status("✓".green().bold(), msg);
}

pub fn print_warning(msg: &str) {
    print_status("⚠".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    print_status("ℹ".blue(), msg);
}

pub fn print_done() {
    let rule = "═".repeat(WIDTH);
    println!();
    println!("{}", rule.cyan());
    println!("{}", "  Example finished.".green().bold());
    println!("{}", rule.cyan());
    println!();
}

fn kind_cell(kind: CommandKind) -> Cell {
    let color = match kind {
        CommandKind::Insert => Color::Green,
        CommandKind::Update => Color::Yellow,
        CommandKind::Delete => Color::Red,
        CommandKind::Select | CommandKind::Procedure => Color::White,
    };
    Cell::new(kind).fg(color)
}

/// One row per command: position, kind, table, SQL and bound parameters.
pub fn plan_table(plan: &WritePlan) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["#", "Kind", "Table", "SQL", "Parameters"]
                .map(|title| Cell::new(title).add_attribute(Attribute::Bold).fg(Color::Cyan)),
        );

    for (i, command) in plan.iter().enumerate() {
        let params = command
            .parameters
            .iter()
            .map(|p| format!("{}={} ({:?})", p.name, p.value, p.kind))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(i + 1).fg(Color::DarkGrey),
            kind_cell(command.kind),
            Cell::new(&command.table).fg(Color::Magenta),
            Cell::new(&command.sql),
            Cell::new(params).fg(Color::DarkGrey),
        ]);
    }

    table
}
