//! Terminal output. Everything the CLI prints goes through here.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use voltmart_admin::components::data_table::RenderedTable;
use voltmart_storefront::error::AppError;

/// Print a confirmation or informational line.
pub fn message(text: &str) {
    println!("{text}");
}

/// Print the server's message when it sent one, otherwise `fallback`.
pub fn server_message(message: Option<String>, fallback: &str) {
    println!("{}", message.as_deref().unwrap_or(fallback));
}

/// Print aligned `label: value` lines.
pub fn fields(pairs: &[(&str, String)]) {
    let width = pairs
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    for (label, value) in pairs {
        println!("{label:<width$}  {value}");
    }
}

/// Print a table page with its pagination footer.
pub fn table(table: &RenderedTable) {
    if table.rows.is_empty() {
        println!("{}", table.empty_message);
        return;
    }

    let widths = table.widths();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| pad(column.label, *width, column.numeric))
        .collect();
    println!("{}", header.join("  ").trim_end());

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    println!("{}", rule.join("  "));

    for row in &table.rows {
        let cells: Vec<String> = table
            .columns
            .iter()
            .zip(&widths)
            .zip(row)
            .map(|((column, width), cell)| pad(cell, *width, column.numeric))
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }

    if table.total_pages > 1 {
        println!("\nPage {} of {}", table.page, table.total_pages);
    }
}

/// Print a failed command to stderr, field by field for rejected forms.
pub fn failure(error: &AppError) {
    match error.field_errors() {
        Some(errors) => {
            eprintln!("Please fix the following:");
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
        }
        None => eprintln!("Error: {}", error.user_message()),
    }
}

fn pad(text: &str, width: usize, numeric: bool) -> String {
    if numeric {
        format!("{text:>width$}")
    } else {
        format!("{text:<width$}")
    }
}
