//! Terminal output

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use beaverdam_core::{BrowseSession, ProjectedRow};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Visible rows as a table, followed by the record count and active chips
pub fn print_rows(session: &BrowseSession) {
    let columns = session.table().columns();
    let mut table = new_table();
    table.set_header(std::iter::once("id").chain(columns.iter().map(String::as_str)));
    for row in session.visible_rows() {
        table.add_row(row_cells(row, columns));
    }
    println!("{table}");

    println!(
        "{} of {} records",
        session.table().visible_count(),
        session.table().len()
    );
    let chips: Vec<String> = session
        .chips()
        .into_iter()
        .map(|chip| format!("{}: {}", chip.field, chip.label))
        .collect();
    if !chips.is_empty() {
        println!("filters: {}", chips.join(" | "));
    }
}

fn row_cells(row: &ProjectedRow, columns: &[String]) -> Vec<String> {
    std::iter::once(row.id.clone())
        .chain(columns.iter().map(|c| row.get(c).to_string()))
        .collect()
}

/// Visible rows as a JSON array
pub fn print_rows_json(session: &BrowseSession) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(&session.visible_rows())?);
    Ok(())
}

/// Every value of a field with its document count
pub fn print_options(session: &BrowseSession, field: &str) {
    let counts = session.table().value_counts(field);
    let mut table = new_table();
    table.set_header(vec![field, "documents"]);
    for (value, count) in counts {
        table.add_row(vec![value.to_string(), count.to_string()]);
    }
    println!("{table}");
}
