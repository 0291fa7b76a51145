use rolodex_core::{ColumnSpec, Record};

const PLACEHOLDER: &str = "N/A";
const RULE_WIDTH: usize = 40;

/// Renders one `Label: value` line per column, records separated by a rule.
pub fn export_report(records: &[Record], columns: &[&ColumnSpec]) -> String {
    let separator = format!("\n\n{}\n\n", "=".repeat(RULE_WIDTH));
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    let value = record.get(column.id);
                    let value = if value.is_empty() { PLACEHOLDER } else { value };
                    format!("{}: {}", column.label, value)
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join(&separator)
}
