//! Output formatting for the latcast CLI

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use latcast_core::Confidence;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Compact text format
    Text,
}

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format as a table row
    fn table_headers() -> Vec<String>;
    fn table_row(&self) -> Vec<String>;

    /// Format as key-value pairs for detailed view
    fn key_value_pairs(&self) -> Vec<(String, String)>;
}

/// Output formatter
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format and print a list of items
    pub fn print_list<T>(&self, items: &[T]) -> Result<()>
    where
        T: Serialize + Formattable,
    {
        if items.is_empty() {
            match self.format {
                OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
                OutputFormat::Table | OutputFormat::Text => {
                    println!("{}", "No items found".dimmed());
                }
            }
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(items)?),
            OutputFormat::Table => println!("{}", render_table(items)),
            OutputFormat::Text => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    for (key, value) in item.key_value_pairs() {
                        println!("{}: {}", key, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the format is a serialized document rather than a human view
    pub fn is_structured(&self) -> bool {
        matches!(self.format, OutputFormat::Json | OutputFormat::Yaml)
    }

    /// Print a value as JSON or YAML; human formats fall back to pretty JSON
    pub fn print_serialized<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        match self.format {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }

    /// Print a two-column metric table, or the serialized value for structured formats
    pub fn print_metrics<T>(&self, value: &T, rows: &[(String, String)]) -> Result<()>
    where
        T: Serialize,
    {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => self.print_serialized(value)?,
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic);
                table.set_header(vec![
                    Cell::new("Metric").add_attribute(Attribute::Bold).fg(Color::Cyan),
                    Cell::new("Value").add_attribute(Attribute::Bold).fg(Color::Cyan),
                ]);
                for (key, value) in rows {
                    table.add_row(vec![key, value]);
                }
                println!("{}", table);
            }
            OutputFormat::Text => {
                for (key, value) in rows {
                    println!("{}: {}", key, value);
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn print_success(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let result = serde_json::json!({
                    "status": "success",
                    "message": message
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Yaml => {
                println!("status: success");
                println!("message: {}", message);
            }
            OutputFormat::Table | OutputFormat::Text => {
                println!("{} {}", "✓".green().bold(), message.green());
            }
        }
        Ok(())
    }
}

fn render_table<T: Formattable>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = T::table_headers()
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for item in items {
        table.add_row(item.table_row());
    }
    table
}

/// Milliseconds with two decimals
pub fn format_millis(value: f64) -> String {
    format!("{:.2} ms", value)
}

/// Tokens per second with two decimals
pub fn format_rate(value: f64) -> String {
    format!("{:.2} tok/s", value)
}

/// Token counts drop the fraction when it is zero
pub fn format_tokens(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

pub fn colorize_confidence(confidence: Confidence) -> ColoredString {
    let label = confidence.to_string();
    match confidence {
        Confidence::High => label.green(),
        Confidence::Medium => label.yellow(),
        Confidence::Low => label.red(),
    }
}
