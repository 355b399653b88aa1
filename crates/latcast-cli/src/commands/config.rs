//! Configuration management commands

use crate::output::{OutputFormat, OutputFormatter};
use crate::ConfigCommands;
use anyhow::{Context, Result};
use latcast_core::Config;
use serde_json::Value;

/// Handle config commands
pub fn handle_config_command(
    config: &Config,
    action: ConfigCommands,
    output_format: OutputFormat,
) -> Result<()> {
    let formatter = OutputFormatter::new(output_format);

    match action {
        ConfigCommands::Show => {
            let rows = flatten_config(config)?;
            formatter.print_metrics(config, &rows)?;
        }
        ConfigCommands::Validate => {
            config.validate().context("Configuration is invalid")?;
            formatter.print_success("Configuration is valid")?;
        }
    }

    Ok(())
}

/// Dotted `section.key` and value pairs, sorted by key
fn flatten_config(config: &Config) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(config)?;
    let mut rows = Vec::new();
    flatten_value("", &value, &mut rows);
    Ok(rows)
}

fn flatten_value(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_value(&path, child, rows);
            }
        }
        Value::String(s) => rows.push((prefix.to_string(), s.clone())),
        other => rows.push((prefix.to_string(), other.to_string())),
    }
}
