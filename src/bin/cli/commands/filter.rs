use clap::Subcommand;
use std::collections::HashMap;
use sutekh::dto::ParseFilterDto;

use crate::client::SutekhClient;
use crate::output::{self, OutputConfig};

/// Filter language commands
#[derive(Subcommand, Debug)]
pub enum FilterCommands {
    /// Check a filter expression and print it in canonical form
    Parse {
        /// The filter expression
        expression: String,
        /// Value for a $variable, as name=value; repeat to build a list
        #[clap(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },
    /// List the filter keywords
    Keywords,
    /// List the values a filter keyword accepts
    Values {
        /// The keyword, e.g. Clan
        keyword: String,
    },
    /// List the filters saved in the server configuration
    Saved,
}

/// Groups `name=value` bindings by name
fn group_bindings(vars: &[String]) -> Result<HashMap<String, Vec<String>>, String> {
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    for entry in vars {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid variable binding '{}', expected name=value", entry))?;
        values
            .entry(name.trim().trim_start_matches('$').to_string())
            .or_default()
            .push(value.trim().to_string());
    }
    Ok(values)
}

/// Executes a filter command
pub async fn execute(
    client: &SutekhClient,
    cmd: FilterCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        FilterCommands::Parse { expression, vars } => {
            let dto = ParseFilterDto { filter: expression, variables: group_bindings(&vars)? };
            let parsed = client.parse_filter(&dto).await?;
            output::print_parsed_filter(&parsed, config);
        }
        FilterCommands::Keywords => {
            let keywords = client.list_keywords().await?;
            output::print_keywords(&keywords, config);
        }
        FilterCommands::Values { keyword } => {
            let values = client.keyword_values(&keyword).await?;
            output::print_keyword_values(&values, config);
        }
        FilterCommands::Saved => {
            let filters = client.list_saved_filters().await?;
            output::print_saved_filters(&filters, config);
        }
    }
    Ok(())
}
