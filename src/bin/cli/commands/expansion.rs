use clap::Subcommand;

use crate::client::SutekhClient;
use crate::output::{self, OutputConfig};

/// Expansion commands
#[derive(Subcommand, Debug)]
pub enum ExpansionCommands {
    /// List all expansions
    List,
    /// Show an expansion
    Get {
        /// The expansion ID
        id: String,
    },
    /// Create an expansion
    Create {
        /// The expansion name
        name: String,
        /// Abbreviation used in card lists, e.g. "CE"
        #[clap(long)]
        short_name: Option<String>,
    },
    /// List the printings of an expansion
    Printings {
        /// The expansion ID
        id: String,
    },
    /// Add a named printing to an expansion
    AddPrinting {
        /// The expansion ID
        id: String,
        /// The printing name
        name: String,
    },
}

/// Executes an expansion command
pub async fn execute(
    client: &SutekhClient,
    cmd: ExpansionCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ExpansionCommands::List => {
            let expansions = client.list_expansions().await?;
            output::print_expansions(&expansions, config);
        }
        ExpansionCommands::Get { id } => {
            let expansion = client.get_expansion(&id).await?;
            output::print_expansion(&expansion, config);
        }
        ExpansionCommands::Create { name, short_name } => {
            let expansion = client.create_expansion(name, short_name).await?;
            output::print_expansion(&expansion, config);
        }
        ExpansionCommands::Printings { id } => {
            let printings = client.list_printings(&id).await?;
            output::print_printings(&printings, config);
        }
        ExpansionCommands::AddPrinting { id, name } => {
            let printing = client.create_printing(&id, name).await?;
            output::print_printing(&printing, config);
        }
    }
    Ok(())
}
