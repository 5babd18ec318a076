use clap::Subcommand;
use sutekh::dto::{CreateAbstractCardDto, CreateRulingDto};
use sutekh::models::{DisciplineLevel, DisciplinePair, RarityPair};

use super::FilterArgs;
use crate::client::SutekhClient;
use crate::output::{self, OutputConfig};

/// Card commands
#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// List the cards matching a filter
    List {
        #[clap(flatten)]
        filter: FilterArgs,
    },
    /// Show a card with its vocabulary, rarities and rulings
    Get {
        /// The card ID
        id: String,
    },
    /// Create a card
    Create {
        /// The card name
        name: String,
        /// The card text
        #[clap(long, default_value = "")]
        text: String,
        /// Cost; use -1 for X
        #[clap(long, allow_hyphen_values = true)]
        cost: Option<i32>,
        /// Cost type: blood, pool or conviction
        #[clap(long)]
        cost_type: Option<String>,
        /// Capacity of a vampire
        #[clap(long)]
        capacity: Option<i32>,
        /// Crypt group; use -1 for "any"
        #[clap(long, allow_hyphen_values = true)]
        group: Option<i32>,
        /// Life of an imbued
        #[clap(long)]
        life: Option<i32>,
        /// Level, e.g. "advanced"
        #[clap(long)]
        level: Option<String>,
        /// Clan (repeatable)
        #[clap(long = "clan")]
        clans: Vec<String>,
        /// Discipline as NAME or NAME:superior (repeatable)
        #[clap(long = "discipline", value_parser = parse_discipline)]
        disciplines: Vec<DisciplinePair>,
        /// Card type (repeatable)
        #[clap(long = "type")]
        card_types: Vec<String>,
        /// Sect (repeatable)
        #[clap(long = "sect")]
        sects: Vec<String>,
        /// Title (repeatable)
        #[clap(long = "title")]
        titles: Vec<String>,
        /// Creed (repeatable)
        #[clap(long = "creed")]
        creeds: Vec<String>,
        /// Virtue (repeatable)
        #[clap(long = "virtue")]
        virtues: Vec<String>,
        /// Keyword (repeatable)
        #[clap(long = "keyword")]
        keywords: Vec<String>,
        /// Artist (repeatable)
        #[clap(long = "artist")]
        artists: Vec<String>,
        /// Printing as EXPANSION:RARITY (repeatable)
        #[clap(long = "rarity", value_parser = parse_rarity)]
        rarities: Vec<RarityPair>,
    },
    /// Delete a card
    Delete {
        /// The card ID
        id: String,
    },
    /// Add a ruling to a card
    Ruling {
        /// The card ID
        id: String,
        /// The ruling reference, e.g. "[LSJ 20040518]"
        code: String,
        /// The ruling text
        text: String,
        /// Link to the ruling
        #[clap(long)]
        url: Option<String>,
    },
    /// List the physical cards of a card
    Printings {
        /// The card ID
        id: String,
    },
    /// Get or create the physical card of a card in a printing
    Physical {
        /// The card ID
        id: String,
        /// Expansion name or short name; omit for an unknown printing
        #[clap(long)]
        expansion: Option<String>,
        /// Printing name; omit for the expansion's standard printing
        #[clap(long, requires = "expansion")]
        printing: Option<String>,
    },
    /// List the physical cards matching a filter
    ListPhysical {
        #[clap(flatten)]
        filter: FilterArgs,
    },
}

/// Parses `Dominate` or `Dominate:superior`
fn parse_discipline(value: &str) -> Result<DisciplinePair, String> {
    let (name, level) = match value.rsplit_once(':') {
        Some((name, level)) => (name, level.parse::<DisciplineLevel>()?),
        None => (value, DisciplineLevel::Inferior),
    };
    if name.trim().is_empty() {
        return Err("discipline name is empty".to_string());
    }
    Ok(DisciplinePair { discipline: name.trim().to_string(), level })
}

/// Parses `Jyhad:R`
fn parse_rarity(value: &str) -> Result<RarityPair, String> {
    match value.rsplit_once(':') {
        Some((expansion, rarity)) if !expansion.trim().is_empty() && !rarity.trim().is_empty() => {
            Ok(RarityPair { expansion: expansion.trim().to_string(), rarity: rarity.trim().to_string() })
        }
        _ => Err(format!("expected EXPANSION:RARITY, got '{}'", value)),
    }
}

/// Executes a card command
pub async fn execute(
    client: &SutekhClient,
    cmd: CardCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        CardCommands::List { filter } => {
            let cards = client.list_cards(&filter.into()).await?;
            output::print_cards(&cards, config);
        }
        CardCommands::Get { id } => {
            let details = client.get_card(&id).await?;
            output::print_card_details(&details, config);
        }
        CardCommands::Create {
            name,
            text,
            cost,
            cost_type,
            capacity,
            group,
            life,
            level,
            clans,
            disciplines,
            card_types,
            sects,
            titles,
            creeds,
            virtues,
            keywords,
            artists,
            rarities,
        } => {
            let dto = CreateAbstractCardDto {
                name,
                text,
                group,
                capacity,
                cost,
                cost_type,
                life,
                level,
                clans,
                disciplines,
                card_types,
                sects,
                titles,
                creeds,
                virtues,
                keywords,
                artists,
                rarities,
            };
            let card = client.create_card(&dto).await?;
            output::print_card(&card, config);
        }
        CardCommands::Delete { id } => {
            client.delete_card(&id).await?;
            output::print_success(&format!("Deleted card {}", id), config);
        }
        CardCommands::Ruling { id, code, text, url } => {
            let ruling = client.add_ruling(&id, &CreateRulingDto { text, code, url }).await?;
            output::print_ruling(&ruling, config);
        }
        CardCommands::Printings { id } => {
            let physical_cards = client.list_physical_cards_for_card(&id).await?;
            output::print_physical_cards(&physical_cards, config);
        }
        CardCommands::Physical { id, expansion, printing } => {
            let physical_card = client.get_or_create_physical_card(&id, expansion, printing).await?;
            output::print_physical_card(&physical_card, config);
        }
        CardCommands::ListPhysical { filter } => {
            let physical_cards = client.list_physical_cards(&filter.into()).await?;
            output::print_physical_cards(&physical_cards, config);
        }
    }
    Ok(())
}
