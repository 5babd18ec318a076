use clap::Subcommand;
use sutekh::dto::{CardCountDto, CreateCardSetDto, UpdateCardSetDto};

use super::FilterArgs;
use crate::client::SutekhClient;
use crate::output::{self, OutputConfig};

/// Card set commands
#[derive(Subcommand, Debug)]
pub enum SetCommands {
    /// List the card sets matching a filter
    List {
        #[clap(flatten)]
        filter: FilterArgs,
    },
    /// Show a card set
    Get {
        /// The card set ID
        id: String,
    },
    /// Create a card set
    Create {
        /// The card set name
        name: String,
        /// ID of the set to nest this one under
        #[clap(long)]
        parent: Option<String>,
        #[clap(long, default_value = "")]
        author: String,
        #[clap(long, default_value = "")]
        comment: String,
        #[clap(long, default_value = "")]
        annotations: String,
        /// Mark the set as in use
        #[clap(long)]
        in_use: bool,
    },
    /// Change a card set
    Update {
        /// The card set ID
        id: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        author: Option<String>,
        #[clap(long)]
        comment: Option<String>,
        #[clap(long)]
        annotations: Option<String>,
        /// true or false
        #[clap(long, value_parser = clap::builder::BoolishValueParser::new())]
        in_use: Option<bool>,
        /// ID of the new parent set
        #[clap(long, conflicts_with = "top_level")]
        parent: Option<String>,
        /// Move the set to the top level
        #[clap(long)]
        top_level: bool,
    },
    /// Delete a card set; its children move up to its parent
    Delete {
        /// The card set ID
        id: String,
    },
    /// List the sets nested directly under a card set
    Children {
        /// The card set ID
        id: String,
    },
    /// List the cards in a set, optionally filtered
    Cards {
        /// The card set ID
        id: String,
        #[clap(flatten)]
        filter: FilterArgs,
    },
    /// Add cards to a set
    Add {
        /// The card set ID
        id: String,
        /// Physical card IDs, each optionally followed by :COUNT
        #[clap(required = true, value_parser = parse_card_count)]
        cards: Vec<CardCountDto>,
    },
    /// Remove cards from a set
    Remove {
        /// The card set ID
        id: String,
        /// Physical card IDs, each optionally followed by :COUNT
        #[clap(required = true, value_parser = parse_card_count)]
        cards: Vec<CardCountDto>,
    },
    /// Copy a set, with its cards, under a new name
    Copy {
        /// The card set ID
        id: String,
        /// Name of the copy
        name: String,
    },
    /// Count the crypt and library cards of a set
    Summary {
        /// The card set ID
        id: String,
    },
}

/// Parses `PHYSICAL_ID` or `PHYSICAL_ID:COUNT`
fn parse_card_count(value: &str) -> Result<CardCountDto, String> {
    let (id, count) = match value.rsplit_once(':') {
        Some((id, count)) => {
            let count = count
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("invalid count in '{}'", value))?;
            (id, count)
        }
        None => (value, 1),
    };
    if count < 1 {
        return Err(format!("count must be at least 1 in '{}'", value));
    }
    Ok(CardCountDto { physical_card_id: id.trim().to_string(), count })
}

/// Executes a card set command
pub async fn execute(
    client: &SutekhClient,
    cmd: SetCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        SetCommands::List { filter } => {
            let card_sets = client.list_card_sets(&filter.into()).await?;
            output::print_card_sets(&card_sets, config);
        }
        SetCommands::Get { id } => {
            let card_set = client.get_card_set(&id).await?;
            output::print_card_set(&card_set, config);
        }
        SetCommands::Create { name, parent, author, comment, annotations, in_use } => {
            let dto = CreateCardSetDto { name, parent_id: parent, author, comment, annotations, in_use };
            let card_set = client.create_card_set(&dto).await?;
            output::print_card_set(&card_set, config);
        }
        SetCommands::Update { id, name, author, comment, annotations, in_use, parent, top_level } => {
            let parent_id = if top_level { Some(None) } else { parent.map(Some) };
            let dto = UpdateCardSetDto { name, author, comment, annotations, in_use, parent_id };
            let card_set = client.update_card_set(&id, &dto).await?;
            output::print_card_set(&card_set, config);
        }
        SetCommands::Delete { id } => {
            client.delete_card_set(&id).await?;
            output::print_success(&format!("Deleted card set {}", id), config);
        }
        SetCommands::Children { id } => {
            let children = client.list_child_card_sets(&id).await?;
            output::print_card_sets(&children, config);
        }
        SetCommands::Cards { id, filter } => {
            let cards = client.list_card_set_cards(&id, &filter.into()).await?;
            output::print_card_set_cards(&cards, config);
        }
        SetCommands::Add { id, cards } => {
            let cards = client.add_card_set_cards(&id, cards).await?;
            output::print_card_set_cards(&cards, config);
        }
        SetCommands::Remove { id, cards } => {
            let cards = client.remove_card_set_cards(&id, cards).await?;
            output::print_card_set_cards(&cards, config);
        }
        SetCommands::Copy { id, name } => {
            let copy = client.copy_card_set(&id, name).await?;
            output::print_card_set(&copy, config);
        }
        SetCommands::Summary { id } => {
            let summary = client.card_set_summary(&id).await?;
            output::print_card_set_summary(&summary, config);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card_count() {
        assert_eq!(
            parse_card_count("abc").unwrap(),
            CardCountDto { physical_card_id: "abc".to_string(), count: 1 }
        );
        assert_eq!(parse_card_count("abc:3").unwrap().count, 3);
        assert!(parse_card_count("abc:0").is_err());
        assert!(parse_card_count("abc:many").is_err());
    }
}
