use clap::ValueEnum;
use serde::Serialize;
use sutekh::dto::{KeywordDto, KeywordValuesDto, ParseFilterResponse, SavedFilterDto};
use sutekh::models::{
    AbstractCard, CardDetails, CardSet, CardSetCard, CardSetSummary, Expansion, PhysicalCard,
    PhysicalCardView, Printing, Ruling,
};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not serialise the response: {}", e),
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn number(value: Option<i32>) -> String {
    match value {
        Some(-1) => "X".to_string(),
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

/// Prints rows as left-aligned columns under a header
fn print_table(header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(header.iter().map(|h| h.to_string()).collect());
    for row in rows {
        line(row.clone());
    }
}

/// Prints a list in the specified format
///
/// Quiet human output prints one `id` per line; an empty list prints
/// `empty` unless quiet.
fn print_list<T: Serialize>(
    values: &[T],
    config: &OutputConfig,
    empty: &str,
    header: &[&str],
    id: impl Fn(&T) -> String,
    row: impl Fn(&T) -> Vec<String>,
) {
    match config.format {
        OutputFormat::Human => {
            if values.is_empty() {
                if !config.quiet {
                    println!("{}", empty);
                }
                return;
            }
            if config.quiet {
                for value in values {
                    println!("{}", id(value));
                }
                return;
            }
            let rows: Vec<Vec<String>> = values.iter().map(row).collect();
            print_table(header, &rows);
        }
        OutputFormat::Json => print_json(values),
    }
}

/// Prints a list of cards in the specified format
pub fn print_cards(cards: &[AbstractCard], config: &OutputConfig) {
    print_list(
        cards,
        config,
        "No cards found.",
        &["ID", "NAME", "COST", "CAPACITY", "GROUP"],
        AbstractCard::get_id,
        |card| {
            let cost = match (card.get_cost(), card.get_cost_type()) {
                (Some(cost), Some(cost_type)) => format!("{} {}", number(Some(cost)), cost_type),
                (cost, _) => number(cost),
            };
            vec![
                card.get_id(),
                card.get_name(),
                cost,
                number(card.get_capacity()),
                number(card.get_group()),
            ]
        },
    );
}

/// Prints a single card in the specified format
pub fn print_card(card: &AbstractCard, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", card.get_id());
                return;
            }
            println!("ID:       {}", card.get_id());
            println!("Name:     {}", card.get_name());
            println!("Cost:     {} {}", number(card.get_cost()), or_dash(card.get_cost_type()));
            println!("Capacity: {}", number(card.get_capacity()));
            println!("Group:    {}", number(card.get_group()));
            println!("Life:     {}", number(card.get_life()));
            println!("Level:    {}", or_dash(card.get_level()));
            println!();
            println!("{}", card.get_card_text());
        }
        OutputFormat::Json => print_json(card),
    }
}

/// Prints a card with its vocabulary, rarities and rulings
pub fn print_card_details(details: &CardDetails, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            print_card(&details.card, config);
            if config.quiet {
                return;
            }
            let disciplines: Vec<String> = details
                .disciplines
                .iter()
                .map(|pair| format!("{} ({})", pair.discipline, pair.level))
                .collect();
            let rarities: Vec<String> = details
                .rarities
                .iter()
                .map(|pair| format!("{}:{}", pair.expansion, pair.rarity))
                .collect();
            println!();
            for (label, values) in [
                ("Clans", &details.clans),
                ("Disciplines", &disciplines),
                ("Types", &details.card_types),
                ("Sects", &details.sects),
                ("Titles", &details.titles),
                ("Creeds", &details.creeds),
                ("Virtues", &details.virtues),
                ("Keywords", &details.keywords),
                ("Artists", &details.artists),
                ("Rarities", &rarities),
            ] {
                if !values.is_empty() {
                    println!("{:<12} {}", format!("{}:", label), values.join(", "));
                }
            }
            for ruling in &details.rulings {
                println!("[{}] {}", ruling.get_code(), ruling.get_text());
            }
        }
        OutputFormat::Json => print_json(details),
    }
}

/// Prints a single ruling in the specified format
pub fn print_ruling(ruling: &Ruling, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", ruling.get_id());
                return;
            }
            println!("ID:   {}", ruling.get_id());
            println!("Code: {}", ruling.get_code());
            println!("URL:  {}", or_dash(ruling.get_url()));
            println!("{}", ruling.get_text());
        }
        OutputFormat::Json => print_json(ruling),
    }
}

/// Prints a list of physical cards in the specified format
pub fn print_physical_cards(cards: &[PhysicalCardView], config: &OutputConfig) {
    print_list(
        cards,
        config,
        "No physical cards found.",
        &["ID", "CARD", "EXPANSION", "PRINTING"],
        |card| card.id.clone(),
        |card| {
            vec![
                card.id.clone(),
                card.card_name.clone(),
                or_dash(card.expansion.clone()),
                or_dash(card.printing.clone()),
            ]
        },
    );
}

/// Prints a single physical card in the specified format
pub fn print_physical_card(card: &PhysicalCard, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", card.get_id());
                return;
            }
            println!("ID:       {}", card.get_id());
            println!("Card:     {}", card.get_abstract_card_id());
            println!("Printing: {}", or_dash(card.get_printing_id()));
        }
        OutputFormat::Json => print_json(card),
    }
}

/// Prints a list of expansions in the specified format
pub fn print_expansions(expansions: &[Expansion], config: &OutputConfig) {
    print_list(
        expansions,
        config,
        "No expansions found.",
        &["ID", "NAME", "SHORT"],
        Expansion::get_id,
        |expansion| vec![expansion.get_id(), expansion.get_name(), or_dash(expansion.get_short_name())],
    );
}

/// Prints a single expansion in the specified format
pub fn print_expansion(expansion: &Expansion, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", expansion.get_id());
                return;
            }
            println!("ID:      {}", expansion.get_id());
            println!("Name:    {}", expansion.get_name());
            println!("Short:   {}", or_dash(expansion.get_short_name()));
            println!("Created: {}", expansion.get_created_at());
        }
        OutputFormat::Json => print_json(expansion),
    }
}

/// Prints a list of printings in the specified format
pub fn print_printings(printings: &[Printing], config: &OutputConfig) {
    print_list(
        printings,
        config,
        "No printings found.",
        &["ID", "NAME"],
        Printing::get_id,
        |printing| vec![printing.get_id(), printing.get_name().unwrap_or_else(|| "(standard)".to_string())],
    );
}

/// Prints a single printing in the specified format
pub fn print_printing(printing: &Printing, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", printing.get_id());
                return;
            }
            println!("ID:        {}", printing.get_id());
            println!("Expansion: {}", printing.get_expansion_id());
            println!("Name:      {}", printing.get_name().unwrap_or_else(|| "(standard)".to_string()));
        }
        OutputFormat::Json => print_json(printing),
    }
}

/// Prints a list of card sets in the specified format
pub fn print_card_sets(card_sets: &[CardSet], config: &OutputConfig) {
    print_list(
        card_sets,
        config,
        "No card sets found.",
        &["ID", "NAME", "AUTHOR", "IN USE", "PARENT"],
        CardSet::get_id,
        |set| {
            vec![
                set.get_id(),
                set.get_name(),
                set.get_author(),
                if set.get_in_use() { "yes" } else { "no" }.to_string(),
                or_dash(set.get_parent_id()),
            ]
        },
    );
}

/// Prints a single card set in the specified format
pub fn print_card_set(card_set: &CardSet, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", card_set.get_id());
                return;
            }
            println!("ID:          {}", card_set.get_id());
            println!("Name:        {}", card_set.get_name());
            println!("Author:      {}", card_set.get_author());
            println!("Comment:     {}", card_set.get_comment());
            println!("Annotations: {}", card_set.get_annotations());
            println!("In use:      {}", card_set.get_in_use());
            println!("Parent:      {}", or_dash(card_set.get_parent_id()));
            println!("Updated:     {}", card_set.get_updated_at());
        }
        OutputFormat::Json => print_json(card_set),
    }
}

/// Prints the entries of a card set in the specified format
pub fn print_card_set_cards(cards: &[CardSetCard], config: &OutputConfig) {
    print_list(
        cards,
        config,
        "The card set is empty.",
        &["COUNT", "CARD", "EXPANSION", "PRINTING", "PHYSICAL ID"],
        |card| card.physical_card_id.clone(),
        |card| {
            vec![
                card.card_count.to_string(),
                card.card_name.clone(),
                or_dash(card.expansion.clone()),
                or_dash(card.printing.clone()),
                card.physical_card_id.clone(),
            ]
        },
    );
}

/// Prints the counts of a card set in the specified format
pub fn print_card_set_summary(summary: &CardSetSummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", summary.total);
                return;
            }
            println!("Total:   {}", summary.total);
            println!("Crypt:   {}", summary.crypt);
            println!("Library: {}", summary.library);
        }
        OutputFormat::Json => print_json(summary),
    }
}

/// Prints the result of validating a filter
pub fn print_parsed_filter(parsed: &ParseFilterResponse, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            println!("{}", parsed.filter);
            if config.quiet {
                return;
            }
            if !parsed.variables.is_empty() {
                let names: Vec<String> = parsed.variables.iter().map(|name| format!("${}", name)).collect();
                println!("Unbound: {}", names.join(", "));
            }
            let targets: Vec<String> = parsed.targets.iter().map(|target| target.to_string()).collect();
            if !targets.is_empty() {
                println!("Applies to: {}", targets.join(", "));
            }
        }
        OutputFormat::Json => print_json(parsed),
    }
}

/// Prints the filter keywords in the specified format
pub fn print_keywords(keywords: &[KeywordDto], config: &OutputConfig) {
    print_list(
        keywords,
        config,
        "No keywords.",
        &["KEYWORD", "DESCRIPTION"],
        |keyword| keyword.keyword.clone(),
        |keyword| vec![keyword.keyword.clone(), keyword.description.clone()],
    );
}

/// Prints the values of a filter keyword, one per line
pub fn print_keyword_values(values: &KeywordValuesDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for value in &values.values {
                println!("{}", value);
            }
        }
        OutputFormat::Json => print_json(values),
    }
}

/// Prints the saved filters in the specified format
pub fn print_saved_filters(filters: &[SavedFilterDto], config: &OutputConfig) {
    print_list(
        filters,
        config,
        "No saved filters.",
        &["NAME", "FILTER"],
        |filter| filter.name.clone(),
        |filter| vec![filter.name.clone(), filter.filter.clone()],
    );
}

/// Prints a success message in the specified format
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"status": "ok", "message": message})),
    }
}
