pub mod card;
pub mod expansion;
pub mod filter;
pub mod set;

use clap::Args;
use sutekh::dto::FilterQueryDto;

/// Filter options shared by the listing commands
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// A filter expression, e.g. 'Clan in Ventrue AND Crypt'
    #[clap(long, short = 'f')]
    pub filter: Option<String>,
    /// Name of a filter saved in the server configuration
    #[clap(long)]
    pub saved: Option<String>,
    /// Value for a $variable, as name=value; repeat to build a list
    #[clap(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,
}

impl From<FilterArgs> for FilterQueryDto {
    fn from(args: FilterArgs) -> Self {
        FilterQueryDto { filter: args.filter, saved: args.saved, var: args.vars }
    }
}
