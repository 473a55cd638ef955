use clap::{Parser, Subcommand};

/// Lookup of election candidates, constituencies and parties.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory) The directory containing the dataset files (`<name>.json`).
    #[clap(short, long, value_parser, conflicts_with = "base_url")]
    pub data_dir: Option<String>,

    /// (url) The site serving the datasets as `/data/<name>.json`.
    #[clap(short, long, value_parser)]
    pub base_url: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the output will be written in JSON format to the given
    /// location. By default it is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected output in JSON format. If provided, chunav will
    /// check that the output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The candidate page. The `tab` parameter selects the FPTP or the PR list.
    Candidates {
        /// (query string) The filters, e.g. `state=1&badges=educated,loyal`.
        #[clap(short, long, value_parser, default_value = "")]
        query: String,
    },
    /// The proportional representation lists, whatever the `tab` parameter says.
    Pr {
        #[clap(short, long, value_parser, default_value = "")]
        query: String,
    },
    /// The constituency page. Geography is given by name, e.g. `state=कोशी प्रदेश&constituency=3`.
    Constituencies {
        #[clap(short, long, value_parser, default_value = "")]
        query: String,
    },
    /// The profile of one party.
    Party {
        /// The party id.
        #[clap(long, value_parser)]
        id: u32,
    },
    /// Two parties side by side: `party1=<id>&party2=<id>`.
    Compare {
        #[clap(short, long, value_parser)]
        query: String,
    },
    /// The list of all the badges.
    Badges,
}
