use log::{debug, info, warn};

use election_lookup::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::lookup::pages::*;

mod pages;

#[derive(Debug, Snafu)]
pub enum ChunavError {
    #[snafu(display("No data source: pass --data-dir or --base-url"))]
    MissingSource {},
    #[snafu(display("Could not start the runtime"))]
    Runtime { source: std::io::Error },
    #[snafu(display("Could not load the data: {source}"))]
    Load { source: LoadError },
    #[snafu(display("No party with id {id}"))]
    PartyNotFound { id: u32 },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Difference detected between the output and the reference"))]
    ReferenceMismatch {},
}

pub type ChunavResult<T> = Result<T, ChunavError>;

fn loader_config(args: &Args) -> ChunavResult<LoaderConfig> {
    match (&args.data_dir, &args.base_url) {
        (Some(dir), _) => Ok(LoaderConfig::Directory(dir.into())),
        (None, Some(url)) => Ok(LoaderConfig::BaseUrl(url.clone())),
        (None, None) => MissingSourceSnafu {}.fail(),
    }
}

async fn render(cache: &DatasetCache, command: &Command) -> ChunavResult<String> {
    match command {
        Command::Candidates { query } => candidates_page(cache, query, false).await,
        Command::Pr { query } => candidates_page(cache, query, true).await,
        Command::Constituencies { query } => constituencies_page(cache, query).await,
        Command::Party { id } => party_page(cache, *id).await,
        Command::Compare { query } => comparison_page(cache, query).await,
        Command::Badges => to_json(&BADGES),
    }
}

fn write_output(out: &Option<String>, js: &str) -> ChunavResult<()> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => {
            println!("{}", js);
        }
        Some(path) => {
            info!("Writing output to {}", path);
            fs::write(path, js).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

// The reference is compared after pretty-printing both sides the same way.
fn check_reference(reference_path: &str, js: &str) -> ChunavResult<()> {
    let reference_str =
        fs::read_to_string(reference_path).context(OpeningReferenceSnafu {
            path: reference_path,
        })?;
    let reference: serde_json::Value =
        serde_json::from_str(&reference_str).context(ParsingJsonSnafu {})?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    if pretty_reference != js {
        warn!("Found differences with the reference string");
        print_diff(pretty_reference.as_str(), js, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

pub fn run(args: Args) -> ChunavResult<()> {
    let config = loader_config(&args)?;
    debug!("run: args {:?}, config {:?}", args, config);
    let runtime = tokio::runtime::Runtime::new().context(RuntimeSnafu {})?;
    let cache = config.cache();
    let js = runtime.block_on(render(&cache, &args.command))?;

    write_output(&args.out, &js)?;

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &js)?;
    }
    Ok(())
}
