//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Snapshot source and config file selection
//! - Subcommands (stats, search, show, icon, browse)
//! - Output format selection (human/JSON)
//! - Verbosity and quiet modes

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::output::DetailSection;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub source: Option<String>,
    pub config: Option<PathBuf>,
    pub json_output: bool,
    pub quiet_mode: bool,
    pub verbose_mode: bool,
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Stats,
    Search { term: String, limit: Option<usize> },
    Show { id: String, section: Option<DetailSection> },
    Icon { id: String, output: PathBuf },
    Browse,
}

pub fn build_command() -> Command {
    Command::new("appdex")
        .version(env!("APPDEX_VERSION"))
        .long_version(concat!(env!("APPDEX_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("Browse a snapshot of installed-application metadata")
        .long_about(
            "Search and inspect a pre-collected snapshot of macOS application metadata: \
             manifests, code signing, sandbox entitlements and scripting dictionaries.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("LOCATION")
                .help("Snapshot URL or local directory (default: current directory)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors and hide the loading indicator")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("stats").about("Show aggregate counts for the catalog"))
        .subcommand(
            Command::new("search")
                .about("Fuzzy search by name, bundle ID or path")
                .arg(
                    Arg::new("term")
                        .value_name("TERM")
                        .help("Search term; omit to list every application")
                        .num_args(0..),
                )
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("N")
                        .help("Show at most N results")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show entitlements, Info.plist, sandbox report and SDEF files for one application")
                .arg(Arg::new("id").value_name("ID").help("Application identifier").required(true))
                .arg(
                    Arg::new("section")
                        .long("section")
                        .value_name("SECTION")
                        .help("Print only one section")
                        .value_parser(DetailSection::NAMES),
                ),
        )
        .subcommand(
            Command::new("icon")
                .about("Download the icon of one application")
                .arg(Arg::new("id").value_name("ID").help("Application identifier").required(true))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("File to write the icon to")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                ),
        )
        .subcommand(Command::new("browse").about("Interactive search and detail browser"))
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    from_matches(&build_command().get_matches())
}

pub fn from_matches(matches: &ArgMatches) -> Result<CliArgs> {
    let command = match matches.subcommand() {
        Some(("stats", _)) => CliCommand::Stats,
        Some(("search", sub)) => {
            let term = sub
                .get_many::<String>("term")
                .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            CliCommand::Search {
                term,
                limit: sub.get_one::<usize>("limit").copied(),
            }
        }
        Some(("show", sub)) => CliCommand::Show {
            id: required(sub, "id")?,
            section: sub
                .get_one::<String>("section")
                .and_then(|name| DetailSection::parse(name)),
        },
        Some(("icon", sub)) => CliCommand::Icon {
            id: required(sub, "id")?,
            output: sub
                .get_one::<PathBuf>("output")
                .cloned()
                .ok_or_else(|| anyhow!("--output is required"))?,
        },
        Some(("browse", _)) => CliCommand::Browse,
        Some((other, _)) => return Err(anyhow!("Unknown command: {}", other)),
        None => return Err(anyhow!("No command given")),
    };

    Ok(CliArgs {
        source: matches.get_one::<String>("source").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        json_output: matches.get_flag("json"),
        quiet_mode: matches.get_flag("quiet"),
        verbose_mode: matches.get_flag("verbose"),
        command,
    })
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow!("Missing argument: {}", name))
}
