#![forbid(unsafe_code)]

use anyhow::{bail, Context, Result};
use std::io::IsTerminal;
use std::process::ExitCode;

use appdex::browse::{self, BrowseOptions};
use appdex::catalog::LoadError;
use appdex::cli::{self, CliArgs, CliCommand};
use appdex::config::BrowserConfiguration;
use appdex::fetch::{self, Source};
use appdex::logging;
use appdex::output::{self, DetailOutput, DetailSection, LoadingIndicator, SearchOutput};
use appdex::session::BrowseSession;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<LoadError>() {
                Some(load_err) => eprintln!("{}", output::format_load_error(load_err)),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = cli::parse_args()?;

    let config = BrowserConfiguration::load(args.config.as_deref())?;
    let level = logging::effective_level(config.log_level()?, args.quiet_mode, args.verbose_mode);
    logging::init_logging(level, config.logging.backend)?;

    let source = match &args.source {
        Some(location) => Source::parse(location),
        None => config.source(),
    };
    let fetcher = fetch::connect(&source, &config.http_options())?;

    let mut indicator = LoadingIndicator::new("Loading application data...", args.quiet_mode);
    indicator.start();
    let loaded = BrowseSession::load(fetcher).await;
    match &loaded {
        Ok(session) => indicator.complete(&format!("Loaded {} applications", session.catalog().len())),
        Err(_) => indicator.finish(),
    }
    let mut session = loaded?;

    match &args.command {
        CliCommand::Stats => print_stats(&session, &args),
        CliCommand::Search { term, limit } => print_search(&mut session, &args, term, *limit),
        CliCommand::Show { id, section } => show_details(&session, &args, id, *section).await,
        CliCommand::Icon { id, output } => write_icon(&session, &args, id, output).await,
        CliCommand::Browse => {
            let options = BrowseOptions {
                json_output: args.json_output,
                prompt: !args.json_output && std::io::stdin().is_terminal(),
            };
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            browse::run(&mut session, input, &mut std::io::stdout(), options).await
        }
    }
}

fn print_stats(session: &BrowseSession, args: &CliArgs) -> Result<()> {
    let stats = session.stats();
    if args.json_output {
        println!("{}", output::to_json(&stats)?);
    } else {
        print!("{}", output::format_stats(&stats));
    }
    Ok(())
}

fn print_search(session: &mut BrowseSession, args: &CliArgs, term: &str, limit: Option<usize>) -> Result<()> {
    session.set_query(term);
    let results = session.results();
    let total = results.len();
    let shown: Vec<_> = results.into_iter().take(limit.unwrap_or(usize::MAX)).collect();

    if args.json_output {
        let payload = SearchOutput {
            query: session.query(),
            total,
            results: shown,
        };
        println!("{}", output::to_json(&payload)?);
    } else {
        print!("{}", output::format_results(term, &shown));
        if total > shown.len() {
            println!("... and {} more", total - shown.len());
        }
    }
    Ok(())
}

async fn show_details(
    session: &BrowseSession,
    args: &CliArgs,
    id: &str,
    section: Option<DetailSection>,
) -> Result<()> {
    session
        .open(id)
        .await
        .with_context(|| format!("No application with ID \"{}\"", id))?;

    let selection = session.selection().current();
    let bundle = selection
        .bundle()
        .with_context(|| format!("Details for {} were superseded", id))?;

    if args.json_output {
        println!("{}", output::to_json(&DetailOutput::new(bundle))?);
    } else {
        print!("{}", output::format_detail(bundle, section));
    }
    Ok(())
}

async fn write_icon(session: &BrowseSession, args: &CliArgs, id: &str, path: &std::path::Path) -> Result<()> {
    let app = session
        .find(id)
        .with_context(|| format!("No application with ID \"{}\"", id))?;

    let Some(bytes) = session
        .icon(app)
        .await
        .with_context(|| format!("Failed to fetch icon for {}", id))?
    else {
        bail!("{} has no icon", id);
    };

    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("Failed to write icon to {}", path.display()))?;

    if args.json_output {
        let payload = serde_json::json!({
            "id": id,
            "path": path.display().to_string(),
            "bytes": bytes.len(),
        });
        println!("{}", output::to_json(&payload)?);
    } else {
        println!("Wrote {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}
