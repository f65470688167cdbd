//! Interactive browser
//!
//! Line-oriented: plain text replaces the search query, `:`-prefixed lines
//! are commands. Detail resolution runs on background tasks so typing keeps
//! working while an entry loads; whichever selection was made last is the
//! one that gets printed.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::detail::SelectionTicket;
use crate::output::{self, DetailOutput, SearchOutput};
use crate::session::BrowseSession;

/// Results printed per query before the list is cut short
const PAGE_SIZE: usize = 20;

const HELP: &str = "\
Type text to search by name, bundle ID or path (empty line lists everything).
Commands:
  :open <ID>   load entitlements, Info.plist, sandbox report and SDEF files
  :close       close the open application
  :stats       show catalog statistics
  :reload      fetch the snapshot again
  :help        show this help
  :quit        exit
";

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowseOptions {
    pub json_output: bool,
    /// Print a prompt before each line (interactive terminals only)
    pub prompt: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Query(&'a str),
    Open(&'a str),
    Close,
    Stats,
    Reload,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line);
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match name {
        "open" | "o" if !rest.is_empty() => Input::Open(rest),
        "close" | "c" => Input::Close,
        "stats" => Input::Stats,
        "reload" => Input::Reload,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Unknown(line),
    }
}

/// Run the browser until `:quit` or end of input.
///
/// A failed `:reload` ends the session with the load error; nothing from the
/// previous catalog is shown after that.
pub async fn run<R, W>(session: &mut BrowseSession, input: R, out: &mut W, options: BrowseOptions) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(SelectionTicket, bool)>();
    let mut pending = 0usize;
    let mut input_done = false;

    show_results(session, out, options)?;
    prompt(out, options)?;

    while !input_done || pending > 0 {
        tokio::select! {
            line = lines.next_line(), if !input_done => {
                let Some(line) = line? else {
                    input_done = true;
                    continue;
                };

                match parse_input(&line) {
                    Input::Query(term) => {
                        session.set_query(term);
                        show_results(session, out, options)?;
                    }
                    Input::Open(id) => match session.open_in_background(id) {
                        Some((ticket, handle)) => {
                            writeln!(out, "Loading {}...", id)?;
                            pending += 1;
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let committed = handle.await.unwrap_or(false);
                                let _ = done_tx.send((ticket, committed));
                            });
                        }
                        None => writeln!(out, "No application with ID \"{}\"", id)?,
                    },
                    Input::Close => {
                        session.close();
                        writeln!(out, "Closed.")?;
                    }
                    Input::Stats => show_stats(session, out, options)?,
                    Input::Reload => {
                        session.reload().await?;
                        writeln!(out, "Reloaded {} applications.", session.catalog().len())?;
                        show_results(session, out, options)?;
                    }
                    Input::Help => write!(out, "{}", HELP)?,
                    Input::Quit => break,
                    Input::Unknown(text) => writeln!(out, "Unknown command: {} (try :help)", text)?,
                }
                prompt(out, options)?;
            }
            Some((ticket, committed)) = done_rx.recv() => {
                pending = pending.saturating_sub(1);
                if !committed || !session.selection().is_current(&ticket) {
                    log::debug!("Dropping superseded details for {}", ticket.app_id());
                    continue;
                }
                if let Some(bundle) = session.selection().current().bundle() {
                    if options.json_output {
                        writeln!(out, "{}", output::to_json(&DetailOutput::new(bundle))?)?;
                    } else {
                        write!(out, "{}", output::format_detail(bundle, None))?;
                    }
                }
                prompt(out, options)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn show_results<W: Write>(session: &BrowseSession, out: &mut W, options: BrowseOptions) -> Result<()> {
    let results = session.results();
    if options.json_output {
        let payload = SearchOutput {
            query: session.query(),
            total: results.len(),
            results: results.iter().take(PAGE_SIZE).copied().collect(),
        };
        writeln!(out, "{}", output::to_json(&payload)?)?;
        return Ok(());
    }

    let shown: Vec<_> = results.iter().take(PAGE_SIZE).copied().collect();
    write!(out, "{}", output::format_results(session.query(), &shown))?;
    if results.len() > shown.len() {
        writeln!(out, "... and {} more (refine the search to narrow it down)", results.len() - shown.len())?;
    }
    Ok(())
}

fn show_stats<W: Write>(session: &BrowseSession, out: &mut W, options: BrowseOptions) -> Result<()> {
    let stats = session.stats();
    if options.json_output {
        writeln!(out, "{}", output::to_json(&stats)?)?;
    } else {
        write!(out, "{}", output::format_stats(&stats))?;
    }
    Ok(())
}

fn prompt<W: Write>(out: &mut W, options: BrowseOptions) -> Result<()> {
    if options.prompt {
        write!(out, "appdex> ")?;
        out.flush()?;
    }
    Ok(())
}
