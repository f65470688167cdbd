//! Detail resolution module
//!
//! Handles:
//! - Fetching an application's entitlements, Info.plist and sandbox report
//!   together with its SDEF index
//! - Fanning out over every SDEF file the index lists
//! - Substituting placeholders so a bundle is always complete
//! - Committing results to the selection slot only while still current

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::constants::NOT_AVAILABLE;
use crate::fetch::{fetch_json, join_successes, locator, FetchError, ResourceFetcher};
use crate::models::{DetailBundle, Manifest, SdefFile, SdefIndex};

pub mod selection;

pub use selection::{Selection, SelectionSlot, SelectionTicket};

/// Resolution stopped before any content could be assembled
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("snapshot source unreachable: {0}")]
    Unreachable(#[source] FetchError),
    #[error("malformed SDEF index: {0}")]
    MalformedSdefIndex(#[source] FetchError),
}

/// Fetch everything shown for `app`.
///
/// Never fails: missing resources become "Not available", while an
/// unreachable source or an unparseable SDEF index yields the
/// "Error loading ..." bundle.
pub async fn resolve_details<F>(fetcher: &F, app: Manifest) -> DetailBundle
where
    F: ResourceFetcher + ?Sized,
{
    match try_resolve(fetcher, &app.id).await {
        Ok(parts) => DetailBundle {
            app,
            entitlements: parts.entitlements,
            info_plist: parts.info_plist,
            sandbox_report: parts.sandbox_report,
            sdef_files: parts.sdef_files,
        },
        Err(err) => {
            log::error!("Error loading app details for {}: {}", app.id, err);
            DetailBundle::unavailable(app)
        }
    }
}

/// Resolve `app` and store the result in `slot` unless a newer selection
/// (or a close) happened meanwhile. Returns whether the result was committed.
pub async fn select<F>(fetcher: &F, slot: &SelectionSlot, app: Manifest) -> bool
where
    F: ResourceFetcher + ?Sized,
{
    let ticket = slot.begin(&app.id);
    let bundle = resolve_details(fetcher, app).await;
    slot.commit(&ticket, bundle)
}

/// Like [`select`], but resolves on a background task so the caller keeps
/// handling input
pub fn spawn_select(
    fetcher: Arc<dyn ResourceFetcher>,
    slot: SelectionSlot,
    app: Manifest,
) -> (SelectionTicket, JoinHandle<bool>) {
    let ticket = slot.begin(&app.id);
    let task_ticket = ticket.clone();
    let handle = tokio::spawn(async move {
        let bundle = resolve_details(fetcher.as_ref(), app).await;
        slot.commit(&task_ticket, bundle)
    });
    (ticket, handle)
}

struct ResolvedParts {
    entitlements: String,
    info_plist: String,
    sandbox_report: String,
    sdef_files: Vec<SdefFile>,
}

async fn try_resolve<F>(fetcher: &F, id: &str) -> Result<ResolvedParts, ResolveError>
where
    F: ResourceFetcher + ?Sized,
{
    let (entitlements, info_plist, sandbox_report, sdef_index) = futures::join!(
        fetch_text_at(fetcher, locator::entitlements(id)),
        fetch_text_at(fetcher, locator::info_plist(id)),
        fetch_text_at(fetcher, locator::sandbox_report(id)),
        fetch_sdef_index(fetcher, id),
    );

    let entitlements = text_or_placeholder(entitlements)?;
    let info_plist = text_or_placeholder(info_plist)?;
    let sandbox_report = text_or_placeholder(sandbox_report)?;

    let sdef_files = match sdef_index {
        Ok(index) => fetch_sdef_files(fetcher, id, &index.files).await,
        Err(err) if err.is_transport() => return Err(ResolveError::Unreachable(err)),
        Err(err @ FetchError::Parse { .. }) => return Err(ResolveError::MalformedSdefIndex(err)),
        Err(err) => {
            log::debug!("No SDEF index for {}: {}", id, err);
            Vec::new()
        }
    };

    Ok(ResolvedParts {
        entitlements,
        info_plist,
        sandbox_report,
        sdef_files,
    })
}

async fn fetch_text_at<F>(fetcher: &F, locator: Result<String, FetchError>) -> Result<String, FetchError>
where
    F: ResourceFetcher + ?Sized,
{
    fetcher.fetch_text(&locator?).await
}

async fn fetch_sdef_index<F>(fetcher: &F, id: &str) -> Result<SdefIndex, FetchError>
where
    F: ResourceFetcher + ?Sized,
{
    fetch_json(fetcher, &locator::sdef_index(id)?).await
}

fn text_or_placeholder(result: Result<String, FetchError>) -> Result<String, ResolveError> {
    match result {
        Ok(text) => Ok(text),
        Err(err) if err.is_transport() => Err(ResolveError::Unreachable(err)),
        Err(err) => {
            log::debug!("{}", err);
            Ok(NOT_AVAILABLE.to_string())
        }
    }
}

async fn fetch_sdef_files<F>(fetcher: &F, id: &str, files: &[String]) -> Vec<SdefFile>
where
    F: ResourceFetcher + ?Sized,
{
    let tasks = files.iter().map(|name| {
        let task = async move {
            let locator = locator::sdef_file(id, name)?;
            fetcher.fetch_text(&locator).await
        };
        (name.clone(), task)
    });

    join_successes(tasks)
        .await
        .into_iter()
        .map(|(name, content)| SdefFile { name, content })
        .collect()
}
