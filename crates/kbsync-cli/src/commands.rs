//! Subcommand bodies, kept free of argument parsing

use anyhow::{ensure, Context};
use kbsync_api::{HelpdeskClient, HelpdeskTransport, HydrateOptions, HydrateReport, Hydrator};
use kbsync_engine::{write_back, CreateOptions, SyncEngine, SyncReport};
use kbsync_model::{CategoryId, NodeRef, Portal};
use kbsync_preview::{render_preview, PreviewOptions};
use kbsync_sheet::{parse_workbook, CellStore, JsonWorkbookFile, ParseOptions, ParseReport};
use std::path::Path;

/// Parse a local JSON workbook
///
/// A workbook without an ID is named after its file stem, so write-back
/// can address it later.
pub(crate) fn parse_workbook_file(
    path: &Path,
    options: &ParseOptions,
) -> anyhow::Result<ParseReport> {
    let mut workbook = JsonWorkbookFile::new(path)
        .load()
        .with_context(|| format!("failed to read workbook {}", path.display()))?;
    if workbook.id.is_none() {
        workbook.id = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    }
    tracing::info!(sheets = workbook.sheets.len(), "parsing {workbook}");
    Ok(parse_workbook(&workbook, options))
}

/// Categories selected by list index; every category when `indices` is empty
pub(crate) fn select_categories(
    portal: &Portal,
    indices: &[usize],
) -> anyhow::Result<Vec<CategoryId>> {
    let all = portal.category_ids();
    if indices.is_empty() {
        return Ok(all.to_vec());
    }
    indices
        .iter()
        .map(|&i| {
            all.get(i)
                .copied()
                .with_context(|| format!("no category at index {i} ({} in snapshot)", all.len()))
        })
        .collect()
}

/// Resolve `category[/folder[/article]]` list indices to a node
pub(crate) fn resolve_node(portal: &Portal, path: &str) -> anyhow::Result<NodeRef> {
    let indices = path
        .split('/')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .with_context(|| format!("'{part}' in '{path}' is not an index"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    ensure!(indices.len() <= 3, "'{path}' goes deeper than article level");

    let category = *portal
        .category_ids()
        .get(indices[0])
        .with_context(|| format!("no category at index {}", indices[0]))?;
    let Some(&f) = indices.get(1) else {
        return Ok(category.into());
    };
    let folder = portal
        .category(category)
        .and_then(|c| c.folders().get(f).copied())
        .with_context(|| format!("no folder at {path}"))?;
    let Some(&a) = indices.get(2) else {
        return Ok(folder.into());
    };
    let article = portal
        .folder(folder)
        .and_then(|fo| fo.articles().get(a).copied())
        .with_context(|| format!("no article at {path}"))?;
    Ok(article.into())
}

/// Outcome of a push run
#[derive(Debug)]
pub(crate) struct PushSummary {
    pub(crate) report: SyncReport,
    pub(crate) written_back: usize,
}

/// Create the selected categories, then write their IDs back when a store is given
///
/// Failures are collected in the report; the run always visits every
/// selected category.
pub(crate) fn push<T: HelpdeskTransport>(
    engine: &mut SyncEngine<T>,
    portal: &mut Portal,
    categories: &[CategoryId],
    options: &CreateOptions,
    store: Option<&dyn CellStore>,
) -> PushSummary {
    let mut written_back = 0;
    for &id in categories {
        match engine.create_category(portal, id, options) {
            Ok(outcome) => tracing::debug!(?outcome, "category pushed"),
            Err(err) => tracing::debug!("category push failed: {err}"),
        }

        let Some(store) = store else { continue };
        let synced = portal
            .category(id)
            .is_some_and(|c| c.meta.remote_id().is_some());
        if !synced {
            continue;
        }
        match write_back(portal, id.into(), store) {
            Ok(_) => written_back += 1,
            Err(err) => tracing::warn!("write-back skipped: {err}"),
        }
    }
    PushSummary {
        report: engine.take_report(),
        written_back,
    }
}

/// Rebuild a portal from the helpdesk
///
/// Subtrees that could not be read are left out and listed in the report.
pub(crate) fn pull<T: HelpdeskTransport>(
    client: &HelpdeskClient<T>,
    portal_name: &str,
    options: HydrateOptions,
) -> anyhow::Result<HydrateReport> {
    Hydrator::new(client)
        .with_options(options)
        .hydrate(portal_name)
        .context("failed to read the helpdesk tree")
}

/// Render the preview page into `output`
pub(crate) fn write_preview_file(
    portal: &Portal,
    options: &PreviewOptions,
    output: &Path,
) -> anyhow::Result<()> {
    std::fs::write(output, render_preview(portal, options))
        .with_context(|| format!("failed to write {}", output.display()))
}

/// Operator summary of a portal
pub(crate) fn summary(portal: &Portal) -> String {
    let stats = portal.stats();
    format!(
        "{portal}\n\n{} categories, {} folders, {} articles, {} translations; {} synced",
        stats.categories, stats.folders, stats.articles, stats.translations, stats.synced
    )
}
