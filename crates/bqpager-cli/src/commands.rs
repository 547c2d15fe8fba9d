use anyhow::{Context, Result, bail};
use bqpager_engine::{NavigationController, UiBridge};
use bqpager_providers::{BigQueryClient, ProjectHint, resolve_credentials_and_project};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::info;

use crate::args::Cli;
use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::logging;
use crate::presentation::spinner::Spinner;
use crate::presentation::tui;

/// Runs one query and pages through its result until the user quits.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level)?;

    let config = Config::load(cli.config.as_deref())?.with_cli(&cli);
    config.validate()?;

    let query = read_query(cli.query_file.as_deref())?;
    echo_query(&query)?;

    let hint = ProjectHint {
        explicit: cli.project.clone(),
        configured: config.project_id.clone(),
    };
    let credentials =
        resolve_credentials_and_project(&hint).context("failed to resolve credentials")?;
    let client = BigQueryClient::new(credentials, config.location.clone())?;
    info!(project = client.project_id(), "submitting query");

    let mut handle = client.submit_query(&query)?;
    let meta = {
        let _spinner = Spinner::start("computing...");
        handle.wait(config.poll_interval())?;
        handle.metadata()?
    };
    info!(
        job = %handle.job().job_id,
        total_rows = meta.total_rows,
        cache_hit = meta.cache_hit,
        "query finished"
    );

    let source = handle.into_row_source(config.null_marker.clone());
    let (sender, bridge) = UiBridge::channel();
    let nav = {
        let _spinner = Spinner::start("rendering...");
        NavigationController::start(Box::new(source), meta, config.pager_options(), sender)?
    };
    info!(
        rows = nav.state().current_page().row_count(),
        "first page loaded"
    );

    let mut clipboard = SystemClipboard;
    tui::run(nav, bridge, config.page_size, &mut clipboard)
}

/// Reads the query text from `path`. An absent or empty file falls back to
/// stdin.
pub fn read_query(path: Option<&Path>) -> Result<String> {
    read_query_with(path, io::stdin().lock())
}

fn read_query_with(path: Option<&Path>, stdin: impl Read) -> Result<String> {
    let mut text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to open query file {}", path.display()))?,
        None => String::new(),
    };
    if text.is_empty() {
        text = read_all(stdin)?;
    }
    if text.trim().is_empty() {
        bail!("query text is empty");
    }
    Ok(text)
}

fn read_all(mut reader: impl Read) -> Result<String> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("failed to read query text")?;
    Ok(text)
}

fn echo_query(query: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", query.trim_end())?;
    stdout.flush()?;
    Ok(())
}
