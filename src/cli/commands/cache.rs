//! Cache command - inspect or clear cached results

use crate::cache::{CacheStore, CachedFile, FreshnessPolicy};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::VolbyResult;
use crate::model::unix_now;
use crate::ui::{self, UiContext};
use chrono::DateTime;
use console::style;
use std::time::Duration;

/// Execute the cache command
pub fn execute(args: CacheArgs, config: &Config) -> VolbyResult<()> {
    let store = CacheStore::new(ConfigManager::cache_dir(config));
    let policy = FreshnessPolicy::new(
        Duration::from_secs(config.cache.partial_interval_secs),
        Duration::from_secs(config.cache.final_interval_secs),
    );

    match args.action {
        CacheAction::Path => {
            println!("{}", store.dir().display());
            Ok(())
        }
        CacheAction::List { format } => list_snapshots(&store, &policy, format),
        CacheAction::Clear { yes } => clear_snapshots(&store, yes),
    }
}

fn format_timestamp(secs: f64) -> String {
    DateTime::from_timestamp(secs.floor() as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn file_name(file: &CachedFile) -> String {
    file.path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Freshness label for a listed snapshot
fn state_label(file: &CachedFile, policy: &FreshnessPolicy, now: f64) -> &'static str {
    match &file.entry {
        None => "unreadable",
        Some(entry) if policy.is_stale(entry, now) => "stale",
        Some(_) => "fresh",
    }
}

fn list_snapshots(
    store: &CacheStore,
    policy: &FreshnessPolicy,
    format: OutputFormat,
) -> VolbyResult<()> {
    let files = store.list()?;
    let now = unix_now();

    if files.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No cached results in {}", store.dir().display()),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&files, policy, now),
        OutputFormat::Json => print_json(&files, policy, now)?,
        OutputFormat::Plain => {
            for file in &files {
                println!("{}", file.path.display());
            }
        }
    }
    Ok(())
}

fn print_table(files: &[CachedFile], policy: &FreshnessPolicy, now: f64) {
    println!(
        "{:<22} {:<6} {:<5} {:<20} {:<11} {:<24}",
        style("FILE").bold(),
        style("YEAR").bold(),
        style("LANG").bold(),
        style("CHECKED").bold(),
        style("STATE").bold(),
        style("ETAG").bold()
    );
    println!("{}", "-".repeat(92));

    for file in files {
        let state = match state_label(file, policy, now) {
            "fresh" => style("fresh").green(),
            "stale" => style("stale").yellow(),
            other => style(other).red(),
        };
        match &file.entry {
            Some(entry) => println!(
                "{:<22} {:<6} {:<5} {:<20} {:<11} {:<24}",
                file_name(file),
                entry.data.metadata.year,
                entry.data.metadata.lang,
                format_timestamp(entry.checked_at),
                state,
                entry.etag.as_deref().unwrap_or("-")
            ),
            None => println!(
                "{:<22} {:<6} {:<5} {:<20} {:<11} {:<24}",
                file_name(file),
                "-",
                "-",
                "-",
                state,
                "-"
            ),
        }
    }

    println!();
    println!("Total: {} snapshot(s)", files.len());
}

fn print_json(files: &[CachedFile], policy: &FreshnessPolicy, now: f64) -> VolbyResult<()> {
    #[derive(serde::Serialize)]
    struct SnapshotJson {
        path: String,
        size: u64,
        state: &'static str,
        year: Option<i32>,
        lang: Option<String>,
        checked_at: Option<f64>,
        etag: Option<String>,
        is_final: Option<bool>,
    }

    let snapshots: Vec<SnapshotJson> = files
        .iter()
        .map(|file| SnapshotJson {
            path: file.path.display().to_string(),
            size: file.size,
            state: state_label(file, policy, now),
            year: file.entry.as_ref().map(|e| e.data.metadata.year),
            lang: file.entry.as_ref().map(|e| e.data.metadata.lang.clone()),
            checked_at: file.entry.as_ref().map(|e| e.checked_at),
            etag: file.entry.as_ref().and_then(|e| e.etag.clone()),
            is_final: file.entry.as_ref().map(|e| e.data.summary.is_final()),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&snapshots)?);
    Ok(())
}

fn clear_snapshots(store: &CacheStore, yes: bool) -> VolbyResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let files = store.list()?;

    if files.is_empty() {
        println!("No cached results to clear.");
        return Ok(());
    }

    println!("This will remove {} snapshot(s):", files.len());
    for file in &files {
        println!("  {} {}", style("•").red(), file_name(file));
    }
    println!();

    if !ui::confirm(&ctx, "Remove cached results?", false)? {
        ui::step_warn_hint(&ctx, "Aborted", "Pass --yes to clear without prompting");
        return Ok(());
    }

    let removed = store.clear()?;
    ui::outro_success(&ctx, &format!("Cleared {} snapshot(s)", removed));
    Ok(())
}
