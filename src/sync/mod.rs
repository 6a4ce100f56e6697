pub mod lock;
pub mod reconcile;
pub mod sort;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;

use crate::layout::Profile;
use crate::lookup::Lookups;
use crate::model::row::Field;
use crate::sheet::{Grid, Rgb, SheetPatch, SheetStore};
use crate::source::{fetch_tickets, TicketSource};
use lock::RunLock;
use reconcile::{reconcile, ReconcileStats};
use sort::sort_by_created;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    /// False when a ticket page failed and only part of the tickets came back.
    pub fetch_complete: bool,
    pub stats: ReconcileStats,
    pub rows_written: usize,
    pub ranges_cleared: usize,
    pub cells_colored: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tickets ({} updated, {} new, {} dropped); {} rows written, {} ranges cleared",
            self.fetched,
            self.stats.matched,
            self.stats.created,
            self.stats.dropped,
            self.rows_written,
            self.ranges_cleared
        )?;
        if !self.fetch_complete {
            write!(f, " (partial fetch)")?;
        }
        Ok(())
    }
}

/// Everything one profile's sync needs, wired up once per process.
pub struct SyncJob {
    pub profile: &'static Profile,
    pub source: Box<dyn TicketSource>,
    pub store: Box<dyn SheetStore>,
    pub lookups: Lookups,
    pub since: String,
    pub lock_path: PathBuf,
}

impl SyncJob {
    /// One locked fetch → sort → reconcile → write pass.
    pub async fn run(&self) -> Result<SyncReport> {
        let _lock = RunLock::acquire(&self.lock_path)?;
        run_once(
            self.profile,
            self.source.as_ref(),
            self.store.as_ref(),
            &self.lookups,
            &self.since,
        )
        .await
    }

    /// Runs every `every` until Ctrl-C. A failed pass is logged and the next
    /// tick tries again; a pass in progress is allowed to finish.
    pub async fn watch(&self, every: Duration) -> Result<()> {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        tracing::info!(
            profile = self.profile.name,
            every_secs = every.as_secs(),
            "watching for ticket updates"
        );
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match self.run().await {
                        Ok(report) => tracing::info!(profile = self.profile.name, "{report}"),
                        Err(e) => tracing::error!(profile = self.profile.name, "sync failed: {e:#}"),
                    }
                }
                res = &mut shutdown => {
                    res.context("Failed to listen for Ctrl-C")?;
                    tracing::info!("stopping");
                    break;
                }
            }
        }
        Ok(())
    }
}

pub async fn run_once(
    profile: &Profile,
    source: &dyn TicketSource,
    store: &dyn SheetStore,
    lookups: &Lookups,
    since: &str,
) -> Result<SyncReport> {
    let started = chrono::Utc::now();
    let fetched = fetch_tickets(source, since, profile, lookups).await;
    let mut tickets = fetched.tickets;
    sort_by_created(&mut tickets);

    let snapshot = store
        .read_rows()
        .await
        .with_context(|| format!("Failed to read {}", store.describe()))?;
    let reconciled = reconcile(profile.layout, &snapshot, &tickets);
    if !fetched.complete && reconciled.stats.dropped > 0 {
        tracing::warn!(
            profile = profile.name,
            dropped = reconciled.stats.dropped,
            "ticket fetch stopped early; removing {} rows missing from the partial result",
            reconciled.stats.dropped
        );
    }

    let patch = SheetPatch::diff(&snapshot, &reconciled.rows);
    if !patch.is_empty() {
        store
            .apply_patch(&patch)
            .await
            .with_context(|| format!("Failed to write {}", store.describe()))?;
    }

    let mut report = SyncReport {
        fetched: tickets.len(),
        fetch_complete: fetched.complete,
        stats: reconciled.stats,
        rows_written: patch.updates.len(),
        ranges_cleared: patch.clears.len(),
        cells_colored: 0,
    };

    if profile.colors_status() {
        report.cells_colored = color_status_column(profile, store, &reconciled.rows, snapshot.len())
            .await
            .with_context(|| format!("Failed to color {}", store.describe()))?;
    }

    tracing::info!(
        layout_version = profile.layout.version,
        elapsed_ms = (chrono::Utc::now() - started).num_milliseconds(),
        "Updated {} '{}' tickets",
        report.fetched,
        profile.display_name
    );
    Ok(report)
}

/// Background for each data row's status cell. Rows the sheet held before
/// this run but no longer does are cleared as well.
pub fn status_backgrounds(profile: &Profile, rows: &Grid, previous_len: usize) -> Vec<Option<Rgb>> {
    let Some(column) = profile.layout.index_of(Field::Status) else {
        return Vec::new();
    };
    let data_rows = rows.len().saturating_sub(1);
    let span = data_rows.max(previous_len.saturating_sub(1));
    (0..span)
        .map(|i| {
            rows.get(i + 1)
                .and_then(|row| row.get(column))
                .and_then(|label| profile.status_color(label))
                .and_then(Rgb::from_hex)
        })
        .collect()
}

async fn color_status_column(
    profile: &Profile,
    store: &dyn SheetStore,
    rows: &Grid,
    previous_len: usize,
) -> Result<usize> {
    let Some(column) = profile.layout.index_of(Field::Status) else {
        return Ok(0);
    };
    let colors = status_backgrounds(profile, rows, previous_len);
    if colors.is_empty() {
        return Ok(0);
    }
    store.set_backgrounds(column, 1, &colors).await?;
    Ok(colors.iter().filter(|c| c.is_some()).count())
}
