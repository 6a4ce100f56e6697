use std::collections::HashMap;

use crate::layout::{ColumnKind, Layout};
use crate::model::row::TicketRow;
use crate::model::ticket::NormalizedTicket;
use crate::sheet::Grid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub matched: usize,
    pub created: usize,
    /// Snapshot rows with no fetched ticket; they are not carried forward.
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Header first, then one row per fetched ticket in fetched order.
    pub rows: Grid,
    pub stats: ReconcileStats,
}

/// Merges freshly fetched tickets into the sheet snapshot.
///
/// Computed columns always take the ticket's value, manual columns keep the
/// snapshot row's value for the same ticket id (empty for new tickets), and the
/// status column prefers a non-blank manual override.
pub fn reconcile(layout: &Layout, snapshot: &[Vec<String>], fetched: &[NormalizedTicket]) -> Reconciled {
    let header = snapshot.first().map(Vec::as_slice).unwrap_or_default();
    let map = layout.resolve(header);

    let mut existing: HashMap<String, TicketRow> = HashMap::new();
    for cells in snapshot.iter().skip(1) {
        let mut cells = cells.clone();
        if cells.len() < layout.width() {
            cells.resize(layout.width(), String::new());
        }
        let row = layout.decode(&map, &cells);
        let id = row.ticket_id.trim().to_string();
        if id.is_empty() {
            continue;
        }
        // Duplicate ids: the last row wins.
        existing.insert(id, row);
    }

    let mut stats = ReconcileStats::default();
    let mut rows = Vec::with_capacity(fetched.len() + 1);
    rows.push(layout.headers());

    for ticket in fetched {
        let old = existing.get(ticket.id.trim());
        if old.is_some() {
            stats.matched += 1;
        } else {
            stats.created += 1;
        }
        rows.push(layout.encode(&merge_row(layout, ticket, old)));
    }

    let fetched_ids: std::collections::HashSet<&str> =
        fetched.iter().map(|t| t.id.trim()).collect();
    stats.dropped = existing
        .keys()
        .filter(|id| !fetched_ids.contains(id.as_str()))
        .count();

    Reconciled { rows, stats }
}

fn merge_row(layout: &Layout, ticket: &NormalizedTicket, old: Option<&TicketRow>) -> TicketRow {
    let mut row = TicketRow::default();
    for column in layout.columns {
        let value = match column.kind {
            ColumnKind::Computed(source) => source.of(ticket),
            ColumnKind::Manual => old.map(|r| r.get(column.field)).unwrap_or_default(),
            ColumnKind::Status => old
                .and_then(|r| layout.manual_status(r))
                .unwrap_or(ticket.status.as_str()),
        };
        row.set(column.field, value);
    }
    row
}
