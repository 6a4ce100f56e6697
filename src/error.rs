use std::path::PathBuf;

use thiserror::Error;

/// Typed failures of a sync run. Ticket API errors are logged by the fetcher
/// and degrade to partial data; the rest abort the run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("unknown client profile '{0}' (try `ticketsync profiles`)")]
    UnknownProfile(String),
    #[error("another run (pid {pid}) holds {}", path.display())]
    RunInProgress { pid: u32, path: PathBuf },
    #[error("spreadsheet API returned {status}: {body}")]
    SheetApi { status: u16, body: String },
    #[error("ticket API returned {status}: {body}")]
    TicketApi { status: u16, body: String },
}
