pub mod freshdesk;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::layout::Profile;
use crate::lookup::Lookups;
use crate::model::ticket::{Conversation, NormalizedTicket, RawTicket};
use crate::util::text::preview;

#[async_trait]
pub trait TicketSource: Send + Sync {
    fn name(&self) -> &str;
    /// One page (1-based) of tickets updated since `since`. An empty page means
    /// there is nothing further.
    async fn fetch_page(&self, since: &str, page: u32) -> Result<Vec<RawTicket>>;
    async fn fetch_conversations(&self, ticket_id: u64) -> Result<Vec<Conversation>>;
}

#[cfg(test)]
pub mod tests;

pub fn create_source(config: &AppConfig) -> Option<Box<dyn TicketSource>> {
    config.freshdesk.as_ref().map(|cfg| {
        Box::new(freshdesk::FreshdeskSource::new(&cfg.domain, &cfg.api_key))
            as Box<dyn TicketSource>
    })
}

/// Tickets from one walk over the API. `complete` is false when a page failed
/// and the walk stopped early.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub tickets: Vec<T>,
    pub complete: bool,
}

/// Pages through everything updated since `since`, keeping the profile's tickets.
///
/// A failing page ends the walk; whatever was collected before it is returned.
pub async fn fetch_all_since(
    source: &dyn TicketSource,
    since: &str,
    profile: &Profile,
) -> Fetched<RawTicket> {
    let mut tickets = Vec::new();
    let mut complete = true;
    let mut page = 1;

    loop {
        let batch = match source.fetch_page(since, page).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(source = source.name(), page, "Error fetching tickets: {e:#}");
                complete = false;
                break;
            }
        };
        if batch.is_empty() {
            break;
        }

        let fetched = batch.len();
        let before = tickets.len();
        tickets.extend(
            batch
                .into_iter()
                .filter(|t| profile.matches_client(t.client_tag())),
        );
        tracing::debug!(page, fetched, kept = tickets.len() - before, "fetched ticket page");
        page += 1;
    }

    Fetched { tickets, complete }
}

/// Preview of the most recent conversation entry; "" when there is none or the
/// fetch fails.
pub async fn last_response_preview(source: &dyn TicketSource, ticket_id: u64) -> String {
    match source.fetch_conversations(ticket_id).await {
        Ok(conversations) => conversations
            .last()
            .and_then(|c| c.body_text.as_deref())
            .map(preview)
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!(ticket_id, "Error fetching conversation: {e:#}");
            String::new()
        }
    }
}

/// Fetches, filters and normalizes the profile's tickets, one request at a time.
pub async fn fetch_tickets(
    source: &dyn TicketSource,
    since: &str,
    profile: &Profile,
    lookups: &Lookups,
) -> Fetched<NormalizedTicket> {
    let raw = fetch_all_since(source, since, profile).await;
    let mut tickets = Vec::with_capacity(raw.tickets.len());
    for ticket in &raw.tickets {
        let mut normalized = NormalizedTicket::from_raw(ticket, lookups);
        if profile.fetch_last_response {
            normalized = normalized.with_last_response(last_response_preview(source, ticket.id).await);
        }
        tickets.push(normalized);
    }
    Fetched {
        tickets,
        complete: raw.complete,
    }
}
