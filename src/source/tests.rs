use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use super::{fetch_all_since, fetch_tickets, last_response_preview, TicketSource};
use crate::layout::{LANDT, SEINDIA};
use crate::lookup::Lookups;
use crate::model::ticket::{Conversation, CustomFields, RawTicket};

/// A scripted source that serves fixed pages and records which pages were asked for.
struct MockSource {
    pages: Vec<Result<Vec<RawTicket>, String>>,
    conversations: HashMap<u64, Result<Vec<Conversation>, String>>,
    requested_pages: Arc<Mutex<Vec<u32>>>,
    conversation_calls: Arc<Mutex<Vec<u64>>>,
}

impl MockSource {
    fn new(pages: Vec<Result<Vec<RawTicket>, String>>) -> Self {
        Self {
            pages,
            conversations: HashMap::new(),
            requested_pages: Arc::new(Mutex::new(Vec::new())),
            conversation_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_conversation(mut self, id: u64, bodies: &[&str]) -> Self {
        let convs = bodies
            .iter()
            .map(|b| Conversation {
                body_text: Some(b.to_string()),
            })
            .collect();
        self.conversations.insert(id, Ok(convs));
        self
    }

    fn with_conversation_failure(mut self, id: u64) -> Self {
        self.conversations.insert(id, Err("HTTP 500".into()));
        self
    }
}

#[async_trait]
impl TicketSource for MockSource {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn fetch_page(&self, _since: &str, page: u32) -> Result<Vec<RawTicket>> {
        self.requested_pages.lock().unwrap().push(page);
        match self.pages.get(page as usize - 1) {
            Some(Ok(tickets)) => Ok(tickets.clone()),
            Some(Err(msg)) => anyhow::bail!("{msg}"),
            None => Ok(vec![]),
        }
    }

    async fn fetch_conversations(&self, ticket_id: u64) -> Result<Vec<Conversation>> {
        self.conversation_calls.lock().unwrap().push(ticket_id);
        match self.conversations.get(&ticket_id) {
            Some(Ok(convs)) => Ok(convs.clone()),
            Some(Err(msg)) => anyhow::bail!("{msg}"),
            None => Ok(vec![]),
        }
    }
}

fn ticket(id: u64, client: Option<&str>) -> RawTicket {
    RawTicket {
        id,
        subject: Some(format!("Ticket {id}")),
        status: Some(2),
        created_at: Some("2025-01-10T08:00:00Z".into()),
        custom_fields: Some(CustomFields {
            cf_client: client.map(String::from),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn ids(tickets: &[RawTicket]) -> Vec<u64> {
    tickets.iter().map(|t| t.id).collect()
}

#[tokio::test]
async fn pages_until_empty_page() {
    let source = MockSource::new(vec![
        Ok(vec![ticket(1, Some("seindia")), ticket(2, Some("seindia"))]),
        Ok(vec![ticket(3, Some("SEIndia "))]),
        Ok(vec![]),
    ]);
    let requested = source.requested_pages.clone();

    let fetched = fetch_all_since(&source, "2025-01-01T00:00:00Z", &SEINDIA).await;

    assert_eq!(ids(&fetched.tickets), vec![1, 2, 3]);
    assert!(fetched.complete);
    assert_eq!(requested.lock().unwrap().as_slice(), &[1, 2, 3]);
}

#[tokio::test]
async fn filters_by_client_tag() {
    let source = MockSource::new(vec![Ok(vec![
        ticket(1, Some("seindia")),
        ticket(2, Some("L & T")),
        ticket(3, None),
        ticket(4, Some(" l & t ")),
    ])]);

    let landt = fetch_all_since(&source, "2025-01-01T00:00:00Z", &LANDT).await;
    assert_eq!(ids(&landt.tickets), vec![2, 4]);

    let seindia = fetch_all_since(&source, "2025-01-01T00:00:00Z", &SEINDIA).await;
    assert_eq!(ids(&seindia.tickets), vec![1]);
}

#[tokio::test]
async fn page_error_stops_with_partial_result() {
    let source = MockSource::new(vec![
        Ok(vec![ticket(1, Some("seindia"))]),
        Err("429 Too Many Requests".into()),
        Ok(vec![ticket(3, Some("seindia"))]),
    ]);
    let requested = source.requested_pages.clone();

    let fetched = fetch_all_since(&source, "2025-01-01T00:00:00Z", &SEINDIA).await;

    assert_eq!(ids(&fetched.tickets), vec![1]);
    assert!(!fetched.complete);
    assert_eq!(requested.lock().unwrap().as_slice(), &[1, 2]);
}

#[tokio::test]
async fn page_without_matches_does_not_stop_paging() {
    let source = MockSource::new(vec![
        Ok(vec![ticket(1, Some("other"))]),
        Ok(vec![ticket(2, Some("seindia"))]),
    ]);

    let fetched = fetch_all_since(&source, "2025-01-01T00:00:00Z", &SEINDIA).await;
    assert_eq!(ids(&fetched.tickets), vec![2]);
    assert!(fetched.complete);
}

#[tokio::test]
async fn preview_uses_last_conversation() {
    let source = MockSource::new(vec![])
        .with_conversation(7, &["first reply", "  latest\n\nreply  "]);
    assert_eq!(last_response_preview(&source, 7).await, "latest reply");
}

#[tokio::test]
async fn preview_degrades_to_empty() {
    let source = MockSource::new(vec![]).with_conversation_failure(7);
    assert_eq!(last_response_preview(&source, 7).await, "");
    assert_eq!(last_response_preview(&source, 8).await, "");
}

#[tokio::test]
async fn preview_of_conversation_without_body_is_empty() {
    let mut source = MockSource::new(vec![]);
    source
        .conversations
        .insert(9, Ok(vec![Conversation { body_text: None }]));
    assert_eq!(last_response_preview(&source, 9).await, "");
}

#[tokio::test]
async fn fetch_tickets_adds_preview_only_when_profile_asks() {
    let pages = || {
        vec![Ok(vec![
            ticket(1, Some("L & T")),
            ticket(2, Some("seindia")),
        ])]
    };

    let source = MockSource::new(pages())
        .with_conversation(1, &["Looking into it"])
        .with_conversation_failure(2);
    let calls = source.conversation_calls.clone();
    let landt = fetch_tickets(&source, "2025-01-01T00:00:00Z", &LANDT, &Lookups::default())
        .await
        .tickets;
    assert_eq!(landt.len(), 1);
    assert_eq!(landt[0].last_response, "Looking into it");
    assert_eq!(landt[0].status, "Open");
    assert_eq!(calls.lock().unwrap().as_slice(), &[1]);

    let source = MockSource::new(pages()).with_conversation(2, &["never fetched"]);
    let calls = source.conversation_calls.clone();
    let seindia =
        fetch_tickets(&source, "2025-01-01T00:00:00Z", &SEINDIA, &Lookups::default())
            .await
            .tickets;
    assert_eq!(seindia.len(), 1);
    assert_eq!(seindia[0].last_response, "");
    assert!(calls.lock().unwrap().is_empty());
}
