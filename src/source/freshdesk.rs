use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;

use super::TicketSource;
use crate::error::SyncError;
use crate::model::ticket::{Conversation, RawTicket};

const PER_PAGE: u32 = 100;

pub struct FreshdeskSource {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl FreshdeskSource {
    pub fn new(domain: &str, api_key: &str) -> Self {
        // Freshdesk takes the API key as the user name and ignores the password.
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{api_key}:x"));
        Self {
            base_url: base_url(domain),
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
        }
    }

    fn tickets_url(&self, since: &str, page: u32) -> String {
        format!(
            "{}/api/v2/tickets?include=requester&per_page={PER_PAGE}&updated_since={}&page={page}",
            self.base_url,
            urlencoding::encode(since)
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Freshdesk API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::TicketApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        resp.json().await.context("Failed to parse Freshdesk response")
    }
}

fn base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

#[async_trait]
impl TicketSource for FreshdeskSource {
    fn name(&self) -> &str {
        "Freshdesk"
    }

    async fn fetch_page(&self, since: &str, page: u32) -> Result<Vec<RawTicket>> {
        self.get_json(&self.tickets_url(since, page)).await
    }

    async fn fetch_conversations(&self, ticket_id: u64) -> Result<Vec<Conversation>> {
        let url = format!("{}/api/v2/tickets/{ticket_id}/conversations", self.base_url);
        self.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https() {
        assert_eq!(
            base_url("acme.freshdesk.com"),
            "https://acme.freshdesk.com"
        );
        assert_eq!(
            base_url("https://acme.freshdesk.com/"),
            "https://acme.freshdesk.com"
        );
    }

    #[test]
    fn tickets_url_encodes_since() {
        let source = FreshdeskSource::new("acme.freshdesk.com", "key");
        assert_eq!(
            source.tickets_url("2025-01-01T00:00:00Z", 3),
            "https://acme.freshdesk.com/api/v2/tickets?include=requester&per_page=100&updated_since=2025-01-01T00%3A00%3A00Z&page=3"
        );
    }

    #[test]
    fn auth_header_uses_api_key_and_x() {
        let source = FreshdeskSource::new("acme.freshdesk.com", "abc");
        // base64("abc:x")
        assert_eq!(source.auth_header, "Basic YWJjOng=");
    }
}
