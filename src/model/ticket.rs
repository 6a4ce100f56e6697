use serde::Deserialize;

use crate::lookup::Lookups;

/// A ticket as returned by `GET /api/v2/tickets?include=requester`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicket {
    pub id: u64,
    #[serde(default, rename = "type")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub due_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub responder_id: Option<u64>,
    #[serde(default)]
    pub requester: Option<Requester>,
    #[serde(default)]
    pub custom_fields: Option<CustomFields>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Requester {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomFields {
    #[serde(default)]
    pub cf_client: Option<String>,
    #[serde(default)]
    pub cf_issue_type: Option<String>,
    #[serde(default)]
    pub cf_jira_ticket_url: Option<String>,
}

/// One entry of `GET /api/v2/tickets/{id}/conversations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub body_text: Option<String>,
}

impl RawTicket {
    pub fn client_tag(&self) -> Option<&str> {
        self.custom_fields.as_ref()?.cf_client.as_deref()
    }
}

/// A fetched ticket with lookups applied and every missing field defaulted to "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTicket {
    pub id: String,
    pub ticket_type: String,
    pub issue_type: String,
    pub jira: String,
    pub subject: String,
    pub status: String,
    pub created_at: String,
    pub due_by: String,
    pub updated_at: String,
    pub closed_at: String,
    pub requester: String,
    pub assignee: String,
    pub client: String,
    pub last_response: String,
}

impl NormalizedTicket {
    pub fn from_raw(raw: &RawTicket, lookups: &Lookups) -> Self {
        let custom = raw.custom_fields.clone().unwrap_or_default();
        Self {
            id: raw.id.to_string(),
            ticket_type: raw.ticket_type.clone().unwrap_or_default(),
            issue_type: custom.cf_issue_type.unwrap_or_default(),
            jira: custom.cf_jira_ticket_url.unwrap_or_default(),
            subject: raw.subject.clone().unwrap_or_default(),
            status: lookups.status_label(raw.status),
            created_at: raw.created_at.clone().unwrap_or_default(),
            due_by: raw.due_by.clone().unwrap_or_default(),
            updated_at: raw.updated_at.clone().unwrap_or_default(),
            closed_at: raw.closed_at.clone().unwrap_or_default(),
            requester: raw
                .requester
                .as_ref()
                .and_then(|r| r.name.clone())
                .unwrap_or_default(),
            assignee: lookups.agent_name(raw.responder_id),
            client: custom.cf_client.unwrap_or_default(),
            last_response: String::new(),
        }
    }

    pub fn with_last_response(mut self, preview: String) -> Self {
        self.last_response = preview;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": 1234,
        "type": "Incident",
        "subject": "Checkout page is blank",
        "status": 4,
        "created_at": "2025-02-03T09:15:00Z",
        "due_by": "2025-02-05T09:15:00Z",
        "updated_at": "2025-02-04T11:00:00Z",
        "closed_at": null,
        "responder_id": 17000589198,
        "requester": { "name": "Asha Rao" },
        "custom_fields": {
            "cf_client": " SEIndia ",
            "cf_issue_type": "Bug",
            "cf_jira_ticket_url": "https://jira.example.com/browse/SE-9"
        }
    }"#;

    #[test]
    fn deserializes_freshdesk_ticket() {
        let raw: RawTicket = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(raw.id, 1234);
        assert_eq!(raw.ticket_type.as_deref(), Some("Incident"));
        assert_eq!(raw.client_tag(), Some(" SEIndia "));
        assert_eq!(raw.closed_at, None);
    }

    #[test]
    fn normalizes_with_lookups() {
        let raw: RawTicket = serde_json::from_str(SAMPLE).unwrap();
        let ticket = NormalizedTicket::from_raw(&raw, &Lookups::default());
        assert_eq!(ticket.id, "1234");
        assert_eq!(ticket.status, "Resolved");
        assert_eq!(ticket.assignee, "Niraj Patil");
        assert_eq!(ticket.requester, "Asha Rao");
        assert_eq!(ticket.issue_type, "Bug");
        assert_eq!(ticket.closed_at, "");
        assert_eq!(ticket.last_response, "");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let raw: RawTicket = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        let ticket = NormalizedTicket::from_raw(&raw, &Lookups::default());
        assert_eq!(ticket.id, "7");
        assert_eq!(ticket.subject, "");
        assert_eq!(ticket.jira, "");
        assert_eq!(ticket.client, "");
        assert_eq!(ticket.status, "");
        assert_eq!(ticket.assignee, "Unassigned");
    }

    #[test]
    fn null_custom_fields_are_tolerated() {
        let raw: RawTicket =
            serde_json::from_str(r#"{"id": 8, "custom_fields": {"cf_client": null}}"#).unwrap();
        assert_eq!(raw.client_tag(), None);
    }
}
