use std::collections::HashMap;

/// Freshdesk status codes, including the account's custom statuses.
pub const STATUS_LABELS: &[(i64, &str)] = &[
    (2, "Open"),
    (3, "Pending"),
    (4, "Resolved"),
    (5, "Closed"),
    (8, "In Progress"),
    (12, "Clarification - Client/Third Party"),
    (13, "Tech Dependent"),
    (14, "Reopened"),
    (15, "UAT"),
    (16, "On Hold"),
    (17, "Temporarily Closed"),
    (18, "Under Review"),
    (19, "Rejected"),
    (20, "New Requirement"),
    (21, "Confirmation to Closure"),
];

pub const AGENT_NAMES: &[(u64, &str)] = &[
    (17000589198, "Niraj Patil"),
    (17050112354, "Priyanka Diwate"),
    (17051657819, "Harshal Bothara"),
    (17055595704, "Tejas Shivaji Patil"),
    (17057807143, "Raj Amrutakar"),
    (17058119097, "Zealkumar Mohodkar"),
    (17066388956, "Pratik Dahale"),
];

pub const UNASSIGNED: &str = "Unassigned";

/// Read-only lookup tables, built once per run.
#[derive(Debug, Clone)]
pub struct Lookups {
    statuses: HashMap<i64, String>,
    agents: HashMap<u64, String>,
}

impl Default for Lookups {
    fn default() -> Self {
        Self {
            statuses: STATUS_LABELS
                .iter()
                .map(|(code, label)| (*code, label.to_string()))
                .collect(),
            agents: AGENT_NAMES
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
        }
    }
}

impl Lookups {
    /// Layers per-client label spellings and configured agents over the defaults.
    /// Agent keys that are not numeric ids are skipped.
    pub fn new(
        status_overrides: &[(i64, &str)],
        extra_agents: Option<&HashMap<String, String>>,
    ) -> Self {
        let mut lookups = Self::default();
        for (code, label) in status_overrides {
            lookups.statuses.insert(*code, label.to_string());
        }
        if let Some(extra) = extra_agents {
            for (id, name) in extra {
                match id.trim().parse::<u64>() {
                    Ok(id) => {
                        lookups.agents.insert(id, name.clone());
                    }
                    Err(_) => tracing::warn!(key = %id, "ignoring non-numeric agent id in config"),
                }
            }
        }
        lookups
    }

    /// Unknown codes come back as the code itself; a missing code is blank.
    pub fn status_label(&self, code: Option<i64>) -> String {
        match code {
            Some(code) => self
                .statuses
                .get(&code)
                .cloned()
                .unwrap_or_else(|| code.to_string()),
            None => String::new(),
        }
    }

    pub fn agent_name(&self, agent_id: Option<u64>) -> String {
        match agent_id {
            None | Some(0) => UNASSIGNED.to_string(),
            Some(id) => self
                .agents
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
        }
    }
}
