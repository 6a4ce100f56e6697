//! Client profiles and their sheet layouts.
//!
//! A layout is the ordered column table of one client's sheet. Each column names
//! the `Field` it stores and how a sync treats it: computed columns are refreshed
//! from the ticket API, manual columns belong to whoever edits the sheet.
//! Bump `Layout::version` whenever columns are added, removed or reordered.

use crate::model::row::{Field, TicketRow};
use crate::model::ticket::NormalizedTicket;

/// Where a computed column takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketValue {
    Id,
    TicketType,
    IssueType,
    Jira,
    Subject,
    CreatedAt,
    DueBy,
    UpdatedAt,
    ClosedAt,
    Requester,
    Assignee,
    Client,
    LastResponse,
}

impl TicketValue {
    pub fn of(self, ticket: &NormalizedTicket) -> &str {
        match self {
            TicketValue::Id => &ticket.id,
            TicketValue::TicketType => &ticket.ticket_type,
            TicketValue::IssueType => &ticket.issue_type,
            TicketValue::Jira => &ticket.jira,
            TicketValue::Subject => &ticket.subject,
            TicketValue::CreatedAt => &ticket.created_at,
            TicketValue::DueBy => &ticket.due_by,
            TicketValue::UpdatedAt => &ticket.updated_at,
            TicketValue::ClosedAt => &ticket.closed_at,
            TicketValue::Requester => &ticket.requester,
            TicketValue::Assignee => &ticket.assignee,
            TicketValue::Client => &ticket.client,
            TicketValue::LastResponse => &ticket.last_response,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Computed(TicketValue),
    Manual,
    /// The computed status label, unless the layout's override column says otherwise.
    Status,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub field: Field,
    pub kind: ColumnKind,
}

const fn computed(header: &'static str, field: Field, value: TicketValue) -> Column {
    Column {
        header,
        field,
        kind: ColumnKind::Computed(value),
    }
}

const fn manual(header: &'static str, field: Field) -> Column {
    Column {
        header,
        field,
        kind: ColumnKind::Manual,
    }
}

const fn status(header: &'static str) -> Column {
    Column {
        header,
        field: Field::Status,
        kind: ColumnKind::Status,
    }
}

#[derive(Debug)]
pub struct Layout {
    pub version: u32,
    pub columns: &'static [Column],
    /// Manual column whose non-blank value replaces the computed status.
    pub status_override: Option<Field>,
}

const SEINDIA_COLUMNS: &[Column] = &[
    computed("Ticket type", Field::TicketType, TicketValue::IssueType),
    computed("Ticket ID", Field::TicketId, TicketValue::Id),
    computed("Jira Ticket", Field::Jira, TicketValue::Jira),
    computed("Summary", Field::Summary, TicketValue::Subject),
    manual("Priority", Field::Priority),
    manual("Comments", Field::Comments),
    manual("ETA", Field::Eta),
    manual("Dependancy", Field::Dependency),
    manual("Updated ETA", Field::UpdatedEta),
    status("Status"),
    computed("Task", Field::Task, TicketValue::TicketType),
    computed("Created", Field::Created, TicketValue::CreatedAt),
    computed("Due date", Field::DueDate, TicketValue::DueBy),
    computed("Ticket Uodated Date", Field::UpdatedAt, TicketValue::UpdatedAt),
    computed("Raised ticket by", Field::RaisedBy, TicketValue::Requester),
    computed("Graas Assignee", Field::Assignee, TicketValue::Assignee),
    computed("Client", Field::Client, TicketValue::Client),
    manual("Extra Col R", Field::ExtraR),
    manual("Extra Col S", Field::ExtraS),
    manual("Manual Override (Column T)", Field::ManualOverride),
];

const LANDT_COLUMNS: &[Column] = &[
    computed("Ticket type", Field::TicketType, TicketValue::TicketType),
    computed("Ticket ID", Field::TicketId, TicketValue::Id),
    computed("Jira Ticket", Field::Jira, TicketValue::Jira),
    computed("Summary", Field::Summary, TicketValue::Subject),
    manual("Priority", Field::Priority),
    manual("Comments", Field::Comments),
    manual("ETA", Field::Eta),
    manual("Dependancy", Field::Dependency),
    manual("Updated ETA", Field::UpdatedEta),
    computed("Last Response Preview", Field::LastResponse, TicketValue::LastResponse),
    status("Status"),
    manual("Task", Field::Task),
    computed("Created", Field::Created, TicketValue::CreatedAt),
    computed("Due date", Field::DueDate, TicketValue::DueBy),
    computed("Ticket Closed Date", Field::ClosedAt, TicketValue::ClosedAt),
    computed("Raised ticket by", Field::RaisedBy, TicketValue::Requester),
    computed("Graas Assignee", Field::Assignee, TicketValue::Assignee),
    computed("Client", Field::Client, TicketValue::Client),
];

pub const SEINDIA_LAYOUT: Layout = Layout {
    version: 2,
    columns: SEINDIA_COLUMNS,
    status_override: Some(Field::ManualOverride),
};

pub const LANDT_LAYOUT: Layout = Layout {
    version: 1,
    columns: LANDT_COLUMNS,
    status_override: None,
};

impl Layout {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header.to_string()).collect()
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// Resolves the snapshot's header row to a cell index per layout column.
    ///
    /// Columns are matched by header text so inserted or moved columns keep their
    /// data. A renamed header falls back to the column's layout position, as long
    /// as that position isn't taken by some other known header.
    pub fn resolve(&self, header: &[String]) -> ColumnMap {
        let known = |text: &str| self.columns.iter().any(|c| c.header == text.trim());
        let indices = self
            .columns
            .iter()
            .enumerate()
            .map(|(pos, column)| {
                if let Some(found) = header.iter().position(|h| h.trim() == column.header) {
                    return Some(found);
                }
                match header.get(pos) {
                    Some(text) if known(text) => None,
                    _ => Some(pos),
                }
            })
            .collect();
        ColumnMap { indices }
    }

    pub fn decode(&self, map: &ColumnMap, cells: &[String]) -> TicketRow {
        let mut row = TicketRow::default();
        for (column, index) in self.columns.iter().zip(&map.indices) {
            if let Some(value) = index.and_then(|i| cells.get(i)) {
                row.set(column.field, value.as_str());
            }
        }
        row
    }

    pub fn encode(&self, row: &TicketRow) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| row.get(c.field).to_string())
            .collect()
    }

    /// The manual status on `row`, when the override cell holds more than whitespace.
    pub fn manual_status<'a>(&self, row: &'a TicketRow) -> Option<&'a str> {
        let field = self.status_override?;
        let value = row.get(field);
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Cell index for each layout column, in layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: Vec<Option<usize>>,
}

#[derive(Debug)]
pub struct Profile {
    pub name: &'static str,
    pub display_name: &'static str,
    /// Compared against `cf_client` after trimming and lowercasing.
    pub client_tag: &'static str,
    pub fetch_last_response: bool,
    pub status_overrides: &'static [(i64, &'static str)],
    /// Background per status label. Empty means the sheet is left uncolored.
    pub status_colors: &'static [(&'static str, &'static str)],
    pub layout: &'static Layout,
}

pub const SEINDIA: Profile = Profile {
    name: "seindia",
    display_name: "seindia",
    client_tag: "seindia",
    fetch_last_response: false,
    status_overrides: &[],
    status_colors: &[],
    layout: &SEINDIA_LAYOUT,
};

pub const LANDT: Profile = Profile {
    name: "landt",
    display_name: "L & T",
    client_tag: "l & t",
    fetch_last_response: true,
    status_overrides: &[(13, "Tech Dependant")],
    status_colors: &[
        ("Closed", "#008000"),
        ("Confirmation to Closure", "#90EE90"),
        ("Clarification - Client/Third Party", "#FF4500"),
        ("In Progress", "#FFA500"),
        ("Tech Dependant", "#800080"),
    ],
    layout: &LANDT_LAYOUT,
};

impl Profile {
    pub const ALL: [&'static Profile; 2] = [&SEINDIA, &LANDT];

    pub fn find(name: &str) -> Option<&'static Profile> {
        let wanted = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| {
            p.name == wanted || p.client_tag == wanted || p.client_tag.replace(' ', "") == wanted
        })
    }

    pub fn matches_client(&self, client: Option<&str>) -> bool {
        client.is_some_and(|c| c.trim().to_lowercase() == self.client_tag)
    }

    pub fn status_color(&self, label: &str) -> Option<&'static str> {
        self.status_colors
            .iter()
            .find(|(status, _)| *status == label)
            .map(|(_, hex)| *hex)
    }

    pub fn colors_status(&self) -> bool {
        !self.status_colors.is_empty()
    }
}
