use std::fmt;

/// A named spreadsheet field. Which fields a sheet has, and in which column,
/// is decided by the client profile's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TicketType,
    TicketId,
    Jira,
    Summary,
    Priority,
    Comments,
    Eta,
    Dependency,
    UpdatedEta,
    LastResponse,
    Status,
    Task,
    Created,
    DueDate,
    UpdatedAt,
    ClosedAt,
    RaisedBy,
    Assignee,
    Client,
    ExtraR,
    ExtraS,
    ManualOverride,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::TicketType => "ticket_type",
            Field::TicketId => "ticket_id",
            Field::Jira => "jira",
            Field::Summary => "summary",
            Field::Priority => "priority",
            Field::Comments => "comments",
            Field::Eta => "eta",
            Field::Dependency => "dependency",
            Field::UpdatedEta => "updated_eta",
            Field::LastResponse => "last_response",
            Field::Status => "status",
            Field::Task => "task",
            Field::Created => "created",
            Field::DueDate => "due_date",
            Field::UpdatedAt => "updated_at",
            Field::ClosedAt => "closed_at",
            Field::RaisedBy => "raised_by",
            Field::Assignee => "assignee",
            Field::Client => "client",
            Field::ExtraR => "extra_r",
            Field::ExtraS => "extra_s",
            Field::ManualOverride => "manual_override",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ticket row of the sheet, addressed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketRow {
    pub ticket_type: String,
    pub ticket_id: String,
    pub jira: String,
    pub summary: String,
    pub priority: String,
    pub comments: String,
    pub eta: String,
    pub dependency: String,
    pub updated_eta: String,
    pub last_response: String,
    pub status: String,
    pub task: String,
    pub created: String,
    pub due_date: String,
    pub updated_at: String,
    pub closed_at: String,
    pub raised_by: String,
    pub assignee: String,
    pub client: String,
    pub extra_r: String,
    pub extra_s: String,
    pub manual_override: String,
}

impl TicketRow {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::TicketType => &self.ticket_type,
            Field::TicketId => &self.ticket_id,
            Field::Jira => &self.jira,
            Field::Summary => &self.summary,
            Field::Priority => &self.priority,
            Field::Comments => &self.comments,
            Field::Eta => &self.eta,
            Field::Dependency => &self.dependency,
            Field::UpdatedEta => &self.updated_eta,
            Field::LastResponse => &self.last_response,
            Field::Status => &self.status,
            Field::Task => &self.task,
            Field::Created => &self.created,
            Field::DueDate => &self.due_date,
            Field::UpdatedAt => &self.updated_at,
            Field::ClosedAt => &self.closed_at,
            Field::RaisedBy => &self.raised_by,
            Field::Assignee => &self.assignee,
            Field::Client => &self.client,
            Field::ExtraR => &self.extra_r,
            Field::ExtraS => &self.extra_s,
            Field::ManualOverride => &self.manual_override,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::TicketType => &mut self.ticket_type,
            Field::TicketId => &mut self.ticket_id,
            Field::Jira => &mut self.jira,
            Field::Summary => &mut self.summary,
            Field::Priority => &mut self.priority,
            Field::Comments => &mut self.comments,
            Field::Eta => &mut self.eta,
            Field::Dependency => &mut self.dependency,
            Field::UpdatedEta => &mut self.updated_eta,
            Field::LastResponse => &mut self.last_response,
            Field::Status => &mut self.status,
            Field::Task => &mut self.task,
            Field::Created => &mut self.created,
            Field::DueDate => &mut self.due_date,
            Field::UpdatedAt => &mut self.updated_at,
            Field::ClosedAt => &mut self.closed_at,
            Field::RaisedBy => &mut self.raised_by,
            Field::Assignee => &mut self.assignee,
            Field::Client => &mut self.client,
            Field::ExtraR => &mut self.extra_r,
            Field::ExtraS => &mut self.extra_s,
            Field::ManualOverride => &mut self.manual_override,
        };
        *slot = value.into();
    }
}
