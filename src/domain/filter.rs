use chrono::NaiveDate;

use crate::domain::ticket::{Ticket, TicketId};
use crate::error::{AppError, AppResult};

/// Narrows a fetched list to tickets submitted on one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub date: NaiveDate,
}

impl DateFilter {
    pub fn parse(raw: &str) -> AppResult<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(|date| Self { date })
            .map_err(|err| AppError::Validation(format!("invalid date '{raw}': {err}")))
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        ticket.submitted_on() == self.date
    }

    pub fn apply<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|ticket| self.matches(ticket)).collect()
    }
}

/// Single-row highlight: selecting the highlighted row again clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSelection {
    selected: Option<TicketId>,
}

impl RowSelection {
    pub fn toggle(&mut self, id: TicketId) {
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn is_selected(&self, id: TicketId) -> bool {
        self.selected == Some(id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::domain::ticket::{Ticket, TicketId, TicketStatus};

    pub fn ticket(id: i64, name: &str, day: u32, hour: u32, status: TicketStatus) -> Ticket {
        Ticket {
            id: TicketId(id),
            name: name.to_string(),
            department: "Sales".to_string(),
            description: "printer broken".to_string(),
            request_type: "printer".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            action_date: None,
            status,
            it_officer: None,
        }
    }
}
