use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub i64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status as reported by the ticket service. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Completed,
    Unfinished,
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Completed => "completed",
            TicketStatus::Unfinished => "unfinished",
            TicketStatus::Other(value) => value,
        }
    }
}

impl From<String> for TicketStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => TicketStatus::Pending,
            "in-progress" => TicketStatus::InProgress,
            "completed" => TicketStatus::Completed,
            "unfinished" => TicketStatus::Unfinished,
            _ => TicketStatus::Other(value),
        }
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub request_type: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub action_date: Option<DateTime<Utc>>,
    pub status: TicketStatus,
    #[serde(default)]
    pub it_officer: Option<String>,
}

impl Ticket {
    pub fn submitted_on(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Body of a create request coming from the intake form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTicket {
    pub name: String,
    pub department: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_type: String,
}

impl NewTicket {
    /// Trims every field and rejects blank required ones.
    pub fn validated(self) -> AppResult<Self> {
        let ticket = Self {
            name: self.name.trim().to_string(),
            department: self.department.trim().to_string(),
            description: self.description.trim().to_string(),
            request_type: self.request_type.trim().to_string(),
        };

        for (field, value) in [
            ("name", &ticket.name),
            ("department", &ticket.department),
            ("description", &ticket.description),
        ] {
            if value.is_empty() {
                return Err(AppError::Validation(format!("{field} must not be empty")));
            }
        }

        Ok(ticket)
    }
}

/// Accepts RFC 3339 as well as the naive datetime forms SQL backends emit.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp '{raw}'")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&value.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("unrecognized timestamp '{raw}'"))),
            }
        }
    }
}
