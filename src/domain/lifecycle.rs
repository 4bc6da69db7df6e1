//! Ticket lifecycle: `pending -> in-progress -> completed`, with reverse
//! (`in-progress -> pending`) and unfinish (`in-progress|completed -> unfinished`).
//!
//! The client never computes a new status itself; a transition only names the
//! endpoint to call and the status the service is expected to report afterwards.

use std::fmt;

use serde::Serialize;

use crate::domain::ticket::{TicketId, TicketStatus};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Finish,
    Reverse,
    Unfinish,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 3] = [
        TransitionKind::Finish,
        TransitionKind::Reverse,
        TransitionKind::Unfinish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Finish => "finish",
            TransitionKind::Reverse => "reverse",
            TransitionKind::Unfinish => "unfinish",
        }
    }

    /// Last path segment under `/{category}/progress/`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            TransitionKind::Finish => "update",
            TransitionKind::Reverse => "reverse",
            TransitionKind::Unfinish => "unfinished",
        }
    }

    pub fn target_status(&self) -> TicketStatus {
        match self {
            TransitionKind::Finish => TicketStatus::Completed,
            TransitionKind::Reverse => TicketStatus::Pending,
            TransitionKind::Unfinish => TicketStatus::Unfinished,
        }
    }

    pub fn expected_from(&self, status: &TicketStatus) -> bool {
        match self {
            TransitionKind::Finish | TransitionKind::Reverse => {
                *status == TicketStatus::InProgress
            }
            TransitionKind::Unfinish => {
                matches!(status, TicketStatus::InProgress | TicketStatus::Completed)
            }
        }
    }

    pub fn confirmation_title(&self) -> &'static str {
        match self {
            TransitionKind::Finish => "Complete Ticket?",
            TransitionKind::Reverse => "Ticket Reversal?",
            TransitionKind::Unfinish => "Unfinish Ticket?",
        }
    }

    pub fn confirmation_prompt(&self, requester: &str) -> String {
        match self {
            TransitionKind::Finish => {
                format!("Are you sure that {requester}'s ticket is completed?")
            }
            TransitionKind::Reverse => format!(
                "Are you sure that you want to reverse {requester}'s ticket and send back to pending?"
            ),
            TransitionKind::Unfinish => format!(
                "Are you sure that you want to mark {requester}'s ticket as unfinished?"
            ),
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested status change, carrying whatever the endpoint needs besides the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Finish,
    Reverse,
    Unfinish { reason: String },
}

impl Transition {
    pub fn unfinish(reason: &str) -> AppResult<Self> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "a reason is required to mark a ticket as unfinished".to_string(),
            ));
        }
        Ok(Transition::Unfinish {
            reason: reason.to_string(),
        })
    }

    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Finish => TransitionKind::Finish,
            Transition::Reverse => TransitionKind::Reverse,
            Transition::Unfinish { .. } => TransitionKind::Unfinish,
        }
    }

    pub fn payload(&self, id: TicketId) -> TransitionPayload<'_> {
        TransitionPayload {
            id,
            reason: match self {
                Transition::Unfinish { reason } => Some(reason.as_str()),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionPayload<'a> {
    pub id: TicketId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
}
