use crate::application::reservations::BookingRequest;
use crate::domain::reservation::{Principal, ReservationId};
use crate::error::{BookingError, Result};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};

/// One line of the command stream.
///
/// The webhook body arrives as a raw string so the signature can be verified
/// over the exact bytes the processor signed, before any parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Command {
    Create {
        principal: Principal,
        request: BookingRequest,
    },
    Update {
        principal: Principal,
        id: ReservationId,
        request: BookingRequest,
    },
    Cancel {
        principal: Principal,
        id: ReservationId,
    },
    Delete {
        principal: Principal,
        id: ReservationId,
    },
    Get {
        principal: Principal,
        id: ReservationId,
    },
    List {
        principal: Principal,
    },
    Intent {
        id: ReservationId,
    },
    Webhook {
        body: String,
        signature: String,
    },
}

impl Command {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Cancel { .. } => "cancel",
            Self::Delete { .. } => "delete",
            Self::Get { .. } => "get",
            Self::List { .. } => "list",
            Self::Intent { .. } => "intent",
            Self::Webhook { .. } => "webhook",
        }
    }
}

/// Reads commands from a JSONL source, one JSON object per line.
///
/// Blank lines are skipped; a malformed line yields an `Err` item and the
/// stream continues, so one bad command never aborts the batch.
pub struct CommandReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.lines().filter_map(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(serde_json::from_str(&line).map_err(|e| BookingError::Validation {
                field: "command",
                reason: e.to_string(),
            })),
            Err(e) => Some(Err(BookingError::Internal(format!(
                "failed to read command stream: {e}"
            )))),
        })
    }
}
