use crate::error::{BookingError, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Per-command outcome line: `{"op", "ok", "result"?}` on success,
/// `{"op", "ok": false, "error", "message"}` on failure, where `error` is the
/// transport-facing error class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub op: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    pub fn success(op: &str, result: Value) -> Self {
        Self {
            op: op.to_string(),
            ok: true,
            result: Some(result),
            error: None,
            message: None,
        }
    }

    pub fn failure(op: &str, error: &BookingError) -> Self {
        Self {
            op: op.to_string(),
            ok: false,
            result: None,
            error: Some(error.class().as_str().to_string()),
            message: Some(error.to_string()),
        }
    }
}

/// Writes one JSON outcome per line to any `Write` sink.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(&mut self, outcome: &Outcome) -> Result<()> {
        serde_json::to_writer(&mut self.writer, outcome)
            .map_err(|e| BookingError::Internal(format!("failed to encode outcome: {e}")))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| BookingError::Internal(format!("failed to write outcome: {e}")))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| BookingError::Internal(format!("failed to flush outcomes: {e}")))
    }
}
