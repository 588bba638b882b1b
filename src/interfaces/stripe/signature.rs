use crate::error::{BookingError, Result};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Default freshness window for signed webhook timestamps.
const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifies the processor's signature header over raw webhook payload bytes.
///
/// The scheme is `t=<unix>,v1=<hex hmac-sha256>` where the MAC covers
/// `"{t}.{body}"` with a shared secret. Comparison is constant-time, and the
/// timestamp must fall within a freshness tolerance to blunt replay.
pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Checks `header` against `payload`. `now` is threaded in rather than
    /// read inside so freshness is testable.
    pub fn verify(&self, payload: &[u8], header: &str, now: DateTime<Utc>) -> Result<()> {
        let (timestamp, candidates) = parse_header(header)?;

        let age = now.timestamp() - timestamp;
        if age.abs() > self.tolerance.num_seconds() {
            return Err(BookingError::SignatureVerification(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let expected = compute_mac(&self.secret, timestamp, payload)?;
        for candidate in candidates {
            if let Ok(bytes) = hex::decode(candidate)
                && bool::from(bytes.as_slice().ct_eq(&expected))
            {
                return Ok(());
            }
        }
        Err(BookingError::SignatureVerification(
            "no matching v1 signature".to_string(),
        ))
    }
}

/// Produces a valid signature header for `payload`; the sandbox side of the
/// scheme, also used to mint fixtures in tests.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mac = compute_mac(secret, timestamp, payload).expect("hmac accepts any key length");
    format!("t={timestamp},v1={}", hex::encode(mac))
}

fn compute_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BookingError::Internal("invalid webhook secret".to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn parse_header(header: &str) -> Result<(i64, Vec<&str>)> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    BookingError::SignatureVerification("malformed timestamp".to_string())
                })?);
            }
            Some(("v1", value)) => candidates.push(value),
            // Unknown scheme elements are skipped, per the header's design
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or_else(|| {
        BookingError::SignatureVerification("missing timestamp element".to_string())
    })?;
    if candidates.is_empty() {
        return Err(BookingError::SignatureVerification(
            "missing v1 signature element".to_string(),
        ));
    }
    Ok((timestamp, candidates))
}
