use crate::domain::payment::{IntentRequest, PaymentIntent};
use crate::domain::ports::PaymentGateway;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Offline payment gateway.
///
/// Mints deterministic client secrets and records every request, so the CLI
/// runs without processor credentials and tests can assert on the exact
/// intents the bridge produced.
#[derive(Default, Clone)]
pub struct SandboxGateway {
    requests: Arc<Mutex<Vec<IntentRequest>>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request seen so far, in order.
    pub async fn requests(&self) -> Vec<IntentRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent> {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        let n = requests.len();
        Ok(PaymentIntent {
            client_secret: format!("pi_sandbox_{}_secret_{n}", request.reservation),
            amount: request.amount_minor,
            currency: request.currency.to_string(),
        })
    }
}
