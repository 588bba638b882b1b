//! Application layer containing the core business logic orchestration.
//!
//! Three services share one underlying store: the `ReservationService`
//! lifecycle controller, the `PaymentService` intent bridge, and the
//! `WebhookProcessor` that reconciles asynchronous payment events.

pub mod payments;
pub mod reservations;
pub mod webhooks;
