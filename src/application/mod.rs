//! Application layer containing the payment orchestration.
//!
//! `ReconciliationEngine` owns the payment state machine; `PaymentService`
//! wires it to the team store and the gateway for the inbound adapters.

pub mod reconciliation;
pub mod service;
