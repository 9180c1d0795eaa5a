//! Stream authorization and external live-status reconciliation

mod authorizer;
mod reconciler;

pub use authorizer::{Authorization, StreamAuthorizer, StreamEvent, StreamRequest};
pub use reconciler::{ReconcileReport, Reconciler};
