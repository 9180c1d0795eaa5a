//! Notification staging text, delivery and the webhook sink

mod dispatcher;
pub mod messages;
mod sink;

pub use dispatcher::NotificationDispatcher;
pub use sink::{NotificationSink, WebhookSink};
