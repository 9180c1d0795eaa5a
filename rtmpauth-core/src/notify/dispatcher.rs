//! Notification Dispatcher
//!
//! Delivery is sequential in store order. The first failed delivery stops
//! the pass; everything from that publisher onwards stays pending and is
//! retried verbatim on the next pass.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::NotificationSink;
use crate::{
    models::Publisher,
    store::{FieldGroup, PublisherStore},
    Result,
};

pub struct NotificationDispatcher {
    store: Arc<dyn PublisherStore>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn PublisherStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Deliver every pending notification; returns how many were settled
    pub async fn dispatch_pending(&self) -> Result<usize> {
        let publishers = self.store.get_all().await?;
        let mut settled = 0;

        for publisher in publishers.iter().filter(|p| p.has_pending_notification()) {
            self.deliver(publisher).await?;
            settled += 1;
        }

        if settled > 0 {
            info!(count = settled, "Pending notifications dispatched");
        }
        Ok(settled)
    }

    /// Deliver the pending notification of a single publisher, if any
    pub async fn dispatch_for(&self, name: &str) -> Result<bool> {
        let publisher = self.store.get(name).await?;
        if !publisher.has_pending_notification() {
            return Ok(false);
        }
        self.deliver(&publisher).await?;
        Ok(true)
    }

    /// Post a message that is never staged; failures are only logged
    pub async fn announce(&self, message: &str) {
        if let Err(e) = self.sink.post(message).await {
            warn!(error = %e, "Failed to post announcement");
        }
    }

    async fn deliver(&self, publisher: &Publisher) -> Result<()> {
        let message = &publisher.pending_notification;

        if self.sink.is_enabled() {
            if let Err(e) = self.sink.post(message).await {
                warn!(publisher = %publisher.name, error = %e, "Notification delivery failed");
                return Err(e);
            }
            debug!(publisher = %publisher.name, "Notification delivered");
        } else {
            debug!(publisher = %publisher.name, "Notification sink disabled, clearing pending");
        }

        // a newer message staged while this one was in flight stays pending
        let current = self
            .store
            .get_field(FieldGroup::Notification, &publisher.name)
            .await?;
        if current == *message {
            self.store.clear_notification(&publisher.name).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryPublisherStore, Error};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records posted messages; fails any message containing `fail_on`
    #[derive(Default)]
    struct RecordingSink {
        disabled: bool,
        fail_on: Option<String>,
        posted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn is_enabled(&self) -> bool {
            !self.disabled
        }

        async fn post(&self, message: &str) -> Result<()> {
            if self.fail_on.as_deref().is_some_and(|f| message.contains(f)) {
                return Err(Error::Transport("webhook unreachable".to_string()));
            }
            self.posted.lock().push(message.to_string());
            Ok(())
        }
    }

    async fn seeded_store() -> Arc<MemoryPublisherStore> {
        let store = Arc::new(MemoryPublisherStore::new());
        store.put(&Publisher::new("alice", "k1")).await.unwrap();
        store.put(&Publisher::new("bob", "k2")).await.unwrap();
        store.put(&Publisher::new("carol", "k3")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_second_dispatch_delivers_nothing() {
        let store = seeded_store().await;
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(store.clone(), sink.clone());
        store.stage_notification("alice", "a1").await.unwrap();
        store.stage_notification("carol", "c1").await.unwrap();

        assert_eq!(dispatcher.dispatch_pending().await.unwrap(), 2);
        assert_eq!(dispatcher.dispatch_pending().await.unwrap(), 0);
        assert_eq!(*sink.posted.lock(), vec!["a1", "c1"]);
    }

    #[tokio::test]
    async fn test_staged_twice_delivers_latest_once() {
        let store = seeded_store().await;
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(store.clone(), sink.clone());
        store.stage_notification("bob", "first").await.unwrap();
        store.stage_notification("bob", "second").await.unwrap();

        dispatcher.dispatch_pending().await.unwrap();
        assert_eq!(*sink.posted.lock(), vec!["second"]);
    }

    #[tokio::test]
    async fn test_failure_stops_pass_and_keeps_later_pending() {
        let store = seeded_store().await;
        let sink = Arc::new(RecordingSink {
            fail_on: Some("from alice".to_string()),
            ..RecordingSink::default()
        });
        let dispatcher = NotificationDispatcher::new(store.clone(), sink.clone());
        store.stage_notification("alice", "from alice").await.unwrap();
        store.stage_notification("bob", "from bob").await.unwrap();

        assert!(dispatcher.dispatch_pending().await.unwrap_err().is_transport());

        assert!(sink.posted.lock().is_empty());
        assert_eq!(store.get("alice").await.unwrap().pending_notification, "from alice");
        assert_eq!(store.get("bob").await.unwrap().pending_notification, "from bob");
    }

    #[tokio::test]
    async fn test_disabled_sink_clears_without_posting() {
        let store = seeded_store().await;
        let sink = Arc::new(RecordingSink {
            disabled: true,
            ..RecordingSink::default()
        });
        let dispatcher = NotificationDispatcher::new(store.clone(), sink.clone());
        store.stage_notification("alice", "a1").await.unwrap();

        assert_eq!(dispatcher.dispatch_pending().await.unwrap(), 1);
        assert!(sink.posted.lock().is_empty());
        assert!(!store.get("alice").await.unwrap().has_pending_notification());
    }

    #[tokio::test]
    async fn test_dispatch_for_single_publisher() {
        let store = seeded_store().await;
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(store.clone(), sink.clone());
        store.stage_notification("alice", "a1").await.unwrap();
        store.stage_notification("bob", "b1").await.unwrap();

        assert!(dispatcher.dispatch_for("bob").await.unwrap());
        assert!(!dispatcher.dispatch_for("bob").await.unwrap());
        assert_eq!(*sink.posted.lock(), vec!["b1"]);
        assert!(store.get("alice").await.unwrap().has_pending_notification());
    }
}
