// In-memory publisher store for tests and ephemeral runs

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::{FieldGroup, PublisherStore};
use crate::Result;

/// Field groups kept in ordered maps so iteration matches a key-ordered
/// on-disk store.
#[derive(Debug, Default)]
pub struct MemoryPublisherStore {
    groups: RwLock<HashMap<FieldGroup, BTreeMap<String, String>>>,
}

impl MemoryPublisherStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PublisherStore for MemoryPublisherStore {
    async fn get_field(&self, group: FieldGroup, name: &str) -> Result<String> {
        let groups = self.groups.read();
        Ok(groups
            .get(&group)
            .and_then(|fields| fields.get(name))
            .cloned()
            .unwrap_or_default())
    }

    async fn set_field(&self, group: FieldGroup, name: &str, value: &str) -> Result<()> {
        let mut groups = self.groups.write();
        let fields = groups.entry(group).or_default();
        if value.is_empty() {
            fields.remove(name);
        } else {
            fields.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn names(&self, group: FieldGroup) -> Result<Vec<String>> {
        let groups = self.groups.read();
        Ok(groups
            .get(&group)
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Publisher, Error};

    #[tokio::test]
    async fn test_get_missing_publisher_is_not_found() {
        let store = MemoryPublisherStore::new();
        assert!(matches!(store.get("ghost").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_key_reads_as_not_found() {
        let store = MemoryPublisherStore::new();
        store.set_field(FieldGroup::ExternalChannel, "alice", "alice_tv").await.unwrap();

        assert!(matches!(store.get("alice").await, Err(Error::NotFound(_))));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_and_get_all_in_key_order() {
        let store = MemoryPublisherStore::new();
        store.put(&Publisher::new("carol", "k3")).await.unwrap();
        store
            .put(&Publisher::new("alice", "k1").with_external_channel("alice_tv"))
            .await
            .unwrap();
        store.put(&Publisher::new("bob", "k2")).await.unwrap();
        store.stage_notification("bob", "hello").await.unwrap();

        let all = store.get_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(all[0].external_channel, "alice_tv");
        assert_eq!(all[1].pending_notification, "hello");
    }

    #[tokio::test]
    async fn test_delete_clears_every_group() {
        let store = MemoryPublisherStore::new();
        store.put(&Publisher::new("alice", "k1")).await.unwrap();
        store.set_external_live("alice", "live").await.unwrap();
        store.stage_notification("alice", "bye").await.unwrap();

        store.delete("alice").await.unwrap();

        for group in FieldGroup::ALL {
            assert_eq!(store.get_field(group, "alice").await.unwrap(), "");
        }
    }

    #[tokio::test]
    async fn test_stage_notification_overwrites() {
        let store = MemoryPublisherStore::new();
        store.put(&Publisher::new("alice", "k1")).await.unwrap();
        store.stage_notification("alice", "first").await.unwrap();
        store.stage_notification("alice", "second").await.unwrap();

        let alice = store.get("alice").await.unwrap();
        assert_eq!(alice.pending_notification, "second");
    }
}
