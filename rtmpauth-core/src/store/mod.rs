//! Publisher Store
//!
//! Durable mapping from publisher name to its denormalized field groups.
//! Each field group is read and written independently: there is no
//! transaction spanning two groups, so a crash between two writes for the
//! same publisher can leave the record momentarily inconsistent (for
//! example `external_live` set while the notification is not yet staged).

mod memory;
mod sqlite;

pub use memory::MemoryPublisherStore;
pub use sqlite::SqlitePublisherStore;

use async_trait::async_trait;
use std::fmt;

use crate::{models::Publisher, Error, Result};

/// Independently stored slices of a publisher record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldGroup {
    Key,
    LocalLive,
    ExternalChannel,
    ExternalLive,
    StreamInfo,
    Notification,
}

impl FieldGroup {
    pub const ALL: [Self; 6] = [
        Self::Key,
        Self::LocalLive,
        Self::ExternalChannel,
        Self::ExternalLive,
        Self::StreamInfo,
        Self::Notification,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::LocalLive => "local_live",
            Self::ExternalChannel => "external_channel",
            Self::ExternalLive => "external_live",
            Self::StreamInfo => "stream_info",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyed field storage for publishers.
///
/// Implementations only provide the per-field primitives; the record-level
/// operations are built on top of them and inherit their weak consistency.
#[async_trait]
pub trait PublisherStore: Send + Sync {
    /// Value of one field group, empty when absent
    async fn get_field(&self, group: FieldGroup, name: &str) -> Result<String>;

    /// Write one field group; an empty value removes it
    async fn set_field(&self, group: FieldGroup, name: &str, value: &str) -> Result<()>;

    /// Names present in the given field group, in the store's native key order
    async fn names(&self, group: FieldGroup) -> Result<Vec<String>>;

    /// Fetch a publisher; a missing or empty key is reported as `NotFound`
    async fn get(&self, name: &str) -> Result<Publisher> {
        let key = self.get_field(FieldGroup::Key, name).await?;
        if key.is_empty() {
            return Err(Error::NotFound(format!("publisher '{name}'")));
        }
        let mut publisher = Publisher::new(name, key);
        self.fill(&mut publisher).await?;
        Ok(publisher)
    }

    /// Every publisher with all field groups populated, in native key order
    async fn get_all(&self) -> Result<Vec<Publisher>> {
        let names = self.names(FieldGroup::Key).await?;
        let mut publishers = Vec::with_capacity(names.len());
        for name in names {
            let key = self.get_field(FieldGroup::Key, &name).await?;
            if key.is_empty() {
                continue;
            }
            let mut publisher = Publisher::new(name, key);
            self.fill(&mut publisher).await?;
            publishers.push(publisher);
        }
        Ok(publishers)
    }

    /// Upsert every field group of the record, one write per group
    async fn put(&self, publisher: &Publisher) -> Result<()> {
        self.set_field(FieldGroup::Key, &publisher.name, &publisher.key).await?;
        self.set_field(FieldGroup::LocalLive, &publisher.name, &publisher.local_live).await?;
        self.set_field(
            FieldGroup::ExternalChannel,
            &publisher.name,
            &publisher.external_channel,
        )
        .await?;
        self.set_field(FieldGroup::ExternalLive, &publisher.name, &publisher.external_live)
            .await?;
        self.set_field(FieldGroup::StreamInfo, &publisher.name, &publisher.stream_info).await?;
        self.set_field(
            FieldGroup::Notification,
            &publisher.name,
            &publisher.pending_notification,
        )
        .await
    }

    /// Remove the publisher from every field group
    async fn delete(&self, name: &str) -> Result<()> {
        for group in FieldGroup::ALL {
            self.set_field(group, name, "").await?;
        }
        Ok(())
    }

    async fn set_local_live(&self, name: &str, marker: &str) -> Result<()> {
        self.set_field(FieldGroup::LocalLive, name, marker).await
    }

    async fn set_external_live(&self, name: &str, marker: &str) -> Result<()> {
        self.set_field(FieldGroup::ExternalLive, name, marker).await
    }

    async fn set_stream_info(&self, name: &str, info: &str) -> Result<()> {
        self.set_field(FieldGroup::StreamInfo, name, info).await
    }

    /// Stage a notification, replacing whatever was pending
    async fn stage_notification(&self, name: &str, message: &str) -> Result<()> {
        self.set_field(FieldGroup::Notification, name, message).await
    }

    async fn clear_notification(&self, name: &str) -> Result<()> {
        self.set_field(FieldGroup::Notification, name, "").await
    }

    #[doc(hidden)]
    async fn fill(&self, publisher: &mut Publisher) -> Result<()> {
        let name = publisher.name.clone();
        publisher.local_live = self.get_field(FieldGroup::LocalLive, &name).await?;
        publisher.external_channel = self.get_field(FieldGroup::ExternalChannel, &name).await?;
        publisher.external_live = self.get_field(FieldGroup::ExternalLive, &name).await?;
        publisher.stream_info = self.get_field(FieldGroup::StreamInfo, &name).await?;
        publisher.pending_notification = self.get_field(FieldGroup::Notification, &name).await?;
        Ok(())
    }
}
