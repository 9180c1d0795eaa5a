//! Reconciler
//!
//! Diffs a freshly fetched external live list against the stored publisher
//! snapshot in two passes. The decay pass settles every publisher that was
//! already live (still live, or finished) before the activation pass marks
//! new sessions, and activation only considers publishers that were offline
//! at the start of the cycle and did not just finish.
//!
//! Mutations are applied as they are decided. An error aborts the cycle
//! without undoing earlier writes.

use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info};

use crate::{
    models::{format_stream_info, ExternalStream, Publisher},
    notify::messages,
    store::PublisherStore,
    twitch::CategoryLookup,
    Result,
};

/// What one reconciliation cycle changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub started: Vec<String>,
    pub finished: Vec<String>,
    pub switched: Vec<String>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.finished.is_empty() && self.switched.is_empty()
    }
}

pub struct Reconciler {
    store: Arc<dyn PublisherStore>,
    categories: Arc<dyn CategoryLookup>,
    viewer_base_url: String,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn PublisherStore>,
        categories: Arc<dyn CategoryLookup>,
        viewer_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            categories,
            viewer_base_url: viewer_base_url.into(),
        }
    }

    pub async fn reconcile(&self, streams: &[ExternalStream]) -> Result<ReconcileReport> {
        let publishers = self.store.get_all().await?;
        let mut report = ReconcileReport::default();

        let finished = self.decay(&publishers, streams, &mut report).await?;
        self.activate(&publishers, streams, &finished, &mut report).await?;

        if !report.is_empty() {
            info!(
                started = report.started.len(),
                finished = report.finished.len(),
                switched = report.switched.len(),
                "Reconciled external live status"
            );
        }
        Ok(report)
    }

    /// Pass 1: publishers live before this cycle. Returns the names that went offline.
    async fn decay(
        &self,
        publishers: &[Publisher],
        streams: &[ExternalStream],
        report: &mut ReconcileReport,
    ) -> Result<HashSet<String>> {
        let mut finished = HashSet::new();

        for publisher in publishers.iter().filter(|p| p.is_external_live()) {
            let mut matched = false;
            let mut previous_info = publisher.stream_info.clone();

            // every match is processed, so the last one in fetch order wins
            for stream in streams.iter().filter(|s| publisher.matches_channel(&s.channel)) {
                matched = true;
                let info = self.stream_info(stream).await?;
                if !previous_info.is_empty() && previous_info != info {
                    let message = messages::stream_info_changed(&publisher.name, &previous_info);
                    self.store.stage_notification(&publisher.name, &message).await?;
                    report.switched.push(publisher.name.clone());
                    debug!(publisher = %publisher.name, "Stream info changed");
                }
                self.store.set_stream_info(&publisher.name, &info).await?;
                previous_info = info;
            }

            if !matched {
                self.store.set_external_live(&publisher.name, "").await?;
                self.store.set_stream_info(&publisher.name, "").await?;
                let message = messages::external_finished(&publisher.name);
                self.store.stage_notification(&publisher.name, &message).await?;
                report.finished.push(publisher.name.clone());
                finished.insert(publisher.name.clone());
                info!(publisher = %publisher.name, "External stream finished");
            }
        }

        Ok(finished)
    }

    /// Pass 2: publishers that were offline at the start of the cycle
    async fn activate(
        &self,
        publishers: &[Publisher],
        streams: &[ExternalStream],
        finished: &HashSet<String>,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        for stream in streams {
            for publisher in publishers.iter().filter(|p| {
                !p.is_external_live() && !finished.contains(&p.name) && p.matches_channel(&stream.channel)
            }) {
                let info = self.stream_info(stream).await?;
                self.store.set_stream_info(&publisher.name, &info).await?;
                self.store
                    .set_external_live(&publisher.name, stream.live_marker())
                    .await?;

                let link = messages::viewer_link(&self.viewer_base_url, &publisher.external_channel);
                let message = messages::external_started(&publisher.name, &info, &link);
                self.store.stage_notification(&publisher.name, &message).await?;

                if !report.started.contains(&publisher.name) {
                    report.started.push(publisher.name.clone());
                }
                info!(publisher = %publisher.name, channel = %stream.channel, "External stream started");
            }
        }
        Ok(())
    }

    async fn stream_info(&self, stream: &ExternalStream) -> Result<String> {
        let category = self.categories.category_name(&stream.category_id).await?;
        Ok(format_stream_info(&stream.title, &category))
    }
}
