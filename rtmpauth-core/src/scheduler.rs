//! Poll Scheduler
//!
//! Drives fetch → reconcile → dispatch on a fixed interval. One cycle runs
//! at a time; ticks missed while a cycle is in flight are not queued. The
//! cancellation token is raced against the whole cycle, so cancelling drops
//! any in-flight request and no further store writes happen afterwards.

use parking_lot::RwLock;
use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    notify::NotificationDispatcher,
    store::PublisherStore,
    stream::{ReconcileReport, Reconciler},
    twitch::LiveStatusSource,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Result of one completed cycle
#[derive(Debug, Default, Clone)]
pub struct CycleSummary {
    pub live: usize,
    pub reconciled: ReconcileReport,
    pub delivered: usize,
}

pub struct PollScheduler {
    store: Arc<dyn PublisherStore>,
    fetcher: Arc<dyn LiveStatusSource>,
    reconciler: Arc<Reconciler>,
    dispatcher: Arc<NotificationDispatcher>,
    interval: Duration,
    state: RwLock<SchedulerState>,
    cancel_token: CancellationToken,
}

impl PollScheduler {
    pub fn new(
        store: Arc<dyn PublisherStore>,
        fetcher: Arc<dyn LiveStatusSource>,
        reconciler: Arc<Reconciler>,
        dispatcher: Arc<NotificationDispatcher>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            fetcher,
            reconciler,
            dispatcher,
            interval,
            state: RwLock::new(SchedulerState::Idle),
            cancel_token: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.state.read()
    }

    /// Token that stops the loop; safe to trigger from any task
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// One fetch → reconcile → dispatch pass. A fetch error skips the rest.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        let publishers = self.store.get_all().await?;
        let streams = self.fetcher.fetch_live_channels(&publishers).await?;
        let reconciled = self.reconciler.reconcile(&streams).await?;
        let delivered = self.dispatcher.dispatch_pending().await?;

        Ok(CycleSummary {
            live: streams.len(),
            reconciled,
            delivered,
        })
    }

    /// Spawn the polling loop. The first cycle runs one interval after start.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let cancel_token = self.cancel_token.clone();
        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Poll scheduler started");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel_token.cancelled() => break,
                    _ = timer.tick() => {}
                }

                *self.state.write() = SchedulerState::Running;
                tokio::select! {
                    biased;
                    () = cancel_token.cancelled() => {
                        debug!("Poll cycle abandoned on cancellation");
                        break;
                    }
                    result = self.run_cycle() => Self::log_cycle(result),
                }
                *self.state.write() = SchedulerState::Idle;
            }

            *self.state.write() = SchedulerState::Stopped;
            info!("Poll scheduler stopped");
        })
    }

    fn log_cycle(result: Result<CycleSummary>) {
        match result {
            Ok(summary) => debug!(
                live = summary.live,
                delivered = summary.delivered,
                "Poll cycle complete"
            ),
            Err(e) if e.is_quiet() => debug!(error = %e, "Poll cycle skipped"),
            Err(e) => error!(error = %e, "Poll cycle failed"),
        }
    }
}
