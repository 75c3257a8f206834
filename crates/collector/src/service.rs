//! The collector service: waits for the host libraries, re-derives the
//! parameter snapshot on every slot response, and publishes changes.

use crate::diff::SnapshotCell;
use crate::extract::normalize_events;
use crate::index::build_snapshot;
use crate::refresh::RefreshOrchestrator;
use crate::sink::SnapshotSink;
use anyhow::Result;
use common::ControlCommand;
use metrics::counter;
use page_host::{AdServer, AuctionProvider, PageEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Tuning knobs for the collector service.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Interval between readiness probes. The wait itself is deliberately
    /// unbounded: the page may load its libraries at any time after this
    /// service starts.
    pub poll_interval: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Event-driven collector over the two host library seams.
///
/// One task owns all snapshot state; collection passes and refresh cycles
/// are serialized through its run loop, which is what keeps the differ's
/// single-writer property intact on a multi-threaded runtime.
pub struct CollectorService<A, G, S> {
    auction: A,
    ad_server: G,
    sink: S,
    config: CollectorConfig,
    cell: SnapshotCell,
    refresher: RefreshOrchestrator,
    page_events_rx: mpsc::Receiver<PageEvent>,
    command_rx: mpsc::Receiver<ControlCommand>,
}

impl<A, G, S> CollectorService<A, G, S>
where
    A: AuctionProvider,
    G: AdServer,
    S: SnapshotSink,
{
    pub fn new(
        auction: A,
        ad_server: G,
        sink: S,
        config: CollectorConfig,
        page_events_rx: mpsc::Receiver<PageEvent>,
        command_rx: mpsc::Receiver<ControlCommand>,
    ) -> Self {
        Self {
            auction,
            ad_server,
            sink,
            config,
            cell: SnapshotCell::new(),
            refresher: RefreshOrchestrator::new(),
            page_events_rx,
            command_rx,
        }
    }

    /// Run until shutdown. Collection failures degrade to "no data this
    /// pass"; nothing on the event path ends the loop.
    pub async fn run(mut self) -> Result<()> {
        // Whatever a previous page session left behind is meaningless now.
        if let Err(error) = self.sink.clear().await {
            warn!(%error, "failed to clear stored snapshot on startup");
        }

        self.await_readiness().await;
        info!("host libraries ready, collecting initial data");

        // Some slots may have responded before we hooked in.
        self.collect_and_publish().await;

        loop {
            tokio::select! {
                biased;

                command = self.command_rx.recv() => match command {
                    Some(ControlCommand::ClearAndRefresh) => self.clear_and_refresh().await,
                    Some(ControlCommand::Shutdown) | None => {
                        info!("collector service shutting down");
                        break;
                    }
                },

                event = self.page_events_rx.recv() => match event {
                    Some(PageEvent::SlotResponse { element_id }) => {
                        debug!(%element_id, "slot response received, collecting");
                        self.collect_and_publish().await;
                    }
                    None => {
                        warn!("page event stream ended unexpectedly");
                        break;
                    }
                },
            }
        }

        Ok(())
    }

    /// Poll until both host libraries expose what we need. Never errors,
    /// never backs off, never gives up; only the eventual ready signal
    /// matters. Runs exactly once, at the top of `run`.
    async fn await_readiness(&self) {
        let mut ticker = interval(self.config.poll_interval);
        loop {
            ticker.tick().await;
            if self.auction.is_ready().await && self.ad_server.is_ready().await {
                return;
            }
            debug!("host libraries not ready, retrying");
        }
    }

    /// One collection pass: read the event log, rebuild the snapshot, and
    /// publish it if it differs from the last published one.
    async fn collect_and_publish(&mut self) {
        counter!("bidlens_collection_passes_total").increment(1);

        let events = match self.auction.events().await {
            Ok(events) => events,
            Err(error) => {
                warn!(%error, "failed to read auction event log, skipping pass");
                return;
            }
        };

        let records = normalize_events(&events);
        counter!("bidlens_bids_seen_total").increment(records.len() as u64);

        let snapshot = build_snapshot(records);
        match self.cell.replace_if_changed(snapshot) {
            Some(changed) => {
                info!(
                    slots = changed.slots.len(),
                    partners = changed.partners.len(),
                    "snapshot changed, publishing"
                );
                match self.sink.publish(changed).await {
                    Ok(()) => {
                        counter!("bidlens_snapshot_publishes_total").increment(1);
                    }
                    Err(error) => error!(%error, "failed to publish snapshot"),
                }
            }
            None => {
                debug!("no new data, skipping publish");
                counter!("bidlens_snapshot_unchanged_total").increment(1);
            }
        }
    }

    /// Handle the clear-and-refresh command: drop the published artifact and
    /// the diff state first, then re-run the auction.
    async fn clear_and_refresh(&mut self) {
        info!("clear-and-refresh command received");
        self.cell.reset();
        if let Err(error) = self.sink.clear().await {
            warn!(%error, "failed to clear stored snapshot");
        }
        match self.refresher.run(&self.auction, &self.ad_server).await {
            Ok(outcome) => debug!(?outcome, "refresh cycle finished"),
            Err(error) => warn!(%error, "refresh cycle failed"),
        }
    }
}
