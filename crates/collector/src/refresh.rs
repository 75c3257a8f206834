//! Refresh orchestrator: re-run the auction for every known slot, and only
//! re-serve creative for those slots once the bids are back.

use anyhow::Result;
use metrics::counter;
use page_host::{AdServer, AuctionProvider, SlotHandle};
use tracing::{info, warn};

/// Orchestrator phase. `Refreshing` covers the span between requesting bids
/// and issuing the ad-server refresh for the same slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// How a refresh attempt ended. None of these are errors; a skipped attempt
/// is observable but never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Bids returned and the slots were re-served.
    Completed { slot_count: usize },
    /// Nothing to do: the ad server has no registered slots.
    NoSlots,
    /// A host capability was missing at refresh time.
    HostUnavailable,
}

#[derive(Debug, Default)]
pub struct RefreshOrchestrator {
    state: RefreshState,
}

impl RefreshOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Run one refresh cycle.
    ///
    /// The ad-server refresh is issued strictly after the bid request
    /// completes; re-serving earlier would fill the slots with stale or
    /// empty creative. There is no timeout while waiting for bids: a host
    /// that never completes leaves the orchestrator in `Refreshing`.
    pub async fn run<A, G>(&mut self, auction: &A, ad_server: &G) -> Result<RefreshOutcome>
    where
        A: AuctionProvider,
        G: AdServer,
    {
        if !auction.is_ready().await || !ad_server.is_ready().await {
            warn!("host libraries unavailable, skipping refresh");
            counter!("bidlens_refresh_attempts_total", "outcome" => "unavailable").increment(1);
            return Ok(RefreshOutcome::HostUnavailable);
        }

        let slots = ad_server.slots().await?;
        if slots.is_empty() {
            info!("no ad slots registered, nothing to refresh");
            counter!("bidlens_refresh_attempts_total", "outcome" => "no_slots").increment(1);
            return Ok(RefreshOutcome::NoSlots);
        }

        info!(slot_count = slots.len(), "requesting new bids before refresh");
        self.state = RefreshState::Refreshing;
        let result = request_then_refresh(auction, ad_server, &slots).await;
        self.state = RefreshState::Idle;

        match &result {
            Ok(_) => {
                counter!("bidlens_refresh_attempts_total", "outcome" => "completed").increment(1);
            }
            Err(error) => {
                warn!(%error, "refresh attempt failed, not retrying");
                counter!("bidlens_refresh_attempts_total", "outcome" => "failed").increment(1);
            }
        }
        result
    }
}

async fn request_then_refresh<A, G>(
    auction: &A,
    ad_server: &G,
    slots: &[SlotHandle],
) -> Result<RefreshOutcome>
where
    A: AuctionProvider,
    G: AdServer,
{
    let ad_unit_codes: Vec<String> = slots.iter().map(|s| s.ad_unit_path.clone()).collect();

    // Resolves only once the bidding library reports bids back.
    auction.request_bids(ad_unit_codes).await?;

    info!(slot_count = slots.len(), "bids returned, refreshing slots");
    ad_server.refresh(slots).await?;

    Ok(RefreshOutcome::Completed {
        slot_count: slots.len(),
    })
}
