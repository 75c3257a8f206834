//! Mock host implementations shared by the orchestrator and service tests.

use crate::schema::Snapshot;
use crate::sink::SnapshotSink;
use anyhow::{bail, Result};
use async_trait::async_trait;
use page_host::{AdServer, AuctionEvent, AuctionProvider, SlotHandle};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Records the order of host calls so tests can assert sequencing.
#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Scriptable stand-in for the bidding library.
#[derive(Clone)]
pub struct MockAuction {
    ready: Arc<AtomicBool>,
    events: Arc<Mutex<Vec<AuctionEvent>>>,
    fail_event_reads: bool,
    fail_bid_requests: bool,
    log: Arc<CallLog>,
}

impl MockAuction {
    pub fn ready(log: Arc<CallLog>) -> Self {
        Self::new(true, log)
    }

    pub fn not_ready(log: Arc<CallLog>) -> Self {
        Self::new(false, log)
    }

    fn new(ready: bool, log: Arc<CallLog>) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(ready)),
            events: Arc::new(Mutex::new(Vec::new())),
            fail_event_reads: false,
            fail_bid_requests: false,
            log,
        }
    }

    pub fn failing_event_reads(mut self) -> Self {
        self.fail_event_reads = true;
        self
    }

    pub fn failing_bid_requests(mut self) -> Self {
        self.fail_bid_requests = true;
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_events(&self, events: Vec<AuctionEvent>) {
        *self.events.lock().unwrap() = events;
    }
}

#[async_trait]
impl AuctionProvider for MockAuction {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn events(&self) -> Result<Vec<AuctionEvent>> {
        if self.fail_event_reads {
            bail!("event log unavailable");
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn request_bids(&self, ad_unit_codes: Vec<String>) -> Result<()> {
        self.log
            .push(format!("request_bids:{}", ad_unit_codes.join(",")));
        if self.fail_bid_requests {
            bail!("bid request failed");
        }
        Ok(())
    }
}

/// Scriptable stand-in for the tag-serving library.
#[derive(Clone)]
pub struct MockAdServer {
    slots: Arc<Vec<SlotHandle>>,
    log: Arc<CallLog>,
}

impl MockAdServer {
    pub fn with_slots(log: Arc<CallLog>, slots: Vec<SlotHandle>) -> Self {
        Self {
            slots: Arc::new(slots),
            log,
        }
    }
}

#[async_trait]
impl AdServer for MockAdServer {
    async fn is_ready(&self) -> bool {
        true
    }

    async fn slots(&self) -> Result<Vec<SlotHandle>> {
        self.log.push("slots");
        Ok(self.slots.as_ref().clone())
    }

    async fn refresh(&self, slots: &[SlotHandle]) -> Result<()> {
        let ids: Vec<&str> = slots.iter().map(|s| s.element_id.as_str()).collect();
        self.log.push(format!("refresh:{}", ids.join(",")));
        Ok(())
    }
}

/// Sink recording every publish and counting clears.
#[derive(Clone, Default)]
pub struct MockSink {
    published: Arc<Mutex<Vec<Snapshot>>>,
    clears: Arc<AtomicUsize>,
}

impl MockSink {
    pub fn published(&self) -> Vec<Snapshot> {
        self.published.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSink for MockSink {
    async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        self.published.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
