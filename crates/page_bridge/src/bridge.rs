//! WebSocket client bridging the collector service to the in-page shim.

use crate::protocol::{PageMessage, ProbeResult, ServiceMessage};
use anyhow::Context;
use async_trait::async_trait;
use collector::schema::Snapshot;
use collector::sink::SnapshotSink;
use common::{ControlCommand, Error, Result};
use futures::{SinkExt, StreamExt};
use page_host::{AdServer, AuctionEvent, AuctionProvider, PageEvent, SlotHandle};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Buffer size for the outbound queue and the notification channels.
const CHANNEL_BUFFER: usize = 64;

struct PageResponse {
    ok: bool,
    payload: Value,
}

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<PageResponse>>>>;

/// Handle to one live bridge connection. Cloneable; all clones share the
/// underlying connection, so the same bridge can serve as auction provider,
/// ad server and snapshot sink at once.
#[derive(Clone)]
pub struct WsPageBridge {
    outbound_tx: mpsc::Sender<ServiceMessage>,
    pending: PendingMap,
    next_id: Arc<AtomicU64>,
}

/// Channels delivering unsolicited page traffic to the collector service.
pub struct BridgeChannels {
    pub page_events_rx: mpsc::Receiver<PageEvent>,
    pub command_rx: mpsc::Receiver<ControlCommand>,
}

impl WsPageBridge {
    /// Connect to the in-page shim and spawn the reader/writer tasks.
    pub async fn connect(url: &str) -> Result<(Self, BridgeChannels)> {
        let url = Url::parse(url)?;
        info!(%url, "connecting to page shim");
        let (ws, _) = connect_async(url.as_str()).await?;
        let (mut ws_tx, mut ws_rx) = ws.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServiceMessage>(CHANNEL_BUFFER);
        let (page_events_tx, page_events_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_BUFFER);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        // Writer: serialize outbound messages onto the socket.
        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(error) => {
                        error!(%error, "failed to encode bridge message");
                        continue;
                    }
                };
                if let Err(error) = ws_tx.send(Message::Text(json)).await {
                    error!(%error, "bridge write failed");
                    break;
                }
            }
        });

        // Reader: route responses to pending calls and notifications to the
        // service channels.
        let reader_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            while let Some(msg) = ws_rx.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => {
                        info!("page shim closed the bridge");
                        break;
                    }
                    Ok(_) => continue,
                    Err(error) => {
                        warn!(%error, "bridge read failed");
                        break;
                    }
                };
                let parsed: PageMessage = match serde_json::from_str(&text) {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        debug!(%error, "ignoring unparseable bridge message");
                        continue;
                    }
                };
                match parsed {
                    PageMessage::Response { id, ok, payload } => {
                        match reader_pending.lock().await.remove(&id) {
                            Some(tx) => {
                                let _ = tx.send(PageResponse { ok, payload });
                            }
                            None => debug!(id, "response for unknown call"),
                        }
                    }
                    PageMessage::SlotResponse { element_id } => {
                        if page_events_tx
                            .send(PageEvent::SlotResponse { element_id })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    PageMessage::RefreshRequested => {
                        if command_tx
                            .send(ControlCommand::ClearAndRefresh)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
            // Fail any calls still waiting so they error instead of hanging.
            reader_pending.lock().await.clear();
        });

        let bridge = Self {
            outbound_tx,
            pending,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        Ok((
            bridge,
            BridgeChannels {
                page_events_rx,
                command_rx,
            },
        ))
    }

    /// Send one correlated request and wait for its answer.
    ///
    /// Deliberately no timeout: `request_bids` may legitimately wait as long
    /// as the page's auction takes.
    async fn call(&self, build: impl FnOnce(u64) -> ServiceMessage) -> Result<PageResponse> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        if self.outbound_tx.send(build(id)).await.is_err() {
            self.pending.lock().await.remove(&id);
            return Err(Error::ChannelClosed);
        }

        match rx.await {
            Ok(response) if response.ok => Ok(response),
            Ok(response) => Err(Error::PageCall(response.payload.to_string())),
            Err(_) => Err(Error::ConnectionClosed),
        }
    }

    /// Send a fire-and-forget notification.
    async fn notify(&self, msg: ServiceMessage) -> Result<()> {
        self.outbound_tx
            .send(msg)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    async fn probe(&self) -> ProbeResult {
        match self.call(|id| ServiceMessage::Probe { id }).await {
            Ok(response) => serde_json::from_value(response.payload).unwrap_or_default(),
            Err(error) => {
                debug!(%error, "probe failed");
                ProbeResult::default()
            }
        }
    }
}

#[async_trait]
impl AuctionProvider for WsPageBridge {
    async fn is_ready(&self) -> bool {
        self.probe().await.auction
    }

    async fn events(&self) -> anyhow::Result<Vec<AuctionEvent>> {
        let response = self.call(|id| ServiceMessage::GetEvents { id }).await?;
        let raw: Vec<Value> =
            serde_json::from_value(response.payload).context("malformed event log payload")?;
        // Unparseable entries are dropped, not fatal; host data is unreliable.
        Ok(raw
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }

    async fn request_bids(&self, ad_unit_codes: Vec<String>) -> anyhow::Result<()> {
        self.call(|id| ServiceMessage::RequestBids { id, ad_unit_codes })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AdServer for WsPageBridge {
    async fn is_ready(&self) -> bool {
        self.probe().await.tags
    }

    async fn slots(&self) -> anyhow::Result<Vec<SlotHandle>> {
        let response = self.call(|id| ServiceMessage::GetSlots { id }).await?;
        serde_json::from_value(response.payload).context("malformed slot list payload")
    }

    async fn refresh(&self, slots: &[SlotHandle]) -> anyhow::Result<()> {
        let element_ids = slots.iter().map(|s| s.element_id.clone()).collect();
        self.call(|id| ServiceMessage::RefreshSlots { id, element_ids })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotSink for WsPageBridge {
    async fn publish(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.notify(ServiceMessage::PublishSnapshot {
            snapshot: snapshot.clone(),
        })
        .await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.notify(ServiceMessage::ClearSnapshot).await?;
        Ok(())
    }
}
