//! WebSocket client for the public funding trades feed
//!
//! The stream runs on its own task, independent of the decision cycle: it
//! shares no mutable state with the allocation engine and closing its control
//! channel terminates the read loop without touching the cycle.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, instrument, warn};

use super::decode;
use super::messages::WsSubscribeMessage;
use crate::common::errors::{ClientError, Result};
use crate::common::types::TradeUpdate;

/// Handle to a running trade subscription
pub struct TradeStream {
    /// Shutdown signal for the read loop
    shutdown: mpsc::Sender<()>,
    /// Connected state flag
    is_connected: Arc<AtomicBool>,
}

impl TradeStream {
    /// Connect, subscribe to the trades channel for `symbol`, and forward
    /// decoded executions to `event_sender` until closed.
    #[instrument(skip(event_sender))]
    pub async fn connect(
        url: &str,
        symbol: &str,
        event_sender: mpsc::Sender<TradeUpdate>,
    ) -> Result<Self> {
        info!("Connecting to trades feed: {}", url);

        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::WebSocketConnection(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        let subscribe = WsSubscribeMessage::trades(symbol);
        let msg_json = serde_json::to_string(&subscribe)?;
        debug!("Sending subscription message: {}", msg_json);
        write.send(Message::Text(msg_json)).await?;

        let is_connected = Arc::new(AtomicBool::new(true));
        let connected_flag = is_connected.clone();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Trade stream shutdown requested");
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let frame: Value = match serde_json::from_str(&text) {
                                    Ok(frame) => frame,
                                    Err(e) => {
                                        warn!("Unparseable frame: {}", e);
                                        continue;
                                    }
                                };
                                if let Some(trade) = decode::decode_trade_frame(&frame) {
                                    if event_sender.send(trade).await.is_err() {
                                        debug!("Trade receiver dropped, closing stream");
                                        break;
                                    }
                                }
                            }
                            Some(Ok(Message::Ping(data))) => {
                                let _ = write.send(Message::Pong(data)).await;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                info!("Trades feed closed by server");
                                break;
                            }
                            Some(Err(e)) => {
                                error!("Trades feed read error: {}", e);
                                break;
                            }
                            Some(Ok(_)) => {}
                        }
                    }
                }
            }
            connected_flag.store(false, Ordering::SeqCst);
        });

        Ok(Self {
            shutdown: shutdown_tx,
            is_connected,
        })
    }

    /// Check if the read loop is still running
    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    /// Signal the read loop to terminate
    pub async fn close(&self) {
        let _ = self.shutdown.send(()).await;
    }
}
