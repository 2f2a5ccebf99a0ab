//! Channel type definitions for inter-task communication

use tokio::sync::mpsc;

use super::types::TradeUpdate;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// Create a new trade update channel with the default buffer size
pub fn create_trade_channel() -> (mpsc::Sender<TradeUpdate>, mpsc::Receiver<TradeUpdate>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new trade update channel with a custom buffer size
pub fn create_trade_channel_with_size(
    size: usize,
) -> (mpsc::Sender<TradeUpdate>, mpsc::Receiver<TradeUpdate>) {
    mpsc::channel(size)
}
