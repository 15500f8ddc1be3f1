// Trading policy module
pub mod observer;
pub mod trader;

pub use observer::{LogObserver, RecordingObserver, TradeObserver};
pub use trader::{Position, SellGuard, Trader, TraderConfig};
