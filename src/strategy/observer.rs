use crate::models::{TradeEvent, TradeSide};

/// Receives position transitions as the trader makes them
pub trait TradeObserver {
    fn on_trade(&mut self, event: &TradeEvent);
}

/// Announces each transition as one log line
#[derive(Debug, Clone, Default)]
pub struct LogObserver;

impl TradeObserver for LogObserver {
    fn on_trade(&mut self, event: &TradeEvent) {
        match event.side {
            TradeSide::Buy => tracing::info!(
                "🟢 Bought {} at {:.2} on {}",
                event.instrument,
                event.price,
                event.date
            ),
            TradeSide::Sell => tracing::info!(
                "🔴 Sold {} at {:.2} on {} (entry {:.2})",
                event.instrument,
                event.price,
                event.date,
                event.entry_price
            ),
        }
    }
}

/// Keeps every event in memory, for callers that want structured results
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Vec<TradeEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TradeEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<TradeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TradeObserver for RecordingObserver {
    fn on_trade(&mut self, event: &TradeEvent) {
        tracing::debug!("Recorded {:?} event for {}", event.side, event.instrument);
        self.events.push(event.clone());
    }
}
