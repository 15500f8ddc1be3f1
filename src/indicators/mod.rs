// Candlestick indicators
// Pivot support/resistance and hammer pattern detection

pub mod hammer;
pub mod pivot;

pub use hammer::{detect_hammer, BodyMode, HammerConfig, HammerSignal};
pub use pivot::{PivotAccumulator, PivotInput, PivotLevels, PriceTriple};
