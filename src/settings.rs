use config::{Config, Environment, File, FileFormat, Map, Source};
use serde::{Deserialize, Serialize};

use crate::indicators::HammerConfig;
use crate::instrument::{DayStep, Instrument};
use crate::strategy::TraderConfig;
use crate::Result;

const ENV_PREFIX: &str = "QUOTETRADER";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_FILE: &str = "quotetrader";

/// Instrument parameters for runs that build their own instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InstrumentSettings {
    pub name: String,
    pub dividend_day: u32,
    pub calendar: DayStep,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            name: "SYNTH".to_string(),
            dividend_day: 1,
            calendar: DayStep::Calendar,
        }
    }
}

impl InstrumentSettings {
    /// Empty instrument with these parameters
    pub fn build(&self) -> Result<Instrument> {
        Ok(Instrument::new(self.name.clone())
            .with_dividend_day(self.dividend_day)?
            .with_calendar(self.calendar))
    }
}

/// Settings, layered: defaults, then `quotetrader.toml` (or an explicit
/// file), then `QUOTETRADER__SECTION__KEY` environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub trader: TraderConfig,
    pub hammer: HammerConfig,
    pub instrument: InstrumentSettings,
}

impl Settings {
    /// Load from `path` if given (must exist), else from an optional
    /// `quotetrader.*` file in the working directory
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::assemble(File::with_name(path).required(true), None),
            None => Self::assemble(File::with_name(DEFAULT_FILE).required(false), None),
        }
    }

    /// Load from TOML text, still honouring environment overrides
    pub fn from_toml(contents: &str) -> Result<Self> {
        Self::assemble(File::from_str(contents, FileFormat::Toml), None)
    }

    fn assemble<S>(file: S, env: Option<Map<String, String>>) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}
