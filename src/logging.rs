//! Subscriber setup for the node.
//!
//! Engine events are emitted under the `momentum` target; `engine_level`
//! controls those separately from everything else. `RUST_LOG`, when set,
//! replaces the configured directives entirely.

use crate::error::{NodeError, NodeResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Target used by every event the execution engine emits.
pub const ENGINE_TARGET: &str = "momentum";

/// `[logging]` section of the node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for crates other than the engine
    pub level: String,

    /// Level for the `momentum` target (block admission, receives, momentums)
    pub engine_level: String,

    pub format: LogFormat,

    pub color: bool,

    /// Log the close of `#[instrument]` spans around engine entry points,
    /// with their busy/idle timings
    pub engine_spans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            engine_level: "info".to_string(),
            format: LogFormat::Text,
            color: true,
            engine_spans: false,
        }
    }
}

impl LogConfig {
    /// Filter directives built from the configured levels.
    pub fn directives(&self) -> String {
        format!("{},{ENGINE_TARGET}={}", self.level, self.engine_level)
    }

    fn filter(&self) -> NodeResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(self.directives())
                .map_err(|e| NodeError::LoggingInit(format!("{}: {e}", self.directives()))),
        }
    }

    fn output_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.engine_spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_target(true)
            .with_span_events(span_events);
        match self.format {
            LogFormat::Text => layer.with_ansi(self.color).boxed(),
            LogFormat::Compact => layer.compact().with_ansi(self.color).boxed(),
            LogFormat::Json => layer.json().with_current_span(false).boxed(),
        }
    }
}

/// Installs the global subscriber. Fails if one is already set or the
/// configured levels are not valid filter directives.
pub fn init_logging(config: &LogConfig) -> NodeResult<()> {
    let filter = config.filter()?;
    tracing_subscriber::registry()
        .with(config.output_layer())
        .with(filter)
        .try_init()
        .map_err(|e| NodeError::LoggingInit(e.to_string()))?;

    tracing::debug!(target: ENGINE_TARGET, directives = %config.directives(), format = ?config.format, "logging initialized");
    Ok(())
}
