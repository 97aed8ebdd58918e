//! Listener configuration.

use crate::failure::StackFilter;
use crate::{ReporterError, Result};

/// Env var overriding the flow id.
pub const FLOW_ID_ENV: &str = "TEAMCITY_FLOW_ID";
/// Env var adding comma-separated stack filter markers.
pub const STACK_FILTER_ENV: &str = "TEAMCITY_STACK_FILTER";

/// Identifies the process a message stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(pub u32);

impl FlowId {
    /// The current OS process id.
    pub fn current_process() -> Self {
        FlowId(std::process::id())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::current_process()
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FlowId {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map(FlowId)
            .map_err(|_| ReporterError::InvalidFlowId(s.to_string()))
    }
}

/// Configuration for a [`crate::TeamCityListener`].
#[derive(Debug, Clone, Default)]
pub struct ListenerConfig {
    /// Value of the `flowId` attribute
    pub flow_id: FlowId,
    /// Filter applied to failure stack traces
    pub stack_filter: StackFilter,
}

impl ListenerConfig {
    pub fn with_flow_id(mut self, flow_id: FlowId) -> Self {
        self.flow_id = flow_id;
        self
    }

    pub fn with_stack_filter(mut self, stack_filter: StackFilter) -> Self {
        self.stack_filter = stack_filter;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - TEAMCITY_FLOW_ID (optional, default: current process id)
    /// - TEAMCITY_STACK_FILTER (optional) - comma-separated markers added to the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(FLOW_ID_ENV) {
            config.flow_id = raw.parse()?;
        }

        if let Some(raw) = lookup(STACK_FILTER_ENV) {
            for marker in raw.split(',').map(str::trim).filter(|m| !m.is_empty()) {
                config.stack_filter = config.stack_filter.with_marker(marker);
            }
        }

        Ok(config)
    }
}
