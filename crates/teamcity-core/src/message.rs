//! Service message types and encoding.
//!
//! Every message renders as exactly one line:
//!
//! ```text
//! ##teamcity[<type> key1='value1' key2='value2']
//! ```
//!
//! Attributes keep insertion order. The encoder appends `name`, `timestamp`
//! and `flowId` after the caller's explicit params unless the caller already
//! supplied them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::FlowId;
use crate::escape::escape_value;
use crate::subject::{derive_name, Subject};
use crate::timestamp::{format_timestamp, Clock, SystemClock};
use crate::ReporterError;

/// Prefix of every service message line.
pub const MESSAGE_PREFIX: &str = "##teamcity[";

/// Service message names used by the test reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    TestSuiteStarted,
    TestSuiteFinished,
    TestStarted,
    TestFailed,
    TestIgnored,
    TestFinished,
}

impl MessageType {
    pub const ALL: [MessageType; 6] = [
        MessageType::TestSuiteStarted,
        MessageType::TestSuiteFinished,
        MessageType::TestStarted,
        MessageType::TestFailed,
        MessageType::TestIgnored,
        MessageType::TestFinished,
    ];

    /// Wire name of the message.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::TestSuiteStarted => "testSuiteStarted",
            MessageType::TestSuiteFinished => "testSuiteFinished",
            MessageType::TestStarted => "testStarted",
            MessageType::TestFailed => "testFailed",
            MessageType::TestIgnored => "testIgnored",
            MessageType::TestFinished => "testFinished",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReporterError::UnknownMessageType(s.to_string()))
    }
}

/// A single message before rendering: a type plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    pub kind: MessageType,
    params: Vec<(String, String)>,
}

impl ServiceMessage {
    pub fn new(kind: MessageType) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    /// Set an attribute. An existing key keeps its position and gets the new value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key.into(), value.into());
        self
    }

    fn set(&mut self, key: String, value: String) {
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Append an attribute only if the key is not present yet.
    pub fn insert_if_absent(&mut self, key: &str, value: impl FnOnce() -> String) {
        if !self.contains(key) {
            self.params.push((key.to_string(), value()));
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Render as one escaped line, terminator included.
    pub fn render(&self) -> String {
        let mut line = String::with_capacity(64);
        line.push_str(MESSAGE_PREFIX);
        line.push_str(self.kind.as_str());
        for (key, value) in &self.params {
            line.push(' ');
            line.push_str(key);
            line.push_str("='");
            line.push_str(&escape_value(value));
            line.push('\'');
        }
        line.push_str("]\n");
        line
    }
}

/// Builds service messages with derived `name`, `timestamp` and `flowId`.
#[derive(Clone)]
pub struct MessageEncoder {
    flow_id: FlowId,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MessageEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageEncoder")
            .field("flow_id", &self.flow_id)
            .finish_non_exhaustive()
    }
}

impl MessageEncoder {
    /// Encoder reading the system clock.
    pub fn new(flow_id: FlowId) -> Self {
        Self::with_clock(flow_id, Arc::new(SystemClock))
    }

    pub fn with_clock(flow_id: FlowId, clock: Arc<dyn Clock>) -> Self {
        Self { flow_id, clock }
    }

    pub fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    /// Assemble the message: explicit params first, then the implicit trio.
    pub fn build<K, V>(
        &self,
        kind: MessageType,
        subject: &Subject,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceMessage
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut message = ServiceMessage::new(kind);
        for (key, value) in params {
            message.set(key.into(), value.into());
        }
        message.insert_if_absent("name", || derive_name(subject));
        message.insert_if_absent("timestamp", || format_timestamp(&self.clock.now()));
        message.insert_if_absent("flowId", || self.flow_id.to_string());
        message
    }

    /// Encode one message line.
    pub fn encode<K, V>(
        &self,
        kind: MessageType,
        subject: &Subject,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> String
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.build(kind, subject, params).render()
    }
}
