//! Status reporting
//!
//! Every pipeline outcome ends up here. Inline messages live in named slots
//! (one per stage trigger) and each write replaces the slot's previous
//! message. The alert channel holds a single blocking notice until it is
//! dismissed or replaced.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Named inline status slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Upload,
    Build,
    Visualize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => f.write_str("success"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Where a message is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Inline(Slot),
    /// Blocking, modal-style notice
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReporter {
    slots: BTreeMap<Slot, StatusMessage>,
    alert: Option<StatusMessage>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the channel's current message.
    pub fn report(&mut self, channel: Channel, severity: Severity, text: impl Into<String>) {
        let message = StatusMessage {
            severity,
            text: text.into(),
        };
        match channel {
            Channel::Inline(slot) => {
                self.slots.insert(slot, message);
            }
            Channel::Alert => self.alert = Some(message),
        }
    }

    pub fn message(&self, slot: Slot) -> Option<&StatusMessage> {
        self.slots.get(&slot)
    }

    pub fn alert(&self) -> Option<&StatusMessage> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
