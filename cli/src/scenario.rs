use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, bail};
use convo_core::{Peer, StoredMessage, UserIdentity};
use serde::Deserialize;

/// A scripted session: seeded threads plus the steps to replay against a view.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub me: Option<UserIdentity>,
    #[serde(default)]
    pub threads: BTreeMap<String, Vec<StoredMessage>>,
    /// peer id -> error message; fetches for these peers fail as `unavailable`.
    #[serde(default)]
    pub fail: BTreeMap<String, String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Select(Peer),
    Clear,
    Incoming {
        peer_id: String,
        message: StoredMessage,
    },
    OpenImage(String),
    CloseImage,
    Unmount,
}

impl Step {
    pub fn tag(&self) -> &'static str {
        match self {
            Step::Select(_) => "select",
            Step::Clear => "clear",
            Step::Incoming { .. } => "incoming",
            Step::OpenImage(_) => "open_image",
            Step::CloseImage => "close_image",
            Step::Unmount => "unmount",
        }
    }
}

pub fn parse(json: &str) -> anyhow::Result<Scenario> {
    let scenario: Scenario = serde_json::from_str(json).context("parse scenario json")?;
    if scenario.steps.is_empty() {
        bail!("scenario has no steps");
    }
    if let Some(pos) = scenario.steps.iter().position(|s| *s == Step::Unmount) {
        if pos + 1 != scenario.steps.len() {
            bail!("unmount must be the last step (found at step {pos})");
        }
    }
    Ok(scenario)
}

pub fn load(path: &Path) -> anyhow::Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read scenario {}", path.display()))?;
    parse(&json).with_context(|| format!("load scenario {}", path.display()))
}
