use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ViewCore;

pub(crate) const CONFIG_FILE_NAME: &str = "convo_config.json";

const DEFAULT_AVATAR_FALLBACK_URL: &str = "/image.png";
const DEFAULT_FETCH_WORKER_THREADS: usize = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ViewConfig {
    pub(crate) avatar_fallback_url: Option<String>,
    pub(crate) smooth_scroll: Option<bool>,
    // Re-selecting the peer that is already active re-binds the feed unless this is set.
    pub(crate) skip_reselect_same_peer: Option<bool>,
    pub(crate) fetch_worker_threads: Option<usize>,
}

pub(crate) fn load_view_config(data_dir: &str) -> ViewConfig {
    let path = Path::new(data_dir).join(CONFIG_FILE_NAME);
    let Ok(bytes) = std::fs::read(&path) else {
        return ViewConfig::default();
    };
    match serde_json::from_slice::<ViewConfig>(&bytes) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(%e, path = %path.display(), "invalid view config; using defaults");
            ViewConfig::default()
        }
    }
}

pub(crate) fn default_view_config_json() -> String {
    let cfg = ViewConfig {
        avatar_fallback_url: Some(DEFAULT_AVATAR_FALLBACK_URL.to_string()),
        smooth_scroll: Some(true),
        skip_reselect_same_peer: Some(false),
        fetch_worker_threads: Some(DEFAULT_FETCH_WORKER_THREADS),
    };
    serde_json::to_string_pretty(&cfg).unwrap_or_else(|_| "{}".to_string())
}

impl ViewConfig {
    pub(crate) fn fetch_worker_threads(&self) -> usize {
        self.fetch_worker_threads
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_FETCH_WORKER_THREADS)
    }
}

impl ViewCore {
    pub(super) fn avatar_fallback(&self) -> &str {
        self.config
            .avatar_fallback_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_AVATAR_FALLBACK_URL)
    }

    pub(super) fn smooth_scroll(&self) -> bool {
        self.config.smooth_scroll.unwrap_or(true)
    }

    pub(super) fn skip_reselect_same_peer(&self) -> bool {
        self.config.skip_reselect_same_peer.unwrap_or(false)
    }
}
