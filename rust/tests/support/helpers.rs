#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use convo_core::{ViewReconciler, ViewUpdate};

pub fn wait_until(what: &str, timeout: Duration, f: impl FnMut() -> bool) {
    wait_until_with_poll(what, timeout, Duration::from_millis(20), f);
}

pub fn wait_until_with_poll(
    what: &str,
    timeout: Duration,
    poll: Duration,
    mut f: impl FnMut() -> bool,
) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if f() {
            return;
        }
        std::thread::sleep(poll);
    }
    panic!("{what}: condition not met within {timeout:?}");
}

pub fn write_config(data_dir: &str, v: serde_json::Value) {
    let path = std::path::Path::new(data_dir).join("convo_config.json");
    std::fs::write(path, serde_json::to_vec(&v).unwrap()).unwrap();
}

#[derive(Clone)]
pub struct Collector(pub Arc<Mutex<Vec<ViewUpdate>>>);

impl Collector {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn snapshot(&self) -> Vec<ViewUpdate> {
        self.0.lock().unwrap().clone()
    }

    pub fn scroll_targets(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|u| match u {
                ViewUpdate::ScrollToMessage { message_id, .. } => Some(message_id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ViewReconciler for Collector {
    fn reconcile(&self, update: ViewUpdate) {
        self.0.lock().unwrap().push(update);
    }
}
