use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use convo_core::{FfiConversationView, StoreErrorKind, ViewAction, ViewState};
use convo_memory_store::{MemoryIdentity, MemoryMessageStore};
use serde_json::json;

use crate::scenario::{Scenario, Step};

const POLL: Duration = Duration::from_millis(25);
const SETTLE_POLLS: u32 = 3;

pub fn run(
    scenario: Scenario,
    data_dir: &Path,
    timeout: Duration,
    out: &mut impl Write,
) -> anyhow::Result<ViewState> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;

    let store = MemoryMessageStore::new();
    for (peer_id, messages) in scenario.threads {
        store
            .insert_thread(&peer_id, messages)
            .with_context(|| format!("seed thread {peer_id}"))?;
    }
    for (peer_id, message) in scenario.fail {
        store.fail_fetches(&peer_id, StoreErrorKind::Unavailable, message);
    }
    let identity = match scenario.me {
        Some(me) => MemoryIdentity::new(&me.user_id, me.avatar_url),
        None => MemoryIdentity::signed_out(),
    };

    let view = FfiConversationView::new(
        data_dir.to_string_lossy().to_string(),
        Box::new(store.clone()),
        Box::new(identity),
    );
    store.attach(&view);

    let mut last = view.state();
    for (idx, step) in scenario.steps.into_iter().enumerate() {
        let tag = step.tag();
        tracing::debug!(step = idx, tag, "replay step");
        apply(&view, &store, step).with_context(|| format!("step {idx} ({tag})"))?;
        last = settle(&view, timeout).with_context(|| format!("step {idx} ({tag})"))?;
        let line = json!({ "step": idx, "action": tag, "state": last });
        writeln!(out, "{line}").context("write output")?;
    }
    Ok(last)
}

fn apply(
    view: &Arc<FfiConversationView>,
    store: &MemoryMessageStore,
    step: Step,
) -> anyhow::Result<()> {
    match step {
        Step::Select(peer) => view.dispatch(ViewAction::SelectPeer { peer }),
        Step::Clear => view.dispatch(ViewAction::ClearPeer),
        Step::Incoming { peer_id, message } => {
            store.receive(&peer_id, message)?;
        }
        Step::OpenImage(image_url) => view.dispatch(ViewAction::OpenImagePreview { image_url }),
        Step::CloseImage => view.dispatch(ViewAction::CloseImagePreview),
        Step::Unmount => view.unmount(),
    }
    Ok(())
}

/// Wait until the view is not loading and its rev has stopped moving.
fn settle(view: &FfiConversationView, timeout: Duration) -> anyhow::Result<ViewState> {
    let start = Instant::now();
    let mut prev = view.state();
    let mut quiet_polls = 0;
    loop {
        std::thread::sleep(POLL);
        let cur = view.state();
        if !cur.is_loading && cur.rev == prev.rev {
            quiet_polls += 1;
            if quiet_polls >= SETTLE_POLLS {
                return Ok(cur);
            }
        } else {
            quiet_polls = 0;
        }
        if start.elapsed() >= timeout {
            return Err(anyhow!(
                "view did not settle within {timeout:?} (rev {}, loading {})",
                cur.rev,
                cur.is_loading
            ));
        }
        prev = cur;
    }
}
