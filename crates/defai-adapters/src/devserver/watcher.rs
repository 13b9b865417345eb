//! Watches `manifest.json` and `src/` while the dev server runs.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use defai_core::domain::MANIFEST_FILE;

use super::{DevServerError, PreviewState};

/// Editors save in bursts; one notification per burst is enough.
const DEBOUNCE_MS: u64 = 200;
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// `manifest.json` changed and the new content is being served.
    ManifestReloaded,
    /// `manifest.json` changed but could not be parsed; the old one stays.
    ManifestInvalid(String),
    /// A file under `src/` changed, relative to the project root.
    SourceChanged(PathBuf),
}

pub struct ProjectWatcher {
    watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl ProjectWatcher {
    /// Start watching `project_dir`. Manifest changes are pushed into
    /// `state`; every change is reported through `on_change`.
    pub fn start<F>(
        project_dir: &Path,
        state: PreviewState,
        on_change: F,
    ) -> Result<Self, DevServerError>
    where
        F: Fn(WatchEvent) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Event>(CHANNEL_CAPACITY);
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = tx.try_send(event);
                }
            },
            Config::default(),
        )?;

        let manifest_path = project_dir.join(MANIFEST_FILE);
        let src_dir = project_dir.join("src");
        // The root rather than the file, so editors that save by rename are seen.
        watcher.watch(project_dir, RecursiveMode::NonRecursive)?;
        if src_dir.is_dir() {
            watcher.watch(&src_dir, RecursiveMode::Recursive)?;
        }

        let root = project_dir.to_path_buf();
        let task = tokio::spawn(async move {
            let mut pending: Vec<PathBuf> = Vec::new();
            let debounce = tokio::time::sleep(Duration::from_secs(3600));
            tokio::pin!(debounce);

            loop {
                tokio::select! {
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        if !is_content_change(&event.kind) {
                            continue;
                        }
                        for path in event.paths {
                            let relevant = path == manifest_path || path.starts_with(&src_dir);
                            if relevant && !pending.contains(&path) {
                                pending.push(path);
                            }
                        }
                        debounce
                            .as_mut()
                            .reset(tokio::time::Instant::now() + Duration::from_millis(DEBOUNCE_MS));
                    }
                    _ = &mut debounce, if !pending.is_empty() => {
                        for path in pending.drain(..) {
                            let event = classify(&root, &path, &state).await;
                            debug!(?event, "project change");
                            on_change(event);
                        }
                    }
                }
            }
            debug!("watcher task finished");
        });

        info!(dir = %project_dir.display(), "watching manifest and sources");
        Ok(Self { watcher, task })
    }

    /// Stop watching. Pending notifications are discarded.
    pub fn close(self) {
        drop(self.watcher);
        self.task.abort();
        debug!("watcher closed");
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

async fn classify(root: &Path, path: &Path, state: &PreviewState) -> WatchEvent {
    let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    if relative != Path::new(MANIFEST_FILE) {
        return WatchEvent::SourceChanged(relative);
    }

    match reload_manifest(path).await {
        Ok(manifest) => {
            state.replace_manifest(manifest).await;
            WatchEvent::ManifestReloaded
        }
        Err(reason) => {
            warn!(%reason, "failed to reload manifest");
            WatchEvent::ManifestInvalid(reason)
        }
    }
}

async fn reload_manifest(path: &Path) -> Result<Value, String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}
