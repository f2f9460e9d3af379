//! Config file watcher.
//!
//! Monitors the config file for changes using the `notify` crate and sends
//! debounced reload signals on a broadcast channel.

use cardboard_common::ConfigError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Watches a config file for changes and sends notifications.
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Create a new watcher for the given config file path.
    pub fn new(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(
                "config file {} does not exist yet, will watch for creation",
                path.display()
            );
        }

        Ok(Self { path })
    }

    /// Watch the config file for changes, sending a signal on the broadcast channel.
    ///
    /// This function runs indefinitely. Changes are debounced with a 500ms window
    /// to avoid rapid reloads when editors do atomic save (write + rename).
    ///
    /// Sends `()` on the broadcast channel when a change is detected.
    pub async fn watch(&self, tx: broadcast::Sender<()>) -> Result<(), ConfigError> {
        let path = self.path.clone();
        // Watch the parent directory so atomic saves (write to temp + rename)
        // are still observed.
        let watch_path = if let Some(parent) = path.parent() {
            parent.to_path_buf()
        } else {
            path.clone()
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();

        info!("starting config file watcher for {}", path.display());

        // Bridge the sync notify callback into async via an mpsc channel
        let (notify_tx, mut notify_rx) = tokio::sync::mpsc::channel::<()>(16);

        let mut watcher = {
            let file_name = file_name.clone();

            RecommendedWatcher::new(
                move |result: Result<Event, notify::Error>| match result {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            return;
                        }

                        let is_our_file = event
                            .paths
                            .iter()
                            .any(|p| p.file_name().map(|n| n == file_name).unwrap_or(false));

                        if is_our_file {
                            debug!("config file change detected");
                            let _ = notify_tx.try_send(());
                        }
                    }
                    Err(e) => {
                        error!("file watcher error: {e}");
                    }
                },
                notify::Config::default(),
            )
            .map_err(|e| ConfigError::Watch(format!("failed to create watcher: {e}")))?
        };

        watcher
            .watch(&watch_path, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ConfigError::Watch(format!("failed to watch {}: {e}", watch_path.display()))
            })?;

        // Debounce loop: wait for change signals, coalesce within 500ms
        loop {
            if notify_rx.recv().await.is_none() {
                // Channel closed, watcher dropped
                break;
            }

            let debounce = tokio::time::sleep(std::time::Duration::from_millis(500));
            tokio::pin!(debounce);

            loop {
                tokio::select! {
                    _ = &mut debounce => break,
                    msg = notify_rx.recv() => {
                        if msg.is_none() {
                            return Ok(());
                        }
                        // Additional signals within the window are coalesced
                    }
                }
            }

            info!("config file changed, sending reload signal");
            if tx.send(()).is_err() {
                debug!("no receivers for config reload signal");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_accepts_missing_file() {
        let watcher = ConfigWatcher::new(PathBuf::from("/tmp/not_here_yet.toml"));
        assert!(watcher.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn watch_signals_on_file_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();

        let watcher = ConfigWatcher::new(path.clone()).unwrap();
        let (tx, mut rx) = broadcast::channel(4);

        let handle = tokio::spawn(async move { watcher.watch(tx).await });

        // Give the watcher a moment to register before touching the file
        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let signal = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(signal.is_ok(), "no reload signal within 5s");

        handle.abort();
    }
}
