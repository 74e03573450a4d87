use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::cache::{DatasetCache, Refresh};
use crate::state::{Delta, ProviderCommand};

/// Watches the dataset file in a background thread; exits when the UI hangs up.
pub fn spawn_dataset_provider(
    mut cache: DatasetCache,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    poll_interval: Duration,
) {
    thread::spawn(move || {
        let mut last_poll = Instant::now();
        loop {
            thread::sleep(Duration::from_millis(250));

            let mut forced = false;
            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::ReloadDataset => forced = true,
                }
            }

            if !forced && last_poll.elapsed() < poll_interval {
                continue;
            }
            last_poll = Instant::now();

            let refresh = if forced {
                cache.force_reload()
            } else {
                cache.refresh()
            };
            match refresh {
                Refresh::Unchanged => {}
                Refresh::Reloaded(snapshot) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Dataset reloaded from {}: {} matches, {} rows rejected",
                        cache.path().display(),
                        snapshot.matches.len(),
                        snapshot.report.rows_rejected
                    )));
                    if tx.send(Delta::DatasetLoaded(snapshot)).is_err() {
                        break;
                    }
                }
                Refresh::Failed(err) => {
                    if tx
                        .send(Delta::Log(format!("[WARN] Dataset reload failed: {err:#}")))
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    });
}
