//! Passive progression ticker.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::engine::Engine;
use crate::error::{CoreError, CoreResult};

/// Background task advancing every undelivered claim one step per period.
pub struct PassiveTicker {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PassiveTicker {
    /// Spawn the ticker on the current runtime. The first tick fires one full
    /// period after start.
    pub fn start(engine: Arc<Engine>, period: Duration) -> CoreResult<Self> {
        let handle = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        let (shutdown, mut stop) = oneshot::channel();

        let task = handle.spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticks.tick() => {
                        let engine = Arc::clone(&engine);
                        match tokio::task::spawn_blocking(move || engine.advance_passive()).await {
                            Ok(Ok(0)) => {}
                            Ok(Ok(n)) => debug!("Passive tick advanced {} claim(s)", n),
                            Ok(Err(e)) => warn!("Passive tick failed: {}", e),
                            Err(e) => warn!("Passive tick task failed: {}", e),
                        }
                    }
                }
            }
            debug!("Passive ticker stopped");
        });

        info!("Passive ticker started ({:?} period)", period);
        Ok(Self {
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// Stop ticking and wait for the task to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PassiveTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
