//! Live delivery tracking for a single claim.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{CoreError, CoreResult};

/// Step shown to the user while a delivery is being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackStage {
    AssigningCourier,
    PickedUp,
    InTransit,
    Finalizing,
    Delivered,
}

impl TrackStage {
    pub fn label(self) -> &'static str {
        match self {
            TrackStage::AssigningCourier => "Assigning Courier...",
            TrackStage::PickedUp => "Medicine Picked Up...",
            TrackStage::InTransit => "In Transit to Clinic...",
            TrackStage::Finalizing => "Finalizing Delivery...",
            TrackStage::Delivered => "Delivered",
        }
    }
}

/// Stage for a progress percentage in `0..=100`.
pub fn stage_for(percent: f64) -> TrackStage {
    if percent < 25.0 {
        TrackStage::AssigningCourier
    } else if percent < 50.0 {
        TrackStage::PickedUp
    } else if percent < 85.0 {
        TrackStage::InTransit
    } else {
        TrackStage::Finalizing
    }
}

/// One progress frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackProgress {
    pub percent: f64,
    pub stage: TrackStage,
}

impl TrackProgress {
    fn at(percent: f64) -> Self {
        Self {
            percent,
            stage: stage_for(percent),
        }
    }

    fn delivered() -> Self {
        Self {
            percent: 100.0,
            stage: TrackStage::Delivered,
        }
    }
}

/// Pacing of a live run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackTiming {
    /// Span of the animation
    pub duration: Duration,
    /// Interval between progress frames
    pub frame: Duration,
    /// Pause between reaching 100% and committing the delivery
    pub settle: Duration,
}

impl TrackTiming {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            duration: config.fast_track_duration(),
            frame: config.fast_track_frame(),
            settle: config.fast_track_settle(),
        }
    }
}

impl Default for TrackTiming {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// How a live run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// This run delivered the claim
    Delivered,
    /// The claim had already been delivered by the time the run finished
    AlreadyDelivered,
    Cancelled,
}

/// Handle to a running delivery animation. Dropping it cancels the run.
pub struct FastTrack {
    claim_id: String,
    progress: watch::Receiver<TrackProgress>,
    task: Option<JoinHandle<CoreResult<bool>>>,
}

impl FastTrack {
    pub(crate) fn start(engine: Arc<Engine>, claim_id: String, timing: TrackTiming) -> CoreResult<Self> {
        let handle = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        let (tx, progress) = watch::channel(TrackProgress::at(0.0));

        info!("Live tracking started for claim {}", claim_id);
        let task = handle.spawn(run(engine, claim_id.clone(), timing, tx));
        Ok(Self {
            claim_id,
            progress,
            task: Some(task),
        })
    }

    pub fn claim_id(&self) -> &str {
        &self.claim_id
    }

    /// Latest published frame.
    pub fn progress(&self) -> TrackProgress {
        *self.progress.borrow()
    }

    /// Receiver notified on every new frame.
    pub fn subscribe(&self) -> watch::Receiver<TrackProgress> {
        self.progress.clone()
    }

    /// Abort the run. Nothing is committed if it had not finished yet.
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait for the run to finish or be cancelled.
    pub async fn wait(mut self) -> CoreResult<TrackOutcome> {
        let Some(task) = self.task.take() else {
            return Ok(TrackOutcome::Cancelled);
        };
        match task.await {
            Ok(Ok(true)) => Ok(TrackOutcome::Delivered),
            Ok(Ok(false)) => Ok(TrackOutcome::AlreadyDelivered),
            Ok(Err(e)) => Err(e),
            Err(e) if e.is_cancelled() => Ok(TrackOutcome::Cancelled),
            Err(e) => Err(CoreError::Runtime(e.to_string())),
        }
    }
}

impl Drop for FastTrack {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    engine: Arc<Engine>,
    claim_id: String,
    timing: TrackTiming,
    tx: watch::Sender<TrackProgress>,
) -> CoreResult<bool> {
    let start = Instant::now();
    let mut frames = interval_at(start + timing.frame, timing.frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        frames.tick().await;
        let elapsed = start.elapsed();
        let percent = (elapsed.as_secs_f64() / timing.duration.as_secs_f64() * 100.0).min(100.0);
        tx.send_replace(TrackProgress::at(percent));
        if elapsed >= timing.duration {
            break;
        }
    }

    sleep(timing.settle).await;
    // Once started on the blocking pool the commit runs to completion even if the run is aborted.
    let commit = {
        let claim_id = claim_id.clone();
        tokio::task::spawn_blocking(move || engine.complete_fast_track(&claim_id))
    };
    let changed = commit.await.map_err(|e| CoreError::Runtime(e.to_string()))??;
    tx.send_replace(TrackProgress::delivered());
    debug!("Live tracking for claim {} finished (changed: {})", claim_id, changed);
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Tracking;
    use crate::fixtures::{config, medicine};
    use crate::lifecycle::{DonationTarget, SubmitRequest};
    use crate::models::DonationStatus;

    fn engine_with_claim() -> (Arc<Engine>, String, String) {
        let engine = Arc::new(Engine::open(config()).unwrap());
        let submission = engine
            .submit_donation(SubmitRequest {
                medicine: medicine("Amoxicillin"),
                address: "12 Elm Street".into(),
                target: Some(DonationTarget {
                    ngo_id: "ngo1".into(),
                    wishlist_item_id: Some("w2".into()),
                }),
            })
            .unwrap();
        (engine, submission.donation_id, submission.claim_id.unwrap())
    }

    fn live(engine: &Arc<Engine>, claim_id: &str) -> FastTrack {
        match engine.track(claim_id).unwrap() {
            Tracking::Live(run) => run,
            Tracking::Summary(_) => panic!("expected a live run"),
        }
    }

    #[test]
    fn test_stage_thresholds() {
        assert_eq!(stage_for(0.0), TrackStage::AssigningCourier);
        assert_eq!(stage_for(24.9), TrackStage::AssigningCourier);
        assert_eq!(stage_for(25.0), TrackStage::PickedUp);
        assert_eq!(stage_for(49.9), TrackStage::PickedUp);
        assert_eq!(stage_for(50.0), TrackStage::InTransit);
        assert_eq!(stage_for(84.9), TrackStage::InTransit);
        assert_eq!(stage_for(85.0), TrackStage::Finalizing);
        assert_eq!(stage_for(100.0), TrackStage::Finalizing);
        assert_eq!(TrackStage::InTransit.label(), "In Transit to Clinic...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_delivers_both_records() {
        let (engine, donation_id, claim_id) = engine_with_claim();
        let run = live(&engine, &claim_id);
        assert_eq!(run.claim_id(), claim_id);

        assert_eq!(run.wait().await.unwrap(), TrackOutcome::Delivered);

        let state = engine.snapshot().unwrap();
        assert_eq!(state.claim(&claim_id).unwrap().status, DonationStatus::Delivered);
        assert_eq!(state.donation(&donation_id).unwrap().status, DonationStatus::Delivered);
        let messages: Vec<_> = engine.notifications().into_iter().map(|n| n.message).collect();
        assert!(messages.contains(&"Delivery verified & completed for St. Mary Community Clinic!".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_frames() {
        let (engine, _, claim_id) = engine_with_claim();
        let run = live(&engine, &claim_id);

        tokio::time::sleep(Duration::from_millis(2_025)).await;
        let frame = run.progress();
        assert!((frame.percent - 25.0).abs() < 1.0, "percent was {}", frame.percent);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(run.progress().stage, TrackStage::InTransit);

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(run.progress().stage, TrackStage::Finalizing);
        assert_eq!(engine.snapshot().unwrap().claim(&claim_id).unwrap().status, DonationStatus::Accepted);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(run.progress().stage, TrackStage::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_commits_nothing() {
        let (engine, _, claim_id) = engine_with_claim();
        let run = live(&engine, &claim_id);

        tokio::time::sleep(Duration::from_secs(3)).await;
        run.cancel();
        assert_eq!(run.wait().await.unwrap(), TrackOutcome::Cancelled);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.snapshot().unwrap().claim(&claim_id).unwrap().status, DonationStatus::Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (engine, _, claim_id) = engine_with_claim();
        drop(live(&engine, &claim_id));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.snapshot().unwrap().claim(&claim_id).unwrap().status, DonationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_blocked_commit_leaves_runtime_free() {
        let (engine, _, claim_id) = engine_with_claim();
        let timing = TrackTiming {
            duration: Duration::from_millis(20),
            frame: Duration::from_millis(5),
            settle: Duration::ZERO,
        };
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let holder = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                engine.with_db_locked(|| {
                    locked_tx.send(()).unwrap();
                    std::thread::sleep(Duration::from_millis(400));
                })
            })
        };
        locked_rx.recv().unwrap();

        let run = FastTrack::start(Arc::clone(&engine), claim_id.clone(), timing).unwrap();
        let started = std::time::Instant::now();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(started.elapsed() < Duration::from_millis(300), "runtime stalled for {:?}", started.elapsed());

        holder.join().unwrap();
        assert_eq!(run.wait().await.unwrap(), TrackOutcome::Delivered);
        assert_eq!(engine.snapshot().unwrap().claim(&claim_id).unwrap().status, DonationStatus::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_with_passive_delivery() {
        let (engine, _, claim_id) = engine_with_claim();
        let run = live(&engine, &claim_id);

        engine.advance_passive().unwrap();
        engine.advance_passive().unwrap();
        let ledger_len = engine.snapshot().unwrap().ledger.len();

        assert_eq!(run.wait().await.unwrap(), TrackOutcome::AlreadyDelivered);
        assert_eq!(engine.snapshot().unwrap().ledger.len(), ledger_len);
        engine.verify_ledger().unwrap();
    }
}
