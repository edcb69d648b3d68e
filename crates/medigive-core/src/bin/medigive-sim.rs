//! Command-line simulation of a donation round.
//!
//! Usage: `medigive-sim [config.json]`
//!
//! Scans two packages with a canned analyzer, donates one straight to a
//! clinic and lists the other on the marketplace for a clinic to claim, then
//! lets live tracking and the passive ticker deliver both.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use medigive_core::{
    ClaimDetails, DonationStatus, DonationTarget, Engine, EngineConfig, PassiveTicker, SubmitRequest,
    Tracking,
};
use medigive_vision::MockAnalyzer;

const METFORMIN: &str = r#"{"name":"Metformin","dosage":"500mg","manufacturer":"Sun Pharma","expiryDate":"2027-08-31","isSealed":true,"isUnexpired":true,"isDateEstimated":false,"confidence":0.94}"#;
const AMOXICILLIN: &str = r#"Here is the analysis: {"name":"Amoxicillin","dosage":"250mg","manufacturer":"Cipla","expiryDate":null,"manufactureDate":"2025-03-01","isSealed":true,"isUnexpired":true,"isDateEstimated":true,"confidence":0.81}"#;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading config {}", path))?,
        None => EngineConfig::default().with_env_overrides(),
    };
    let engine = Arc::new(Engine::open(config.clone()).context("opening engine")?);
    let today = chrono::Local::now().date_naive();

    // Targeted donation
    let metformin = engine
        .scan(&MockAnalyzer::responding(METFORMIN, today), Ok(&b"photo-1"[..]), None)
        .context("scanning metformin")?;
    println!("Scanned {} (expires {})", metformin.label(), metformin.expiry_date);
    let targeted = engine.submit_donation(SubmitRequest {
        medicine: metformin,
        address: "12 Elm Street".into(),
        target: Some(DonationTarget {
            ngo_id: "ngo1".into(),
            wishlist_item_id: Some("w1".into()),
        }),
    })?;
    let tracked_claim = targeted
        .claim_id
        .context("targeted donation produced no claim")?;

    // Marketplace donation claimed by a clinic
    let amoxicillin = engine
        .scan(&MockAnalyzer::responding(AMOXICILLIN, today), Ok(&b"photo-2"[..]), None)
        .context("scanning amoxicillin")?;
    println!("Scanned {} (expires {})", amoxicillin.label(), amoxicillin.expiry_date);
    let listed = engine.submit_donation(SubmitRequest {
        medicine: amoxicillin,
        address: "12 Elm Street".into(),
        target: None,
    })?;
    println!("Marketplace: {} donation(s)", engine.marketplace()?.len());
    engine.claim_donation(
        &listed.donation_id,
        ClaimDetails {
            ngo_id: "ngo1".into(),
            ngo_name: "St. Mary Community Clinic".into(),
            shipping_address: "Downtown District Depot".into(),
            payment_method: "NGO Internal Account".into(),
        },
    )?;

    for notification in engine.notifications() {
        println!("[{:?}] {}", notification.kind, notification.message);
    }

    let ticker = PassiveTicker::start(Arc::clone(&engine), config.passive_period())?;

    let run = match engine.track(&tracked_claim)? {
        Tracking::Live(run) => run,
        Tracking::Summary(summary) => {
            println!("Claim {} already delivered", summary.claim.id);
            ticker.stop().await;
            return Ok(());
        }
    };
    let mut frames = run.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_stage = None;
        while frames.changed().await.is_ok() {
            let frame = *frames.borrow();
            if last_stage != Some(frame.stage) {
                println!("{:>5.1}% {}", frame.percent, frame.stage.label());
                last_stage = Some(frame.stage);
            }
        }
    });

    tokio::select! {
        outcome = run.wait() => info!("Live tracking finished: {:?}", outcome?),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            ticker.stop().await;
            return Ok(());
        }
    }
    let _ = printer.await;

    println!("Waiting for passive progression of the claimed donation...");
    let mut poll = tokio::time::interval(config.passive_period() / 2);
    loop {
        tokio::select! {
            _ = poll.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        let state = engine.snapshot()?;
        if state.claims.iter().all(|c| c.status == DonationStatus::Delivered) {
            break;
        }
    }
    ticker.stop().await;

    let state = engine.snapshot()?;
    for claim in &state.claims {
        println!("{} -> {}: {}", claim.medicine_name, claim.ngo_name, claim.status);
    }
    for ngo in &state.ngos {
        println!("{} still needs {} unit(s)", ngo.name, ngo.outstanding_units());
    }
    engine.verify_ledger().context("verifying transition history")?;
    println!("History verified ({} transitions)", state.ledger.len());
    Ok(())
}
