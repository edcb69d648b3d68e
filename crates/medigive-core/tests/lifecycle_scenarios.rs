//! End-to-end donation lifecycle scenarios.

use medigive_core::{
    matches, ClaimDetails, CoreError, DonationStatus, DonationTarget, Engine, EngineConfig,
    MedicineRecord, NotificationKind, SubmitRequest, Urgency,
};

fn engine() -> Engine {
    Engine::open(EngineConfig::default()).unwrap()
}

fn medicine(name: &str, dosage: &str) -> MedicineRecord {
    MedicineRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        dosage: dosage.to_string(),
        manufacturer: "Generic Labs".to_string(),
        expiry_date: "2027-12-31".to_string(),
        is_sealed: true,
        is_unexpired: true,
        confidence: 0.9,
        image_ref: None,
    }
}

fn targeted(name: &str, ngo_id: &str, item_id: Option<&str>) -> SubmitRequest {
    SubmitRequest {
        medicine: medicine(name, ""),
        address: "12 Elm Street".to_string(),
        target: Some(DonationTarget {
            ngo_id: ngo_id.to_string(),
            wishlist_item_id: item_id.map(str::to_string),
        }),
    }
}

fn untargeted(name: &str) -> SubmitRequest {
    SubmitRequest {
        medicine: medicine(name, "500mg"),
        address: "12 Elm Street".to_string(),
        target: None,
    }
}

fn claim_details(ngo_id: &str, ngo_name: &str) -> ClaimDetails {
    ClaimDetails {
        ngo_id: ngo_id.to_string(),
        ngo_name: ngo_name.to_string(),
        shipping_address: "Clinic Depot".to_string(),
        payment_method: "Grant".to_string(),
    }
}

#[test]
fn test_matching_examples() {
    assert!(matches("Metformin 500mg", "Metformin"));
    assert!(!matches("Paracetamol", "Amoxicillin"));
}

#[test]
fn test_targeted_metformin_scenario() {
    let engine = engine();

    let submission = engine
        .submit_donation(targeted("Metformin 500mg", "ngo1", Some("w1")))
        .unwrap();

    let state = engine.snapshot().unwrap();
    assert_eq!(state.donations.len(), 1);
    assert_eq!(state.claims.len(), 1);
    assert_eq!(state.donations[0].status, DonationStatus::Accepted);
    assert_eq!(state.claims[0].status, DonationStatus::Accepted);
    assert_eq!(state.claims[0].donation_id, submission.donation_id);
    assert_eq!(state.claims[0].shipping_address, "Direct to Clinic Logistics Center");
    assert_eq!(state.claims[0].payment_method, "NGO Internal Account");

    let w1 = state.ngo("ngo1").unwrap().find_item("w1").unwrap();
    assert_eq!(w1.quantity_fulfilled, 4);
    assert!(!submission.mismatch);
    assert!(submission.requirement_met.is_none());

    let notifications = engine.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].message,
        "Donation recorded for St. Mary Community Clinic. Logistics assigned."
    );
}

#[test]
fn test_untargeted_submission_enters_marketplace() {
    let engine = engine();
    let submission = engine.submit_donation(untargeted("Ibuprofen")).unwrap();

    let state = engine.snapshot().unwrap();
    assert_eq!(state.donations.len(), 1);
    assert!(state.claims.is_empty());
    assert_eq!(state.donations[0].status, DonationStatus::Uploaded);
    assert!(!state.donations[0].is_targeted());

    let marketplace = engine.marketplace().unwrap();
    assert_eq!(marketplace.len(), 1);
    assert_eq!(marketplace[0].id, submission.donation_id);
    assert_eq!(engine.donations_for_donor("user_1").unwrap().len(), 1);
}

#[test]
fn test_mismatched_targeted_submission_still_credits() {
    let engine = engine();
    let submission = engine
        .submit_donation(targeted("Paracetamol", "ngo1", Some("w2")))
        .unwrap();

    assert!(submission.mismatch);
    assert!(submission.claim_id.is_some());

    let notifications = engine.notifications();
    assert_eq!(notifications[0].kind, NotificationKind::Warning);
    assert_eq!(
        notifications[0].message,
        "Warning: Scanned medicine (Paracetamol) does not match requested Amoxicillin."
    );

    // Reconciliation runs by the scanned name: no Paracetamol need at ngo1
    let state = engine.snapshot().unwrap();
    let ngo1 = state.ngo("ngo1").unwrap();
    assert_eq!(ngo1.find_item("w1").unwrap().quantity_fulfilled, 3);
    assert_eq!(ngo1.find_item("w2").unwrap().quantity_fulfilled, 0);
}

#[test]
fn test_requirement_met_removes_item() {
    let engine = engine();
    engine.add_wishlist_item("ngo2", "Insulin", 1, Urgency::Critical).unwrap();

    let submission = engine
        .submit_donation(targeted("Insulin Glargine", "ngo2", None))
        .unwrap();

    let met = submission.requirement_met.unwrap();
    assert_eq!(met.medicine_name, "Insulin");
    let ngo2 = engine.snapshot().unwrap().ngo("ngo2").unwrap().clone();
    assert!(ngo2.wishlist.iter().all(|w| w.medicine_name != "Insulin"));

    let messages: Vec<_> = engine.notifications().into_iter().map(|n| n.message).collect();
    assert!(messages.contains(&"Requirement met and removed from wishlist: Insulin!".to_string()));
}

#[test]
fn test_claim_marketplace_donation() {
    let engine = engine();
    let submission = engine.submit_donation(untargeted("Paracetamol")).unwrap();

    let outcome = engine
        .claim_donation(&submission.donation_id, claim_details("ngo2", "Hope Wellness Foundation"))
        .unwrap();

    let state = engine.snapshot().unwrap();
    let donation = state.donation(&submission.donation_id).unwrap();
    let claim = state.claim(&outcome.claim_id).unwrap();
    assert_eq!(donation.status, DonationStatus::Accepted);
    assert_eq!(claim.status, DonationStatus::Accepted);
    assert_eq!(donation.ngo_id.as_deref(), Some("ngo2"));
    assert_eq!(donation.ngo_name.as_deref(), Some("Hope Wellness Foundation"));

    // Exactly one reconciliation: 12 -> 13
    let paracetamol = state.ngo("ngo2").unwrap().find_item("w3").unwrap();
    assert_eq!(paracetamol.quantity_fulfilled, 13);

    assert!(engine.marketplace().unwrap().is_empty());
    assert_eq!(
        engine.claim_for_donation(&submission.donation_id).unwrap().unwrap().id,
        outcome.claim_id
    );
}

#[test]
fn test_double_claim_rejected() {
    let engine = engine();
    let submission = engine.submit_donation(untargeted("Paracetamol")).unwrap();
    engine
        .claim_donation(&submission.donation_id, claim_details("ngo2", "Hope Wellness Foundation"))
        .unwrap();

    let err = engine
        .claim_donation(&submission.donation_id, claim_details("ngo1", "St. Mary Community Clinic"))
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyClaimed(_)));
    assert_eq!(engine.snapshot().unwrap().claims.len(), 1);
}

#[test]
fn test_claim_requires_logistics_details() {
    let engine = engine();
    let submission = engine.submit_donation(untargeted("Paracetamol")).unwrap();

    let mut details = claim_details("ngo2", "Hope Wellness Foundation");
    details.payment_method = String::new();
    let err = engine.claim_donation(&submission.donation_id, details).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    assert_eq!(engine.marketplace().unwrap().len(), 1);
}

#[test]
fn test_passive_progression_reaches_delivered() {
    let engine = engine();
    let first = engine.submit_donation(targeted("Metformin", "ngo1", Some("w1"))).unwrap();
    let second = engine.submit_donation(untargeted("Paracetamol")).unwrap();
    engine
        .claim_donation(&second.donation_id, claim_details("ngo2", "Hope Wellness Foundation"))
        .unwrap();

    for _ in 0..5 {
        engine.advance_passive().unwrap();
    }

    let state = engine.snapshot().unwrap();
    assert!(state.claims.iter().all(|c| c.status == DonationStatus::Delivered));
    assert!(state.donations.iter().all(|d| d.status == DonationStatus::Delivered));
    assert_eq!(
        state.claim(first.claim_id.as_deref().unwrap()).unwrap().status,
        DonationStatus::Delivered
    );
    assert_eq!(engine.advance_passive().unwrap(), 0);
    engine.verify_ledger().unwrap();
}

#[test]
fn test_fast_track_sets_both_records() {
    let engine = engine();
    let submission = engine.submit_donation(targeted("Metformin", "ngo1", Some("w1"))).unwrap();
    let claim_id = submission.claim_id.unwrap();

    engine.advance_passive().unwrap();
    assert!(engine.complete_fast_track(&claim_id).unwrap());
    assert!(!engine.complete_fast_track(&claim_id).unwrap());

    let state = engine.snapshot().unwrap();
    assert_eq!(state.claim(&claim_id).unwrap().status, DonationStatus::Delivered);
    assert_eq!(state.donation(&submission.donation_id).unwrap().status, DonationStatus::Delivered);

    let history: Vec<_> = state.ledger.history_of(&claim_id).map(|e| e.to).collect();
    assert_eq!(
        history,
        vec![DonationStatus::Accepted, DonationStatus::PickedUp, DonationStatus::Delivered]
    );
}

#[test]
fn test_pickup_address_policy() {
    let engine = engine();
    let mut request = untargeted("Paracetamol");
    request.address = String::new();
    engine.submit_donation(request.clone()).unwrap();

    let strict = Engine::open(EngineConfig {
        require_pickup_address: true,
        ..EngineConfig::default()
    })
    .unwrap();
    let err = strict.submit_donation(request).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(strict.snapshot().unwrap().donations.is_empty());
}

#[test]
fn test_unknown_target_clinic() {
    let engine = engine();
    let err = engine.submit_donation(targeted("Metformin", "ngo9", None)).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
    assert!(engine.snapshot().unwrap().donations.is_empty());
}
