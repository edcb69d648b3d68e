//! Wishlist reconciliation against fulfillment events.

use log::{debug, info};

use crate::models::Ngo;

use super::name::first_match;

/// Emitted when a wishlist item reaches its target and is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementMet {
    pub ngo_id: String,
    pub item_id: String,
    pub medicine_name: String,
}

impl RequirementMet {
    /// User-facing message for this event.
    pub fn message(&self) -> String {
        format!(
            "Requirement met and removed from wishlist: {}!",
            self.medicine_name
        )
    }
}

/// Credit one fulfilled unit of `fulfilled_medicine_name` against a clinic.
///
/// The first wishlist item (by list order) that fuzzy-matches is incremented;
/// if it reaches its target it is removed and an event is returned. No match
/// leaves the clinic unchanged. Only one item is touched per call.
pub fn reconcile(ngo: &Ngo, fulfilled_medicine_name: &str) -> (Ngo, Option<RequirementMet>) {
    let mut updated = ngo.clone();

    let Some(idx) = first_match(&updated.wishlist, fulfilled_medicine_name) else {
        debug!(
            "No wishlist item at {} matches {}",
            ngo.id, fulfilled_medicine_name
        );
        return (updated, None);
    };

    let item = &mut updated.wishlist[idx];
    item.quantity_fulfilled = item.quantity_fulfilled.saturating_add(1);

    if item.is_met() {
        let removed = updated.wishlist.remove(idx);
        info!(
            "Wishlist item {} ({}) at {} fully met and removed",
            removed.id, removed.medicine_name, ngo.id
        );
        let event = RequirementMet {
            ngo_id: ngo.id.clone(),
            item_id: removed.id,
            medicine_name: removed.medicine_name,
        };
        return (updated, Some(event));
    }

    debug!(
        "Wishlist item {} at {} now {}/{}",
        item.id, ngo.id, item.quantity_fulfilled, item.quantity_needed
    );
    (updated, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Urgency, WishlistItem};

    fn clinic(items: Vec<WishlistItem>) -> Ngo {
        Ngo {
            id: "ngo1".into(),
            name: "St. Mary Community Clinic".into(),
            location: "Downtown District".into(),
            verified: true,
            impact_score: 98.0,
            logo: String::new(),
            wishlist: items,
        }
    }

    fn item(id: &str, name: &str, needed: u32, fulfilled: u32) -> WishlistItem {
        WishlistItem {
            id: id.into(),
            medicine_name: name.into(),
            quantity_needed: needed,
            quantity_fulfilled: fulfilled,
            urgency: Urgency::Critical,
        }
    }

    #[test]
    fn test_last_unit_removes_item() {
        let ngo = clinic(vec![item("w1", "Metformin", 10, 9)]);
        let (updated, event) = reconcile(&ngo, "Metformin");

        assert!(updated.wishlist.is_empty());
        let event = event.unwrap();
        assert_eq!(event.item_id, "w1");
        assert_eq!(event.message(), "Requirement met and removed from wishlist: Metformin!");
    }

    #[test]
    fn test_partial_progress_stays_in_place() {
        let ngo = clinic(vec![
            item("w0", "Amoxicillin", 5, 0),
            item("w1", "Metformin", 10, 3),
        ]);
        let (updated, event) = reconcile(&ngo, "Metformin");

        assert!(event.is_none());
        assert_eq!(updated.wishlist.len(), 2);
        assert_eq!(updated.wishlist[1].id, "w1");
        assert_eq!(updated.wishlist[1].quantity_fulfilled, 4);
        assert_eq!(updated.wishlist[0].quantity_fulfilled, 0);
    }

    #[test]
    fn test_no_match_is_noop() {
        let ngo = clinic(vec![item("w1", "Metformin", 10, 3)]);
        let (updated, event) = reconcile(&ngo, "Paracetamol");

        assert!(event.is_none());
        assert_eq!(updated, ngo);
    }

    #[test]
    fn test_only_first_match_credited() {
        let ngo = clinic(vec![
            item("w1", "Metformin", 10, 3),
            item("w2", "Metformin XR", 4, 1),
        ]);
        let (updated, _) = reconcile(&ngo, "Metformin XR 750mg");

        // "Metformin" is a substring of the donated name and comes first
        assert_eq!(updated.wishlist[0].quantity_fulfilled, 4);
        assert_eq!(updated.wishlist[1].quantity_fulfilled, 1);
    }

    #[test]
    fn test_input_clinic_untouched() {
        let ngo = clinic(vec![item("w1", "Metformin", 10, 9)]);
        let _ = reconcile(&ngo, "Metformin");
        assert_eq!(ngo.wishlist.len(), 1);
    }
}
