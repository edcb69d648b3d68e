//! Explicit clinic wishlist actions.

use log::info;

use crate::db::Dataset;
use crate::error::{CoreError, CoreResult};
use crate::models::{Notice, Urgency, WishlistItem};
use crate::state::AppState;

use super::{require_non_empty, Effects};

/// Append a new need to a clinic's wishlist. Returns the new item's ID.
pub fn add_wishlist_item(
    state: &mut AppState,
    ngo_id: &str,
    medicine_name: &str,
    quantity_needed: u32,
    urgency: Urgency,
    fx: &mut Effects,
) -> CoreResult<String> {
    require_non_empty("medicine name", medicine_name)?;
    let item = WishlistItem::new(medicine_name.trim().to_string(), quantity_needed, urgency)
        .ok_or_else(|| CoreError::InvalidInput("quantity needed must be at least 1".into()))?;
    let idx = state
        .ngo_index(ngo_id)
        .ok_or_else(|| CoreError::NotFound(format!("clinic {}", ngo_id)))?;

    info!("Clinic {} now needs {} x {}", ngo_id, quantity_needed, item.medicine_name);
    fx.notify(Notice::info(format!("Added {} to wishlist", item.medicine_name)));
    fx.touch(Dataset::Ngos);

    let item_id = item.id.clone();
    state.ngos[idx].wishlist.push(item);
    Ok(item_id)
}

/// Drop a need from a clinic's wishlist. Returns `false` if it was not there.
pub fn remove_wishlist_item(
    state: &mut AppState,
    ngo_id: &str,
    item_id: &str,
    fx: &mut Effects,
) -> CoreResult<bool> {
    let idx = state
        .ngo_index(ngo_id)
        .ok_or_else(|| CoreError::NotFound(format!("clinic {}", ngo_id)))?;
    let wishlist = &mut state.ngos[idx].wishlist;
    let before = wishlist.len();
    wishlist.retain(|w| w.id != item_id);

    let removed = wishlist.len() < before;
    if removed {
        info!("Removed wishlist item {} from {}", item_id, ngo_id);
        fx.touch(Dataset::Ngos);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::state;

    #[test]
    fn test_add_appends_in_order() {
        let mut state = state();
        let mut fx = Effects::default();

        let id = add_wishlist_item(&mut state, "ngo1", "Insulin", 6, Urgency::High, &mut fx).unwrap();

        let wishlist = &state.ngo("ngo1").unwrap().wishlist;
        assert_eq!(wishlist.len(), 3);
        assert_eq!(wishlist[2].id, id);
        assert_eq!(wishlist[2].quantity_fulfilled, 0);
        assert_eq!(fx.notices[0].message, "Added Insulin to wishlist");
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut state = state();
        let err = add_wishlist_item(&mut state, "ngo1", "Insulin", 0, Urgency::High, &mut Effects::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        let err = add_wishlist_item(&mut state, "ngo1", " ", 3, Urgency::High, &mut Effects::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        let err = add_wishlist_item(&mut state, "ngo7", "Insulin", 3, Urgency::High, &mut Effects::default()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_remove() {
        let mut state = state();
        let mut fx = Effects::default();
        assert!(remove_wishlist_item(&mut state, "ngo1", "w2", &mut fx).unwrap());
        assert!(fx.touched.contains(&Dataset::Ngos));
        assert!(state.ngo("ngo1").unwrap().find_item("w2").is_none());

        let mut fx = Effects::default();
        assert!(!remove_wishlist_item(&mut state, "ngo1", "w2", &mut fx).unwrap());
        assert!(fx.touched.is_empty());
    }
}
