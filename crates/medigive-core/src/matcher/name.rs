//! Fuzzy medicine-name comparison.
//!
//! Case-insensitive substring test in both directions: "Metformin" matches
//! "Metformin 500mg" and vice versa. No tokenization, no edit distance. Short
//! or common substrings can false-positive.

use crate::models::WishlistItem;

/// True if either name contains the other after lowercasing.
///
/// An empty name is contained in everything, so it always matches.
pub fn matches(candidate: &str, wanted: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let wanted = wanted.to_lowercase();
    candidate.contains(&wanted) || wanted.contains(&candidate)
}

/// Index of the first wishlist item (by list order) matching `medicine_name`.
pub fn first_match(wishlist: &[WishlistItem], medicine_name: &str) -> Option<usize> {
    wishlist
        .iter()
        .position(|item| matches(&item.medicine_name, medicine_name))
}
