//! Domain models for the medigive system.

mod donation;
mod medicine;
mod ngo;
mod notification;
mod wishlist;

pub use donation::*;
pub use medicine::*;
pub use ngo::*;
pub use notification::*;
pub use wishlist::*;
