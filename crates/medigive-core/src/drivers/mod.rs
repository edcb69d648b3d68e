//! Timer-driven delivery progression.
//!
//! Two independent drivers move claims towards `Delivered`: the global
//! [`PassiveTicker`] and the per-claim [`FastTrack`] run. They may be in
//! flight at the same time; whichever delivers a claim first wins and the
//! other's transition becomes a no-op. Both are tokio tasks that stop when
//! their handle is dropped.

mod fast_track;
mod ticker;

pub use fast_track::*;
pub use ticker::*;
