//! Display refresh
//!
//! Decides what to repaint and in which order. The artwork itself comes
//! from the [`WatchFace`](crate::traits::WatchFace) and
//! [`InfoScreen`](crate::traits::InfoScreen) implementations.

pub mod refresh;

pub use refresh::RefreshScheduler;
