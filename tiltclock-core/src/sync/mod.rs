//! Wireless time synchronisation
//!
//! A sync attempt scans for a peer offering the Current Time Service,
//! reads its time and hands the result back through a [`SyncMailbox`].
//! The attempt blocks for seconds, so the platform runs it in its own
//! context through a [`SyncWorker`]; the main loop only polls the
//! [`SyncScheduler`], which decides when to start the next attempt and
//! drains finished ones.

pub mod mailbox;
pub mod scheduler;
pub mod worker;

use thiserror::Error;
use tiltclock_protocol::CtsError;

use crate::calendar::{CalendarError, CalendarTime};
use crate::traits::RadioError;

pub use mailbox::SyncMailbox;
pub use scheduler::SyncScheduler;
pub use worker::{SpawnError, SyncWorker};

/// Why a sync attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// No advertiser listed the Current Time Service
    #[error("no time service found")]
    NoTimeService,
    #[error("radio: {0}")]
    Radio(#[from] RadioError),
    #[error("current time decode: {0}")]
    Decode(#[from] CtsError),
    #[error("current time out of range: {0}")]
    Range(#[from] CalendarError),
}

/// Result of one sync attempt
pub type SyncOutcome = Result<CalendarTime, SyncError>;
