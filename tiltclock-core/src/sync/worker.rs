//! Sync attempt, run outside the main loop

use heapless::Vec;
use thiserror::Error;
use tiltclock_protocol::{
    advertises_service16, CurrentTime, CTS_SERVICE_UUID, CURRENT_TIME_CHAR_UUID, FULL_PAYLOAD_LEN,
};

use super::{SyncError, SyncMailbox, SyncOutcome};
use crate::calendar::CalendarTime;
use crate::fmt::{debug, info, warn};
use crate::traits::{Advertisement, PeerAddress, TimeServiceRadio, MAX_SCAN_RESULTS};

/// The platform could not start a worker context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("failed to start sync worker")]
pub struct SpawnError;

/// Starts sync attempts in an independent execution context
///
/// The implementation owns the radio and must call [`run`] with it in the
/// new context. The mailbox guard is already claimed when `spawn` is
/// called.
pub trait SyncWorker {
    fn spawn(&mut self, mailbox: &'static SyncMailbox, scan_window_s: u32)
        -> Result<(), SpawnError>;
}

/// Worker body: one attempt, then publish the outcome
pub fn run<R: TimeServiceRadio>(radio: &mut R, mailbox: &SyncMailbox, scan_window_s: u32) {
    let outcome = attempt(radio, scan_window_s);
    match &outcome {
        Ok(time) => info!("Time sync succeeded: {:?}", time),
        Err(e) => warn!("Time sync failed: {:?}", e),
    }
    mailbox.complete(outcome);
}

/// Scan, then try every time service advertiser in order
///
/// The first successful read wins. When all advertisers fail the last
/// error is reported.
pub fn attempt<R: TimeServiceRadio>(radio: &mut R, scan_window_s: u32) -> SyncOutcome {
    let mut results: Vec<Advertisement, MAX_SCAN_RESULTS> = Vec::new();
    radio.scan(scan_window_s, &mut results)?;
    debug!("Scan found {} devices", results.len());

    let mut last_error = SyncError::NoTimeService;
    for adv in results
        .iter()
        .filter(|adv| advertises_service16(&adv.data, CTS_SERVICE_UUID))
    {
        match read_time(radio, &adv.address) {
            Ok(time) => return Ok(time),
            Err(e) => {
                debug!("Peer {:?} failed: {:?}", adv.address, e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}

fn read_time<R: TimeServiceRadio>(
    radio: &mut R,
    peer: &PeerAddress,
) -> Result<CalendarTime, SyncError> {
    radio.connect(peer)?;
    let mut buf = [0u8; FULL_PAYLOAD_LEN];
    let read = radio.read_characteristic(CTS_SERVICE_UUID, CURRENT_TIME_CHAR_UUID, &mut buf);
    radio.disconnect();

    let len = read?.min(buf.len());
    let current = CurrentTime::decode(&buf[..len])?;
    Ok(CalendarTime::from_current_time(&current)?)
}
