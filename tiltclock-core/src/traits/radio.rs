//! Time service radio trait
//!
//! The minimum a BLE central needs to offer for a time sync: a blocking
//! scan, a connection to one peer and a GATT characteristic read.

use heapless::Vec;
use thiserror::Error;

/// Maximum advertisements kept from one scan
pub const MAX_SCAN_RESULTS: usize = 8;

/// Maximum legacy advertising payload
pub const MAX_ADV_LEN: usize = 31;

/// Errors from the radio stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    #[error("scan failed")]
    Scan,
    #[error("connect failed")]
    Connect,
    #[error("service not found")]
    ServiceMissing,
    #[error("characteristic not found")]
    CharacteristicMissing,
    #[error("read failed")]
    Read,
}

/// Bluetooth device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress {
    pub bytes: [u8; 6],
    /// Random (as opposed to public) address
    pub random: bool,
}

/// One advertisement seen during a scan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Advertisement {
    pub address: PeerAddress,
    /// Raw AD structures
    pub data: Vec<u8, MAX_ADV_LEN>,
}

/// BLE central used by the sync worker
pub trait TimeServiceRadio {
    /// Scan for `window_s` seconds, blocking, and collect advertisements
    fn scan(
        &mut self,
        window_s: u32,
        results: &mut Vec<Advertisement, MAX_SCAN_RESULTS>,
    ) -> Result<(), RadioError>;

    /// Connect to a peer
    fn connect(&mut self, peer: &PeerAddress) -> Result<(), RadioError>;

    /// Read a characteristic of the connected peer into `buf`
    ///
    /// Returns the number of bytes read.
    fn read_characteristic(
        &mut self,
        service: u16,
        characteristic: u16,
        buf: &mut [u8],
    ) -> Result<usize, RadioError>;

    /// Drop the connection, if any
    fn disconnect(&mut self);
}
