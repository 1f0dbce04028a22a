//! Advertising data parsing
//!
//! Advertising payloads are a sequence of AD structures:
//! ```text
//! ┌────────┬─────────┬──────────────┐
//! │ LENGTH │ AD TYPE │ DATA         │
//! │ 1B     │ 1B      │ LENGTH-1 B   │
//! └────────┴─────────┴──────────────┘
//! ```
//! A zero length byte ends the significant part of the payload.

use heapless::Vec;

/// Incomplete list of 16-bit service UUIDs
pub const AD_INCOMPLETE_SERVICES_16: u8 = 0x02;
/// Complete list of 16-bit service UUIDs
pub const AD_COMPLETE_SERVICES_16: u8 = 0x03;
/// Shortened local name
pub const AD_SHORT_NAME: u8 = 0x08;
/// Complete local name
pub const AD_COMPLETE_NAME: u8 = 0x09;

/// Maximum 16-bit UUIDs collected from one advertisement
pub const MAX_SERVICES: usize = 16;

/// One AD structure borrowed from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdStructure<'a> {
    /// AD type byte
    pub ad_type: u8,
    /// Data following the type byte
    pub data: &'a [u8],
}

/// Iterator over the AD structures of a payload
///
/// Stops at the first zero length byte or at a structure that runs past
/// the end of the payload.
#[derive(Debug, Clone)]
pub struct AdStructures<'a> {
    remaining: &'a [u8],
}

impl<'a> AdStructures<'a> {
    /// Start iterating over a raw advertising payload
    pub fn new(payload: &'a [u8]) -> Self {
        Self { remaining: payload }
    }
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = AdStructure<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.remaining.split_first()?;
        let len = len as usize;
        if len == 0 || rest.len() < len {
            self.remaining = &[];
            return None;
        }

        let (structure, tail) = rest.split_at(len);
        self.remaining = tail;
        Some(AdStructure {
            ad_type: structure[0],
            data: &structure[1..],
        })
    }
}

/// Collect every 16-bit service UUID listed in the payload
///
/// UUIDs beyond [`MAX_SERVICES`] are dropped.
pub fn service_uuids16(payload: &[u8]) -> Vec<u16, MAX_SERVICES> {
    let mut uuids = Vec::new();
    for ad in AdStructures::new(payload) {
        if ad.ad_type != AD_INCOMPLETE_SERVICES_16 && ad.ad_type != AD_COMPLETE_SERVICES_16 {
            continue;
        }
        for pair in ad.data.chunks_exact(2) {
            if uuids.push(u16::from_le_bytes([pair[0], pair[1]])).is_err() {
                return uuids;
            }
        }
    }
    uuids
}

/// Check whether the payload lists a 16-bit service UUID
pub fn advertises_service16(payload: &[u8], uuid: u16) -> bool {
    AdStructures::new(payload)
        .filter(|ad| {
            ad.ad_type == AD_INCOMPLETE_SERVICES_16 || ad.ad_type == AD_COMPLETE_SERVICES_16
        })
        .flat_map(|ad| ad.data.chunks_exact(2))
        .any(|pair| u16::from_le_bytes([pair[0], pair[1]]) == uuid)
}

/// Local name of the advertiser, complete name preferred
pub fn local_name(payload: &[u8]) -> Option<&str> {
    let mut short = None;
    for ad in AdStructures::new(payload) {
        match ad.ad_type {
            AD_COMPLETE_NAME => return core::str::from_utf8(ad.data).ok(),
            AD_SHORT_NAME => short = core::str::from_utf8(ad.data).ok(),
            _ => {}
        }
    }
    short
}
