//! Tagged records in retained memory
//!
//! Record layout inside a retained slot:
//! ```text
//! ┌──────────────┬──────────────────────┐
//! │ MAGIC (LE)   │ POSTCARD BODY        │
//! │ 4B           │ variable             │
//! └──────────────┴──────────────────────┘
//! ```
//! A record is trusted only when the tag matches, the body decodes and
//! the record passes its own range check. Anything else is reported as
//! absent; callers never see a partially valid record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tiltclock_hal::{RetainedError, RetainedRegion, RetainedSlot, SLOT_CAPACITY};

/// Length of the magic tag
pub const TAG_LEN: usize = 4;

/// Errors from loading or storing a tagged record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Retained region access failed
    #[error("retained region: {0}")]
    Region(RetainedError),
    /// Slot does not start with the expected tag
    #[error("tag mismatch")]
    BadTag,
    /// Body could not be decoded
    #[error("malformed record")]
    Malformed,
    /// Body decoded but a field is out of range
    #[error("record out of range")]
    OutOfRange,
    /// Record does not fit the slot
    #[error("record too large")]
    Encode,
}

impl From<RetainedError> for PersistError {
    fn from(e: RetainedError) -> Self {
        PersistError::Region(e)
    }
}

/// A record that lives in a retained slot
pub trait RetainedRecord: Serialize + DeserializeOwned {
    /// Slot holding the record
    const SLOT: RetainedSlot;
    /// Tag marking a completed write
    const MAGIC: u32;

    /// Range check applied after decoding
    fn is_valid(&self) -> bool;
}

/// Load and validate a record
pub fn load<R: RetainedRegion, T: RetainedRecord>(region: &mut R) -> Result<T, PersistError> {
    let mut buf = [0u8; SLOT_CAPACITY];
    let len = region.load(T::SLOT, &mut buf)?;
    let bytes = &buf[..len];

    if bytes.len() < TAG_LEN {
        return Err(PersistError::BadTag);
    }
    let (tag, body) = bytes.split_at(TAG_LEN);
    if u32::from_le_bytes([tag[0], tag[1], tag[2], tag[3]]) != T::MAGIC {
        return Err(PersistError::BadTag);
    }

    let record: T = postcard::from_bytes(body).map_err(|_| PersistError::Malformed)?;
    if !record.is_valid() {
        return Err(PersistError::OutOfRange);
    }
    Ok(record)
}

/// Encode a record with its tag and write it to its slot
pub fn store<R: RetainedRegion, T: RetainedRecord>(
    region: &mut R,
    record: &T,
) -> Result<(), PersistError> {
    let mut buf = [0u8; SLOT_CAPACITY];
    buf[..TAG_LEN].copy_from_slice(&T::MAGIC.to_le_bytes());
    let body_len = postcard::to_slice(record, &mut buf[TAG_LEN..])
        .map_err(|_| PersistError::Encode)?
        .len();
    region.store(T::SLOT, &buf[..TAG_LEN + body_len])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRegion;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u8,
    }

    impl RetainedRecord for Sample {
        const SLOT: RetainedSlot = RetainedSlot::SystemStats;
        const MAGIC: u32 = 0x1234_5678;

        fn is_valid(&self) -> bool {
            self.value < 100
        }
    }

    #[test]
    fn test_store_then_load() {
        let mut region = MemoryRegion::new();
        store(&mut region, &Sample { value: 42 }).unwrap();
        assert_eq!(load::<_, Sample>(&mut region), Ok(Sample { value: 42 }));
    }

    #[test]
    fn test_empty_slot_is_bad_tag() {
        let mut region = MemoryRegion::new();
        assert_eq!(load::<_, Sample>(&mut region), Err(PersistError::BadTag));
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let mut region = MemoryRegion::new();
        region
            .store(RetainedSlot::SystemStats, &[0xEF, 0xBE, 0xAD, 0xDE, 42])
            .unwrap();
        assert_eq!(load::<_, Sample>(&mut region), Err(PersistError::BadTag));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut region = MemoryRegion::new();
        store(&mut region, &Sample { value: 200 }).unwrap();
        assert_eq!(load::<_, Sample>(&mut region), Err(PersistError::OutOfRange));
    }

    #[test]
    fn test_truncated_body_rejected() {
        let mut region = MemoryRegion::new();
        region
            .store(RetainedSlot::SystemStats, &0x1234_5678u32.to_le_bytes())
            .unwrap();
        assert_eq!(load::<_, Sample>(&mut region), Err(PersistError::Malformed));
    }

    #[test]
    fn test_slot_capacity_bounds_writes() {
        let mut region = MemoryRegion::new();
        let full = [0u8; SLOT_CAPACITY];
        assert_eq!(region.store(RetainedSlot::SystemStats, &full), Ok(()));

        let oversized = [0u8; SLOT_CAPACITY + 1];
        assert_eq!(
            region.store(RetainedSlot::SystemStats, &oversized),
            Err(RetainedError::TooLarge)
        );
        assert_eq!(load::<_, Sample>(&mut region), Err(PersistError::BadTag));
    }
}
