//! Flash record storage abstractions
//!
//! Provides a trait for persistent key-value storage that can be
//! implemented by chip-specific HALs using their flash memory.

use thiserror::Error;

/// Storage keys for persisted records
///
/// These keys identify the records kept in flash. The storage
/// implementation handles wear levelling and data integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Step counter total and daily baseline (postcard)
    StepRecord = 0,
    /// Runtime configuration override (postcard)
    WatchConfig = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::StepRecord),
            1 => Some(StorageKey::WatchConfig),
            _ => None,
        }
    }
}

/// Errors from record storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash operation failed
    #[error("flash operation failed")]
    Flash,
    /// Key not found
    #[error("record not found")]
    NotFound,
    /// Buffer too small for the data
    #[error("buffer too small")]
    BufferTooSmall,
    /// Data corrupted or invalid
    #[error("record corrupted")]
    Corrupted,
    /// Storage is full
    #[error("storage full")]
    Full,
}

/// Keyed record storage
///
/// Calls are blocking; the runtime only writes on defined triggers so a
/// write never sits on the hot path of every tick. Implementations
/// should handle:
/// - Wear levelling across flash sectors
/// - Data integrity (CRC or similar)
/// - Atomic replacement of a record
pub trait RecordStore {
    /// Read a record by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the record stored under `key`
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut probe = [0u8; 1];
        !matches!(self.read(key, &mut probe), Err(StorageError::NotFound))
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
