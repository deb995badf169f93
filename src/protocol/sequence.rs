//! Protocol sequence numbers.
//!
//! Corsair Platinum coolers expect every command to carry a sequence number
//! in 1..=31, usually shifted left by 3 bits on the wire. The sequence
//! continues across invocations through the device's runtime store, but
//! increments are not atomic between processes.

use crate::error::Result;
use crate::storage::KeyValueStore;

const SEQUENCE_KEY: &str = "sequence";
const SEQUENCE_MAX: i64 = 31;

/// Advance and persist the sequence: 1, 2, ... 31, 1, 2, ...
pub fn next_sequence<S: KeyValueStore>(store: &mut S) -> Result<u8> {
    let previous = store.load_int(SEQUENCE_KEY, 0)?;
    let next = previous.rem_euclid(SEQUENCE_MAX) + 1;
    store.store_int(SEQUENCE_KEY, next)?;
    Ok(next as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_sequence_starts_at_one() {
        let mut store = MemoryStorage::new();
        assert_eq!(next_sequence(&mut store).unwrap(), 1);
        assert_eq!(next_sequence(&mut store).unwrap(), 2);
    }

    #[test]
    fn test_sequence_wraps_after_31() {
        let mut store = MemoryStorage::new();
        let seq: Vec<u8> = (0..33).map(|_| next_sequence(&mut store).unwrap()).collect();
        assert_eq!(seq[30], 31);
        assert_eq!(seq[31], 1);
        assert_eq!(seq[32], 2);
        assert!(seq.iter().all(|&s| (1..=31).contains(&s)));
    }

    #[test]
    fn test_sequence_resumes_from_store() {
        let mut store = MemoryStorage::new();
        store.store_int("sequence", 30).unwrap();
        assert_eq!(next_sequence(&mut store).unwrap(), 31);
        assert_eq!(store.load_int("sequence", 0).unwrap(), 31);
    }
}
