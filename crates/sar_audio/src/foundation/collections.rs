//! Specialized collection types

use slotmap::new_key_type;

pub use slotmap::SlotMap;

new_key_type! {
    /// Generation-checked key for a sound started on a backend
    ///
    /// A key stays unique after its slot is released, so a stale handle can
    /// never address a newer sound.
    pub struct SessionKey;
}

/// Handle-based map for backend voices
pub type SessionMap<T> = SlotMap<SessionKey, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_released_key_is_not_reused() {
        let mut map: SessionMap<u32> = SessionMap::with_key();
        let first = map.insert(1);
        map.remove(first);
        let second = map.insert(2);

        assert_ne!(first, second);
        assert!(map.get(first).is_none());
        assert_eq!(map.get(second), Some(&2));
    }
}
