//! Open-addressing, robin-hood hash map (spec §4.4 "Open hash map"),
//! backing the string pool ([`crate::strings::StringPool`]). The
//! property-type lookup table ([`crate::templates::build_templates`]) and
//! the connectable map ([`crate::connect`]) use `std::collections::HashMap`
//! instead, since neither needs this module's open-addressed layout.
//!
//! Robin-hood probing keeps worst-case probe length low without a tree,
//! matching the original's choice; the FBX keyword hash combines 4-byte
//! words with a rotate+xor+multiply (spec §4.4), reproduced in
//! [`fbx_hash_bytes`].

/// The original's string hash: combines 4-byte words with a rotate+xor+
/// multiply, falling back to a byte loop for the tail.
pub fn fbx_hash_bytes(data: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let word = u32::from_le_bytes(chunk.try_into().unwrap());
        hash = hash.rotate_left(5) ^ word;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    for &byte in chunks.remainder() {
        hash = hash.rotate_left(5) ^ (byte as u32);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

struct Slot<K, V> {
    key: K,
    value: V,
    hash: u32,
    /// Probe distance from the ideal bucket.
    psl: u32,
}

/// A robin-hood open hash map keyed by `K: Eq` with an externally supplied
/// hash (so callers can plug in [`fbx_hash_bytes`] or a plain `Hash`
/// derive, matching spec §4.4's description of a single backing structure
/// reused by several lookup tables).
pub struct RobinHoodMap<K, V> {
    slots: Vec<Option<Slot<K, V>>>,
    len: usize,
    mask: usize,
}

impl<K: Clone + Eq, V> RobinHoodMap<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = capacity.next_power_of_two().max(16);
        let mut slots = Vec::with_capacity(cap);
        slots.resize_with(cap, || None);
        RobinHoodMap { slots, len: 0, mask: cap - 1 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn over_load_factor(&self) -> bool {
        self.len * 10 >= self.slots.len() * 9
    }

    fn rehash_into(&mut self, new_cap: usize) {
        let old = std::mem::take(&mut self.slots);
        self.slots = Vec::with_capacity(new_cap);
        self.slots.resize_with(new_cap, || None);
        self.mask = new_cap - 1;
        self.len = 0;
        for slot in old.into_iter().flatten() {
            self.insert_with_hash(slot.key, slot.value, slot.hash);
        }
    }

    pub fn insert(&mut self, key: K, value: V, hash: u32) -> Option<V> {
        if self.over_load_factor() {
            let new_cap = self.slots.len() * 2;
            self.rehash_into(new_cap);
        }
        self.insert_with_hash(key, value, hash)
    }

    fn insert_with_hash(&mut self, mut key: K, mut value: V, mut hash: u32) -> Option<V> {
        let mut idx = (hash as usize) & self.mask;
        let mut psl: u32 = 0;
        loop {
            match &mut self.slots[idx] {
                None => {
                    self.slots[idx] = Some(Slot { key, value, hash, psl });
                    self.len += 1;
                    return None;
                }
                Some(existing) if existing.key == key => {
                    let old = std::mem::replace(&mut existing.value, value);
                    return Some(old);
                }
                Some(existing) if existing.psl < psl => {
                    std::mem::swap(&mut existing.key, &mut key);
                    std::mem::swap(&mut existing.value, &mut value);
                    std::mem::swap(&mut existing.hash, &mut hash);
                    std::mem::swap(&mut existing.psl, &mut psl);
                }
                _ => {}
            }
            idx = (idx + 1) & self.mask;
            psl += 1;
        }
    }

    pub fn get(&self, key: &K, hash: u32) -> Option<&V> {
        let mut idx = (hash as usize) & self.mask;
        let mut psl: u32 = 0;
        loop {
            match &self.slots[idx] {
                None => return None,
                Some(slot) if slot.psl < psl => return None,
                Some(slot) if &slot.key == key => return Some(&slot.value),
                _ => {}
            }
            idx = (idx + 1) & self.mask;
            psl += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut map: RobinHoodMap<&'static str, i32> = RobinHoodMap::with_capacity(16);
        for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            map.insert(*key, i as i32, fbx_hash_bytes(key.as_bytes()));
        }
        assert_eq!(Some(&2), map.get(&"c", fbx_hash_bytes(b"c")));
        assert_eq!(None, map.get(&"z", fbx_hash_bytes(b"z")));
    }

    #[test]
    fn grows_past_load_factor() {
        let mut map: RobinHoodMap<u32, u32> = RobinHoodMap::with_capacity(16);
        for i in 0..100u32 {
            map.insert(i, i * 2, i);
        }
        assert_eq!(100, map.len());
        for i in 0..100u32 {
            assert_eq!(Some(&(i * 2)), map.get(&i, i));
        }
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(fbx_hash_bytes(b"Model"), fbx_hash_bytes(b"Model"));
        assert_ne!(fbx_hash_bytes(b"Model"), fbx_hash_bytes(b"Mesh"));
    }
}
