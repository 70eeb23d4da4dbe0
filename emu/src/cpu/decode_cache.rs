//! A small 2-way set-associative cache between decode and execute.
//!
//! Purely a micro-optimization: a processor without it behaves
//! identically. Decoded opcodes are `Copy`, so a hit clones nothing.
//! Writes to already-executed memory are not observed (no self-modifying
//! code invalidation).

use crate::cpu::arm::instructions::ArmOpcode;
use crate::cpu::thumb::instruction::ThumbOpcode;

const CACHE_SETS: usize = 64;

struct CacheSet<T> {
    first: Option<T>,
    second: Option<T>,
    first_used_last: bool,
}

impl<T> Default for CacheSet<T> {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
            first_used_last: false,
        }
    }
}

impl<T: Copy> CacheSet<T> {
    fn lookup(&mut self, matches: impl Fn(&T) -> bool) -> Option<T> {
        if let Some(first) = self.first.as_ref() {
            if matches(first) {
                self.first_used_last = true;
                return self.first;
            }
        }
        if let Some(second) = self.second.as_ref() {
            if matches(second) {
                self.first_used_last = false;
                return self.second;
            }
        }
        None
    }

    fn store(&mut self, value: T) {
        if self.first.is_none() {
            self.first = Some(value);
            self.first_used_last = true;
            return;
        }
        if self.second.is_none() {
            self.second = Some(value);
            self.first_used_last = false;
            return;
        }
        // Evict the way that wasn't used last.
        if self.first_used_last {
            self.second = Some(value);
        } else {
            self.first = Some(value);
        }
        self.first_used_last = !self.first_used_last;
    }
}

pub(crate) struct DecodeCache {
    arm: Vec<CacheSet<ArmOpcode>>,
    thumb: Vec<CacheSet<ThumbOpcode>>,
}

impl Default for DecodeCache {
    fn default() -> Self {
        Self {
            arm: (0..CACHE_SETS).map(|_| CacheSet::default()).collect(),
            thumb: (0..CACHE_SETS).map(|_| CacheSet::default()).collect(),
        }
    }
}

fn hash_arm(raw: u32) -> usize {
    ((raw ^ (raw >> 27)) as usize) % CACHE_SETS
}

fn hash_thumb(raw: u16) -> usize {
    ((raw ^ (raw >> 8)) as usize) % CACHE_SETS
}

impl DecodeCache {
    pub fn get_arm(&mut self, raw: u32) -> Option<ArmOpcode> {
        self.arm[hash_arm(raw)].lookup(|opcode| opcode.raw() == raw)
    }

    pub fn store_arm(&mut self, opcode: ArmOpcode) {
        self.arm[hash_arm(opcode.raw())].store(opcode);
    }

    pub fn get_thumb(&mut self, raw: u16) -> Option<ThumbOpcode> {
        self.thumb[hash_thumb(raw)].lookup(|opcode| opcode.raw() == raw)
    }

    pub fn store_thumb(&mut self, opcode: ThumbOpcode) {
        self.thumb[hash_thumb(opcode.raw())].store(opcode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{parse_arm, parse_thumb};
    use pretty_assertions::assert_eq;

    #[test]
    fn miss_then_hit() {
        let mut cache = DecodeCache::default();
        assert_eq!(cache.get_arm(0x0081_0002), None);

        let opcode = parse_arm(0x0081_0002).unwrap();
        cache.store_arm(opcode);
        assert_eq!(cache.get_arm(0x0081_0002), Some(opcode));
        assert_eq!(cache.get_arm(0x0081_0003), None);
    }

    #[test]
    fn both_ways_of_a_set_hold() {
        let mut cache = DecodeCache::default();
        // These two words hash to the same set.
        let first = parse_arm(0xe081_0002).unwrap();
        let second = parse_arm(0x6081_0012).unwrap();
        assert_eq!(hash_arm(first.raw()), hash_arm(second.raw()));

        cache.store_arm(first);
        cache.store_arm(second);
        assert_eq!(cache.get_arm(first.raw()), Some(first));
        assert_eq!(cache.get_arm(second.raw()), Some(second));
    }

    #[test]
    fn eviction_replaces_the_least_recent_way() {
        let mut cache = DecodeCache::default();
        let a = parse_arm(0xe081_0002).unwrap();
        let b = parse_arm(0x6081_0012).unwrap();
        let c = parse_arm(0x2081_001a).unwrap();
        assert_eq!(hash_arm(a.raw()), hash_arm(b.raw()));
        assert_eq!(hash_arm(a.raw()), hash_arm(c.raw()));

        cache.store_arm(a);
        cache.store_arm(b);
        // Touch a so b is the eviction candidate.
        assert_eq!(cache.get_arm(a.raw()), Some(a));
        cache.store_arm(c);
        assert_eq!(cache.get_arm(a.raw()), Some(a));
        assert_eq!(cache.get_arm(c.raw()), Some(c));
        assert_eq!(cache.get_arm(b.raw()), None);
    }

    #[test]
    fn thumb_entries_are_cached_too() {
        let mut cache = DecodeCache::default();
        let opcode = parse_thumb(0x1888).unwrap();
        assert_eq!(cache.get_thumb(0x1888), None);
        cache.store_thumb(opcode);
        assert_eq!(cache.get_thumb(0x1888), Some(opcode));
    }
}
