//! Key & Interval Math
//!
//! Circular arithmetic over `[0, MaxKey)` with `MaxKey = 2^bits`.
//!
//! | Predicate | `start < end` | `start > end` (wraps) | `start == end` |
//! |---|---|---|---|
//! | `between` `(s, e)` | `k > s && k < e` | `k > s \|\| k < e` | every key except `s` |
//! | `between_end_inclusive` `(s, e]` | `k > s && k <= e` | `k > s \|\| k <= e` | every key |
//!
//! Every key argument must be `< MaxKey`. A violation is a caller bug and
//! panics; keys arriving from the network go through [`KeySpace::check`] first.

use crate::domain::{ChordError, Key};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Smallest supported key-space size.
pub const MIN_BITS: u32 = 1;

/// Largest supported key-space size. Keeps `own + 2^i` inside `u64`.
pub const MAX_BITS: u32 = 63;

/// A fixed-size circular identifier space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    bits: u32,
    max_key: u64,
}

impl KeySpace {
    /// Create a key space of `2^bits` positions.
    pub fn new(bits: u32) -> Result<Self, ChordError> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(ChordError::InvalidKeySpace { bits });
        }
        Ok(Self {
            bits,
            max_key: 1u64 << bits,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// `MaxKey`: number of positions on the circle.
    pub fn max_key(&self) -> u64 {
        self.max_key
    }

    /// `NumFingers = bits - 1`.
    pub fn num_fingers(&self) -> usize {
        (self.bits - 1) as usize
    }

    /// Validate an untrusted key.
    pub fn check(&self, key: Key) -> Result<Key, ChordError> {
        if key.0 < self.max_key {
            Ok(key)
        } else {
            Err(ChordError::KeyOutOfRange {
                key: key.0,
                max_key: self.max_key,
            })
        }
    }

    /// Place a string on the circle.
    ///
    /// SipHash-1-3 with a fixed zero key, so every node agrees on placement.
    pub fn hash(&self, input: &str) -> Key {
        let mut hasher = SipHasher13::new_with_keys(0, 0);
        hasher.write(input.as_bytes());
        Key(hasher.finish() % self.max_key)
    }

    /// Start of finger `index`: `(origin + 2^index) mod MaxKey`.
    pub fn finger_start(&self, origin: Key, index: usize) -> Key {
        self.assert_contains(origin);
        assert!(
            (index as u32) < self.bits,
            "finger index {index} outside {}-bit key space",
            self.bits
        );
        Key((origin.0 + (1u64 << index)) % self.max_key)
    }

    /// Clockwise distance from `from` to `to`.
    pub fn distance(&self, from: Key, to: Key) -> u64 {
        self.assert_contains(from);
        self.assert_contains(to);
        to.0.wrapping_sub(from.0) & (self.max_key - 1)
    }

    /// Exclusive interval `(start, end)`.
    pub fn between(&self, key: Key, start: Key, end: Key) -> bool {
        self.assert_contains(key);
        self.assert_contains(start);
        self.assert_contains(end);

        let (k, s, e) = (key.0, start.0, end.0);
        if s < e {
            k > s && k < e
        } else if s > e {
            k > s || k < e
        } else {
            k != s
        }
    }

    /// End-inclusive interval `(start, end]`.
    pub fn between_end_inclusive(&self, key: Key, start: Key, end: Key) -> bool {
        self.assert_contains(key);
        self.assert_contains(start);
        self.assert_contains(end);

        let (k, s, e) = (key.0, start.0, end.0);
        if s < e {
            k > s && k <= e
        } else if s > e {
            k > s || k <= e
        } else {
            true
        }
    }

    pub(crate) fn assert_contains(&self, key: Key) {
        assert!(
            key.0 < self.max_key,
            "key {} outside key space [0, {})",
            key.0,
            self.max_key
        );
    }
}
