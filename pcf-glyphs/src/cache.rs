//! Bounded glyph caching.
//!
//! [`LruCache`] is a fixed capacity map with strict least recently used
//! eviction. [`GlyphCache`] keys it by code point and knows how to fill it
//! from a [`GlyphSource`], either one glyph at a time or in batches sorted
//! for sequential reads.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::num::NonZeroUsize;

use raw::GlyphId;

use crate::glyph::Glyph;

/// A map holding at most `capacity` entries.
///
/// Entries live in a slot array threaded by a doubly linked recency list, so
/// lookups, insertions and evictions are all constant time and an evicted
/// slot is reused by the entry that displaced it.
#[derive(Clone, Debug)]
pub struct LruCache<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    // most recently used
    head: Option<usize>,
    // least recently used
    tail: Option<usize>,
    capacity: NonZeroUsize,
}

#[derive(Clone, Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity.get()),
            slots: Vec::with_capacity(capacity.get()),
            head: None,
            tail: None,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.move_to_front(slot);
        Some(&self.slots[slot].value)
    }

    /// Returns the value for `key` without touching the recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|slot| &self.slots[*slot].value)
    }

    /// Insert or replace a value, making it most recently used.
    ///
    /// When a new key arrives at capacity, the least recently used entry is
    /// evicted and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.index.get(&key) {
            self.slots[slot].value = value;
            self.move_to_front(slot);
            return None;
        }
        if self.slots.len() < self.capacity.get() {
            let slot = self.slots.len();
            self.slots.push(Slot {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.index.insert(key, slot);
            self.link_front(slot);
            return None;
        }
        // full: the tail slot is reused for the new entry
        let slot = self.tail?;
        self.unlink(slot);
        let entry = &mut self.slots[slot];
        let old_key = std::mem::replace(&mut entry.key, key.clone());
        let old_value = std::mem::replace(&mut entry.value, value);
        self.index.remove(&old_key);
        self.index.insert(key, slot);
        self.link_front(slot);
        Some((old_key, old_value))
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate over the keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        std::iter::successors(self.head, |slot| self.slots[*slot].next)
            .map(|slot| &self.slots[slot].key)
    }

    fn move_to_front(&mut self, slot: usize) {
        if self.head != Some(slot) {
            self.unlink(slot);
            self.link_front(slot);
        }
    }

    fn unlink(&mut self, slot: usize) {
        let Slot { prev, next, .. } = self.slots[slot];
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }
        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }

    fn link_front(&mut self, slot: usize) {
        self.slots[slot].next = self.head;
        if let Some(head) = self.head {
            self.slots[head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}

/// Something glyphs can be decoded from.
pub trait GlyphSource {
    type Error;

    /// Map a code point to a glyph, or `None` if the font has no glyph for
    /// it.
    fn resolve(&self, code_point: u32) -> Option<GlyphId>;

    fn decode(&mut self, glyph_id: GlyphId) -> Result<Glyph, Self::Error>;

    /// Decode several glyphs, given in ascending order.
    ///
    /// Returns one result per requested glyph, in the same order. Sources
    /// that can read sequentially should override this.
    fn decode_batch(&mut self, glyph_ids: &[GlyphId]) -> Vec<Result<Glyph, Self::Error>> {
        glyph_ids.iter().map(|id| self.decode(*id)).collect()
    }
}

/// The outcome of a batch load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Distinct code points requested.
    pub requested: usize,
    /// Already in the cache before the batch.
    pub cached: usize,
    /// Decoded and inserted.
    pub loaded: usize,
    /// No glyph in the font.
    pub missing: usize,
    /// Failed to decode; not cached.
    pub failed: usize,
    /// Not decoded because the batch holds more glyphs than the cache.
    pub skipped: usize,
}

/// A bounded cache of decoded glyphs keyed by code point.
#[derive(Clone, Debug)]
pub struct GlyphCache {
    entries: LruCache<u32, Glyph>,
}

impl GlyphCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code_point: u32) -> bool {
        self.entries.contains(&code_point)
    }

    /// Returns the cached glyph and marks it most recently used.
    pub fn get(&mut self, code_point: u32) -> Option<&Glyph> {
        self.entries.get(&code_point)
    }

    pub fn put(&mut self, code_point: u32, glyph: Glyph) {
        if let Some((evicted, _)) = self.entries.put(code_point, glyph) {
            log::trace!("evicted U+{evicted:04X} from the glyph cache");
        }
    }

    /// Cached code points, most recently used first.
    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys_by_recency().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the glyph for `code_point`, decoding and caching it on a miss.
    ///
    /// Returns `Ok(None)` if the source has no glyph for the code point.
    pub fn get_or_load<S: GlyphSource>(
        &mut self,
        code_point: u32,
        source: &mut S,
    ) -> Result<Option<&Glyph>, S::Error> {
        if !self.contains(code_point) {
            let Some(glyph_id) = source.resolve(code_point) else {
                return Ok(None);
            };
            let glyph = source.decode(glyph_id)?;
            self.put(code_point, glyph);
        }
        Ok(self.get(code_point))
    }

    /// Decode and cache every code point in `code_points` that is not already
    /// cached.
    ///
    /// The glyphs are decoded in glyph order, which is also the order of the
    /// per-glyph tables, so a source can serve the batch with sequential
    /// reads. At most `capacity` glyphs are decoded; when the batch is larger,
    /// the ones with the lowest glyph ids are skipped. A glyph that fails to
    /// decode is logged and left out of the cache; the rest of the batch is
    /// unaffected.
    pub fn load_many<S>(
        &mut self,
        code_points: impl IntoIterator<Item = u32>,
        source: &mut S,
    ) -> BatchSummary
    where
        S: GlyphSource,
        S::Error: Display,
    {
        let mut code_points: Vec<u32> = code_points.into_iter().collect();
        code_points.sort_unstable();
        code_points.dedup();
        let mut summary = BatchSummary {
            requested: code_points.len(),
            ..Default::default()
        };

        let mut pending: Vec<(GlyphId, u32)> = Vec::with_capacity(code_points.len());
        for code_point in code_points {
            if self.contains(code_point) {
                summary.cached += 1;
            } else if let Some(glyph_id) = source.resolve(code_point) {
                pending.push((glyph_id, code_point));
            } else {
                summary.missing += 1;
            }
        }
        if pending.is_empty() {
            return summary;
        }
        pending.sort_unstable();
        // only the tail of the batch would survive eviction
        let excess = pending.len().saturating_sub(self.capacity());
        if excess > 0 {
            summary.skipped = excess;
            pending.drain(..excess);
        }

        // several code points may share a glyph, e.g. through the default char
        let mut glyph_ids: Vec<GlyphId> = pending.iter().map(|(id, _)| *id).collect();
        glyph_ids.dedup();
        let results = source.decode_batch(&glyph_ids);

        let mut pending = pending.into_iter().peekable();
        for (glyph_id, result) in glyph_ids.into_iter().zip(results) {
            let mut targets = Vec::new();
            while let Some((_, code_point)) = pending.next_if(|(id, _)| *id == glyph_id) {
                targets.push(code_point);
            }
            match result {
                Ok(glyph) => {
                    summary.loaded += targets.len();
                    if let Some((last, rest)) = targets.split_last() {
                        for code_point in rest {
                            self.put(*code_point, glyph.clone());
                        }
                        self.put(*last, glyph);
                    }
                }
                Err(err) => {
                    summary.failed += targets.len();
                    log::warn!("failed to decode {glyph_id} for batch load: {err}");
                }
            }
        }
        log::debug!("glyph batch: {summary:?}");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::GlyphBitmap;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use raw::GlyphMetrics;
    use std::collections::HashSet;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn lru_order() {
        let mut cache = LruCache::new(capacity(3));
        for key in 1..=3 {
            assert_eq!(cache.put(key, key * 10), None);
        }
        assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), [3, 2, 1]);
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), [1, 3, 2]);
        // peek leaves the order alone
        assert_eq!(cache.peek(&2), Some(&20));
        assert_eq!(cache.put(4, 40), Some((2, 20)));
        assert!(!cache.contains(&2));
        assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), [4, 1, 3]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn replace_does_not_evict() {
        let mut cache = LruCache::new(capacity(2));
        cache.put('a', 1);
        cache.put('b', 2);
        assert_eq!(cache.put('a', 3), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&'a'), Some(&3));
        assert_eq!(cache.put('c', 4), Some(('b', 2)));
    }

    #[test]
    fn capacity_one() {
        let mut cache = LruCache::new(capacity(1));
        cache.put(1, ());
        assert_eq!(cache.put(2, ()), Some((1, ())));
        assert_eq!(cache.get(&2), Some(&()));
        assert_eq!(cache.get(&1), None);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.keys_by_recency().count(), 0);
    }

    #[test]
    fn bounded_under_random_access() {
        let mut cache = LruCache::new(capacity(7));
        let mut recency: Vec<u32> = Vec::new();
        let mut rng = StdRng::seed_from_u64(0x2545_f491);
        for _ in 0..2000 {
            let key: u32 = rng.gen_range(0..23);
            if rng.gen_bool(0.5) {
                let hit = cache.get(&key).is_some();
                assert_eq!(hit, recency.contains(&key));
                if hit {
                    recency.retain(|k| *k != key);
                    recency.insert(0, key);
                }
            } else {
                cache.put(key, key);
                recency.retain(|k| *k != key);
                recency.insert(0, key);
                recency.truncate(7);
            }
            assert!(cache.len() <= 7);
            assert_eq!(cache.keys_by_recency().copied().collect::<Vec<_>>(), recency);
        }
    }

    /// Serves glyphs whose id is the code point minus 0x20, and fails to
    /// decode any glyph listed in `broken`.
    #[derive(Default)]
    struct FakeSource {
        broken: HashSet<u16>,
        decoded: Vec<GlyphId>,
        batches: usize,
    }

    impl GlyphSource for FakeSource {
        type Error = String;

        fn resolve(&self, code_point: u32) -> Option<GlyphId> {
            match code_point {
                0x20..=0x7E => Some(GlyphId::new(code_point as u16 - 0x20)),
                // a pair of code points sharing one glyph
                0x2000 | 0x2001 => Some(GlyphId::new(0)),
                _ => None,
            }
        }

        fn decode(&mut self, glyph_id: GlyphId) -> Result<Glyph, String> {
            self.decoded.push(glyph_id);
            if self.broken.contains(&glyph_id.to_u16()) {
                return Err(format!("{glyph_id} is broken"));
            }
            Ok(Glyph {
                glyph_id,
                metrics: GlyphMetrics {
                    character_width: glyph_id.to_u16() as i16,
                    ..Default::default()
                },
                bitmap: GlyphBitmap::default(),
            })
        }

        fn decode_batch(&mut self, glyph_ids: &[GlyphId]) -> Vec<Result<Glyph, String>> {
            self.batches += 1;
            glyph_ids.iter().map(|id| self.decode(*id)).collect()
        }
    }

    #[test]
    fn get_or_load() {
        let mut cache = GlyphCache::new(capacity(4));
        let mut source = FakeSource::default();
        let glyph = cache.get_or_load('A' as u32, &mut source).unwrap().cloned();
        assert_eq!(glyph.map(|g| g.glyph_id), Some(GlyphId::new(0x21)));
        // second lookup is a hit
        cache.get_or_load('A' as u32, &mut source).unwrap();
        assert_eq!(source.decoded.len(), 1);
        assert_eq!(cache.get_or_load(0x1F600, &mut source), Ok(None));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn get_or_load_error_is_not_cached() {
        let mut cache = GlyphCache::new(capacity(4));
        let mut source = FakeSource {
            broken: HashSet::from([1]),
            ..Default::default()
        };
        assert!(cache.get_or_load('!' as u32, &mut source).is_err());
        assert!(!cache.contains('!' as u32));
        assert!(cache.get_or_load('!' as u32, &mut source).is_err());
        assert_eq!(source.decoded.len(), 2);
    }

    #[test]
    fn batch_sorted_and_deduplicated() {
        let mut cache = GlyphCache::new(capacity(16));
        let mut source = FakeSource::default();
        cache.put(
            'b' as u32,
            source.decode(GlyphId::new('b' as u16 - 0x20)).unwrap(),
        );
        source.decoded.clear();
        let request = "zebra!".chars().map(u32::from).chain([0x10FFFF]);
        let summary = cache.load_many(request, &mut source);
        assert_eq!(
            summary,
            BatchSummary {
                requested: 7,
                cached: 1,
                loaded: 5,
                missing: 1,
                failed: 0,
                skipped: 0,
            }
        );
        assert_eq!(source.batches, 1);
        assert_eq!(
            source.decoded,
            ['!', 'a', 'e', 'r', 'z'].map(|c| GlyphId::new(c as u16 - 0x20))
        );
        for c in "zebra!".chars() {
            assert!(cache.contains(c as u32));
        }
    }

    #[test]
    fn batch_shared_glyph() {
        let mut cache = GlyphCache::new(capacity(4));
        let mut source = FakeSource::default();
        let summary = cache.load_many([0x2001, 0x20, 0x2000], &mut source);
        assert_eq!(summary.loaded, 3);
        assert_eq!(source.decoded, [GlyphId::new(0)]);
        assert!(cache.contains(0x20) && cache.contains(0x2000) && cache.contains(0x2001));
    }

    #[test]
    fn batch_failures_are_isolated() {
        let mut cache = GlyphCache::new(capacity(8));
        let mut source = FakeSource {
            broken: HashSet::from([0x22]),
            ..Default::default()
        };
        let summary = cache.load_many("ABC".chars().map(u32::from), &mut source);
        assert_eq!((summary.loaded, summary.failed), (2, 1));
        assert!(cache.contains('A' as u32));
        assert!(!cache.contains('B' as u32));
        assert!(cache.contains('C' as u32));
    }

    #[test]
    fn batch_larger_than_capacity() {
        let mut cache = GlyphCache::new(capacity(3));
        let mut source = FakeSource::default();
        let summary = cache.load_many(0x20..0x30, &mut source);
        assert_eq!(summary.loaded, 3);
        assert_eq!(summary.skipped, 13);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.code_points().collect::<Vec<_>>(), [0x2F, 0x2E, 0x2D]);
        // nothing is decoded just to be evicted again
        assert_eq!(
            source.decoded,
            [GlyphId::new(0x0D), GlyphId::new(0x0E), GlyphId::new(0x0F)]
        );
    }

    #[test]
    fn empty_batch() {
        let mut cache = GlyphCache::new(capacity(3));
        let mut source = FakeSource::default();
        assert_eq!(cache.load_many([], &mut source), BatchSummary::default());
        assert_eq!(source.batches, 0);
    }
}
