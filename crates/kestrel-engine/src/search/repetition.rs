//! Lossy repetition counter indexed by position key.
//!
//! Keys are reduced to `key & (size - 1)`, which is `key mod size` for the
//! power-of-two sizes used here. Two positions that land in the same slot
//! are treated as the same position.

/// Default slot count (2^21).
pub const DEFAULT_SIZE: usize = 1 << 21;

/// Occurrence counts for positions of the current game and search line.
///
/// The game history records every position before each played move; the
/// search increments a node's key before recursing into a child and
/// decrements it afterwards. A count of two at a node means the position
/// has already occurred twice, so reaching it again is a draw.
pub struct RepetitionTable {
    counts: Vec<u8>,
    mask: usize,
}

impl RepetitionTable {
    /// Create a table with at least `size` slots (rounded up to a power of two).
    pub fn new(size: usize) -> Self {
        let slots = size.max(1).next_power_of_two();
        Self {
            counts: vec![0; slots],
            mask: slots - 1,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub fn count(&self, key: u64) -> u8 {
        self.counts[self.index(key)]
    }

    #[inline]
    pub fn increment(&mut self, key: u64) {
        let i = self.index(key);
        self.counts[i] = self.counts[i].saturating_add(1);
    }

    #[inline]
    pub fn decrement(&mut self, key: u64) {
        let i = self.index(key);
        self.counts[i] = self.counts[i].saturating_sub(1);
    }

    /// Whether arriving at `key` again completes a threefold repetition.
    #[inline]
    pub fn is_draw(&self, key: u64) -> bool {
        self.count(key) >= 2
    }

    /// Reset every counter to zero (preserving the allocation).
    pub fn clear(&mut self) {
        self.counts.fill(0);
    }
}

impl Default for RepetitionTable {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl std::fmt::Debug for RepetitionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepetitionTable")
            .field("slots", &self.counts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rounds_up_to_power_of_two() {
        assert_eq!(RepetitionTable::new(1000).len(), 1024);
        assert_eq!(RepetitionTable::new(0).len(), 1);
        assert_eq!(RepetitionTable::default().len(), DEFAULT_SIZE);
    }

    #[test]
    fn third_occurrence_is_draw() {
        let mut table = RepetitionTable::new(64);
        let key = 0xDEAD_BEEF;
        assert!(!table.is_draw(key));
        table.increment(key);
        assert!(!table.is_draw(key));
        table.increment(key);
        assert!(table.is_draw(key), "two prior occurrences should signal a draw");
        table.decrement(key);
        assert!(!table.is_draw(key));
    }

    #[test]
    fn colliding_keys_share_a_slot() {
        let mut table = RepetitionTable::new(16);
        table.increment(3);
        table.increment(3 + 16);
        assert_eq!(table.count(3), 2);
        assert!(table.is_draw(3 + 32));
    }

    #[test]
    fn decrement_saturates_at_zero() {
        let mut table = RepetitionTable::new(16);
        table.decrement(5);
        assert_eq!(table.count(5), 0);
    }

    #[test]
    fn clear_resets_counts() {
        let mut table = RepetitionTable::new(16);
        table.increment(7);
        table.increment(7);
        table.clear();
        assert_eq!(table.count(7), 0);
    }
}
