//! Reachability bitset over type tags.

use smallvec::SmallVec;

use crate::TypeId;

/// Set of type tags, one bit per tag.
///
/// Two inline words cover the built-in hierarchy without allocating.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AncestorSet {
    words: SmallVec<[u64; 2]>,
}

impl AncestorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: TypeId) -> Self {
        let mut set = Self::new();
        set.insert(id);
        set
    }

    #[inline]
    fn split(id: TypeId) -> (usize, u64) {
        (id.index() / 64, 1u64 << (id.index() % 64))
    }

    pub fn insert(&mut self, id: TypeId) {
        let (word, bit) = Self::split(id);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= bit;
    }

    #[inline]
    pub fn contains(&self, id: TypeId) -> bool {
        let (word, bit) = Self::split(id);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Add every member of `other`. Returns `true` if anything was added.
    pub fn union_with(&mut self, other: &AncestorSet) -> bool {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Members in tag order.
    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64u32)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| TypeId::from_raw(i as u32 * 64 + bit))
        })
    }
}
