//! Bidirectional interning of distinct items, handing out dense indices in insertion order.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::ops::Index;

#[derive(Debug, Clone)]
pub struct HashLookup<T: Eq + Hash> {
    item_to_index: FxHashMap<T, usize>,
    index_to_item: Vec<T>,
}
impl<T: Eq + Hash + Clone> HashLookup<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let item_to_index = FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let index_to_item = Vec::with_capacity(capacity);
        Self {
            item_to_index,
            index_to_item,
        }
    }

    /// Returns the index of `item`, pushing it first if it has not been seen.
    pub fn intern(&mut self, item: &T) -> usize {
        if let Some(&index) = self.item_to_index.get(item) {
            return index;
        }
        let index = self.index_to_item.len();
        self.item_to_index.insert(item.clone(), index);
        self.index_to_item.push(item.clone());
        index
    }

    pub fn item_at(&self, index: usize) -> Option<&T> {
        self.index_to_item.get(index)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.item_to_index.get(item).copied()
    }

    pub fn len(&self) -> usize {
        self.index_to_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_item.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.index_to_item
    }
}

impl<T: Eq + Hash + Clone> Default for HashLookup<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Eq + Hash + Clone> Index<usize> for HashLookup<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.item_at(index)
            .unwrap_or_else(|| panic!("no item at index {index}"))
    }
}
