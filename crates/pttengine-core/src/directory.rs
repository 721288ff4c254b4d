//! Case-insensitive sorted-collection search
//!
//! The contact lists are kept sorted by lowercased name so that command
//! resolution and application lookups are O(log n). The helpers here are
//! deliberately general: `lower_bound` tolerates duplicate keys by rewinding
//! to the first equal element, even though names are unique in practice.

use std::cmp::Ordering;

use crate::types::{Channel, ChannelUser, User};

/// Anything that can live in a name-sorted collection.
pub trait Named {
    /// The name the collection is ordered by.
    fn sort_name(&self) -> &str;
}

impl Named for User {
    fn sort_name(&self) -> &str {
        &self.name
    }
}

impl Named for Channel {
    fn sort_name(&self) -> &str {
        &self.name
    }
}

impl Named for ChannelUser {
    fn sort_name(&self) -> &str {
        &self.name
    }
}

/// Compare two names case-insensitively, lexicographically by their
/// lowercased forms.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Binary search for `name`. `Ok` holds the index of *an* equal element (any
/// of them, if duplicates exist), `Err` the insertion point that keeps the
/// slice sorted.
pub fn binary_search<T: Named>(items: &[T], name: &str) -> Result<usize, usize> {
    let mut low = 0usize;
    let mut high = items.len();
    while low < high {
        let mid = (low + high) / 2;
        match compare_names(name, items[mid].sort_name()) {
            Ordering::Greater => low = mid + 1,
            Ordering::Less => high = mid,
            Ordering::Equal => return Ok(mid),
        }
    }
    Err(low)
}

/// Index of the first element equal to `name`, or the insertion point when no
/// element matches.
pub fn lower_bound<T: Named>(items: &[T], name: &str) -> usize {
    let mut index = match binary_search(items, name) {
        Ok(found) => found,
        Err(insertion) => return insertion,
    };
    // Rewind across duplicates to the first equal element
    while index > 0
        && compare_names(items[index - 1].sort_name(), items[index].sort_name()) == Ordering::Equal
    {
        index -= 1;
    }
    index
}

/// Find the element whose name case-insensitively equals `name` in a sorted
/// slice.
pub fn sorted_find<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    let index = lower_bound(items, name);
    let candidate = items.get(index)?;
    if compare_names(name, candidate.sort_name()) == Ordering::Equal {
        Some(candidate)
    } else {
        None
    }
}

/// Sort a collection ascending by case-insensitive name.
pub fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| compare_names(a.sort_name(), b.sort_name()));
}

/// Whether a collection is sorted ascending by case-insensitive name.
pub fn is_sorted_by_name<T: Named>(items: &[T]) -> bool {
    items
        .windows(2)
        .all(|pair| compare_names(pair[0].sort_name(), pair[1].sort_name()) != Ordering::Greater)
}
