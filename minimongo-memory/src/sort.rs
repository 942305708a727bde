//! Stable sorting driven by a strict "less" predicate.
//!
//! The comparator is not a total order (incomparable pairs are "not less" in both
//! directions), so records are sorted with a merge sort that only ever asks
//! `less(right, left)` and keeps the left element otherwise. This never panics on
//! inconsistent predicates and keeps incomparable records in their input order.

use minimongo_core::{query::SortOption, record::AnyRecord};

use crate::evaluator::Comparator;

/// Sorts records by the option's field. A zero direction leaves them untouched.
///
/// Records missing the sort field compare as "not less" against everything.
pub(crate) fn sort_records<'a>(
    records: Vec<&'a dyn AnyRecord>,
    sort: &SortOption,
) -> Vec<&'a dyn AnyRecord> {
    let Some(direction) = sort.direction() else {
        return records;
    };

    log::trace!("Sorting {} records by {} ({:?})", records.len(), sort.key, direction);

    stable_sort_by(records, &|a, b| {
        match (a.record_field(&sort.key), b.record_field(&sort.key)) {
            (Some(left), Some(right)) => Comparator::less(&left, &right, direction),
            _ => false,
        }
    })
}

/// Top-down merge sort; equal or incomparable elements keep their relative order.
pub(crate) fn stable_sort_by<T, F>(mut items: Vec<T>, less: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = stable_sort_by(items, less);
    let right = stable_sort_by(right, less);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let next = if less(r, l) { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged.extend(left);
    merged.extend(right);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_numbers() {
        let sorted = stable_sort_by(vec![5, 3, 9, 1, 1, 7], &|a: &i32, b: &i32| a < b);
        assert_eq!(sorted, vec![1, 1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_is_stable() {
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')];
        let sorted = stable_sort_by(items, &|a: &(i32, char), b: &(i32, char)| a.0 < b.0);

        assert_eq!(sorted, vec![(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_never_less_keeps_input_order() {
        let sorted = stable_sort_by(vec!['z', 'a', 'm'], &|_: &char, _: &char| false);
        assert_eq!(sorted, vec!['z', 'a', 'm']);
    }

    #[test]
    fn test_inconsistent_predicate_does_not_panic() {
        let items: Vec<u32> = (0..64).collect();
        let sorted = stable_sort_by(items, &|a: &u32, b: &u32| (a ^ b) % 3 == 0);

        assert_eq!(sorted.len(), 64);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(stable_sort_by(Vec::<i32>::new(), &|a: &i32, b: &i32| a < b).is_empty());
        assert_eq!(stable_sort_by(vec![4], &|a: &i32, b: &i32| a < b), vec![4]);
    }
}
