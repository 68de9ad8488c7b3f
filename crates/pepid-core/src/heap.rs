use std::cmp::Ordering;

/// Perform a max k-selection (e.g. select the 50 largest items) on an
/// array, in place. This algorithm works by building a bounded min heap
/// in the array. The `k` highest elements in the slice will be stored in
/// first `k` elements in the slice, but they will be stored in min-heap order,
/// not in sorted order. Otherwise, this is equivalent to performing a partial
/// sort
pub fn bounded_min_heapify<T: Ord>(slice: &mut [T], k: usize) {
    if slice.len() <= k || k == 0 {
        return;
    }

    // Build a heap in place for the first `k` elements
    for i in (0..k / 2).rev() {
        sift_down(&mut slice[..k], i);
    }

    debug_assert!(check_heap(&slice[..k]));

    // Scan the vector, "inserting" items into the heap if they are larger
    // than the smallest item in the heap. This performs the `k` select operation
    for i in k..slice.len() {
        if slice[i] > slice[0] {
            slice.swap(i, 0);
            sift_down(&mut slice[..k], 0);
            debug_assert!(check_heap(&slice[..k]));
        }
    }
}

fn check_heap<T: Ord>(slice: &[T]) -> bool {
    for i in 1..slice.len() {
        let parent = (i - 1) / 2;
        if slice[parent] > slice[i] {
            return false;
        }
    }
    true
}

fn sift_down<T: Ord>(slice: &mut [T], mut index: usize) {
    while let Some(left) = slice.get(index * 2 + 1) {
        let mut smallest = index;
        if left < &slice[smallest] {
            smallest = index * 2 + 1;
        }

        if let Some(right) = slice.get(index * 2 + 2) {
            if right < &slice[smallest] {
                smallest = index * 2 + 2;
            }
        }

        if smallest != index {
            slice.swap(smallest, index);
            index = smallest;
        } else {
            break;
        }
    }
}

/// An item ranked by score. On equal scores, the item seen first ranks higher
struct Ranked<T> {
    score: f64,
    order: usize,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Select the `k` highest scoring items, returned in descending order of score.
///
/// Items with equal scores keep the order in which they were yielded, so the
/// result is identical to a stable descending sort truncated to `k` items.
pub fn top_k<T, I, F>(items: I, k: usize, score: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> f64,
{
    if k == 0 {
        return Vec::new();
    }

    let mut ranked = items
        .into_iter()
        .enumerate()
        .map(|(order, item)| Ranked {
            score: score(&item),
            order,
            item,
        })
        .collect::<Vec<_>>();

    bounded_min_heapify(&mut ranked, k);
    ranked.truncate(k);
    ranked.sort_unstable_by(|a, b| b.cmp(a));
    ranked.into_iter().map(|ranked| ranked.item).collect()
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use quickcheck_macros::quickcheck;

    use super::*;

    fn check<T: Ord + Clone + Debug>(mut data: Vec<T>, k: usize) {
        let k = k.min(data.len());
        let mut cloned = data.clone();
        // Stable sort the data
        cloned.sort_by(|a, b| b.cmp(&a));

        bounded_min_heapify(&mut data, k);

        // Take the heap part, and sort it
        let top_k = &mut data[..k];

        // Check that heap property is maintained, or that k == length of the data
        assert!(check_heap(top_k) || k == cloned.len());

        top_k.sort_by(|a, b| b.cmp(&a));
        assert_eq!(top_k, &mut cloned[..k]);
    }

    #[quickcheck]
    fn run_quickcheck(data: Vec<i32>, k: usize) {
        check(data, k);
    }

    #[quickcheck]
    fn top_k_matches_stable_sort(scores: Vec<i8>, k: u8) -> bool {
        let k = k as usize;
        let items = scores
            .iter()
            .enumerate()
            .map(|(idx, score)| (idx, *score as f64))
            .collect::<Vec<_>>();

        let mut expected = items.clone();
        expected.sort_by(|a, b| b.1.total_cmp(&a.1));
        expected.truncate(k);

        top_k(items, k, |item| item.1) == expected
    }

    #[test]
    fn smoke() {
        let asc = (0..500).collect::<Vec<_>>();
        let desc = (0..500).rev().collect::<Vec<_>>();
        check(asc, 50);
        check(desc, 50);
    }

    #[test]
    fn ties_keep_original_order() {
        let items = vec![("a", 1.0), ("b", 2.0), ("c", 1.0), ("d", 2.0), ("e", 0.5)];
        let best = top_k(items.clone(), 3, |item| item.1);
        assert_eq!(best, vec![("b", 2.0), ("d", 2.0), ("a", 1.0)]);

        assert_eq!(top_k(items.clone(), 0, |item| item.1), vec![]);
        assert_eq!(top_k(items, 100, |item| item.1).len(), 5);
    }
}
