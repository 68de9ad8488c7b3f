//! A container that keeps its items sorted by a floating point key (mass),
//! supporting inclusive range queries in O(log n + k)

use crate::Error;

#[derive(Clone)]
pub struct MassIndexedCollection<T, F = fn(&T) -> f64> {
    items: Vec<T>,
    key: F,
}

impl<T, F> MassIndexedCollection<T, F>
where
    F: Fn(&T) -> f64,
{
    /// Sort `items` by `key`. Items with equal keys keep their relative order
    pub fn new(mut items: Vec<T>, key: F) -> Self {
        items.sort_by(|a, b| key(a).total_cmp(&key(b)));
        Self { items, key }
    }

    /// Index of the first item whose key is not less than `value`
    fn lower_bound(&self, value: f64) -> usize {
        self.items.partition_point(|item| (self.key)(item) < value)
    }

    /// Index one past the last item whose key is not greater than `value`
    fn upper_bound(&self, value: f64) -> usize {
        self.items.partition_point(|item| (self.key)(item) <= value)
    }

    /// Return the first item with exactly this key
    pub fn get(&self, key: f64) -> Result<&T, Error> {
        self.items
            .get(self.lower_bound(key))
            .filter(|item| (self.key)(item) == key)
            .ok_or(Error::KeyNotFound(key))
    }

    /// All items with `min <= key <= max`, in ascending key order
    pub fn find_range(&self, min: f64, max: f64) -> &[T] {
        if !(min <= max) {
            return &[];
        }
        let lo = self.lower_bound(min);
        let hi = self.upper_bound(max);
        &self.items[lo..hi.max(lo)]
    }

    /// Insert a single item after any items with an equal key. This is O(n),
    /// prefer building the collection in one go with [`MassIndexedCollection::new`]
    pub fn insert(&mut self, item: T) {
        let idx = self.upper_bound((self.key)(&item));
        self.items.insert(idx, item);
    }

    /// Replace the key function, re-sorting every item
    pub fn rekey<G>(self, key: G) -> MassIndexedCollection<T, G>
    where
        G: Fn(&T) -> f64,
    {
        MassIndexedCollection::new(self.items, key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for MassIndexedCollection<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MassIndexedCollection")
            .field("items", &self.items)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use quickcheck_macros::quickcheck;

    use super::*;

    fn identity(x: &f64) -> f64 {
        *x
    }

    fn collection() -> MassIndexedCollection<f64> {
        MassIndexedCollection::new(vec![456.0, 2.0, -50.0, 43.0, 1.0, 5.0], identity)
    }

    #[test]
    fn range_queries() {
        let c = collection();
        assert_eq!(
            c.find_range(-50.0, 456.0),
            &[-50.0, 1.0, 2.0, 5.0, 43.0, 456.0]
        );
        assert_eq!(c.find_range(-51.0, 0.9), &[-50.0]);
        assert_eq!(c.find_range(456.1, 456.2), &[] as &[f64]);
        assert_eq!(c.find_range(2.0, 2.0), &[2.0]);
        assert_eq!(c.find_range(3.0, 1.0), &[] as &[f64]);
        assert_eq!(c.find_range(f64::NAN, 1.0), &[] as &[f64]);
    }

    #[test]
    fn exact_lookup() {
        let c = collection();
        assert_eq!(c.get(43.0), Ok(&43.0));
        assert_eq!(c.get(43.5), Err(Error::KeyNotFound(43.5)));
        assert_eq!(c.get(1000.0), Err(Error::KeyNotFound(1000.0)));
    }

    #[test]
    fn insertion_keeps_order() {
        let mut c = collection();
        c.insert(3.0);
        c.insert(-100.0);
        c.insert(1000.0);
        assert_eq!(
            c.as_slice(),
            &[-100.0, -50.0, 1.0, 2.0, 3.0, 5.0, 43.0, 456.0, 1000.0]
        );
    }

    #[test]
    fn equal_keys_are_stable() {
        let items = vec![("b", 2.0), ("a", 1.0), ("c", 2.0)];
        let mut c = MassIndexedCollection::new(items, |item: &(&str, f64)| item.1);
        c.insert(("d", 2.0));
        let names = c.find_range(2.0, 2.0).iter().map(|x| x.0).collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(c.get(2.0).unwrap().0, "b");
    }

    #[test]
    fn rekey_rebuilds() {
        let items = vec![("x", 1.0, 30.0), ("y", 2.0, 10.0), ("z", 3.0, 20.0)];
        let c = MassIndexedCollection::new(items, |item: &(&str, f64, f64)| item.1);
        let c = c.rekey(|item: &(&str, f64, f64)| item.2);
        let names = c.iter().map(|x| x.0).collect::<Vec<_>>();
        assert_eq!(names, vec!["y", "z", "x"]);
        assert_eq!(c.find_range(15.0, 25.0)[0].0, "z");
    }

    #[quickcheck]
    fn range_matches_linear_scan(items: Vec<i16>, a: i16, b: i16) -> bool {
        let items = items.into_iter().map(f64::from).collect::<Vec<_>>();
        let (min, max) = (f64::from(a.min(b)), f64::from(a.max(b)));

        let mut expected = items
            .iter()
            .copied()
            .filter(|x| *x >= min && *x <= max)
            .collect::<Vec<_>>();
        expected.sort_by(|a, b| a.total_cmp(b));

        let c = MassIndexedCollection::new(items, identity);
        c.find_range(min, max) == expected.as_slice()
    }
}
