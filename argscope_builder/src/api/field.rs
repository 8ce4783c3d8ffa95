use std::collections::{BTreeSet, HashSet};
use std::marker::PhantomData;

use crate::api::capture::*;
use crate::model::Nargs;
use crate::prelude::Collectable;

/// A parameter that takes a single value.
/// When repeated, the last occurrence wins.
pub struct Scalar<'a, T> {
    variable: &'a mut T,
}

impl<'a, T> CliOption for Scalar<'a, T> {}
impl<'a, T> CliArgument for Scalar<'a, T> {}

impl<'a, T> Scalar<'a, T> {
    /// Create a scalar parameter.
    pub fn new(variable: &'a mut T) -> Self {
        Self { variable }
    }
}

impl<'a, T> GenericCapturable<'a, T> for Scalar<'a, T> {
    fn begin(&mut self) {
        // Do nothing.
    }

    fn capture(&mut self, value: T) {
        *self.variable = value;
    }

    fn finish(&mut self) {
        // Do nothing.
    }

    fn nargs(&self) -> Option<Nargs> {
        None
    }

    fn required(&self) -> bool {
        true
    }
}

/// A parameter that maps down to [`Option`], taking a single value.
/// As an argument, it may be left out.
pub struct Optional<'a, T> {
    variable: &'a mut Option<T>,
}

impl<'a, T> CliOption for Optional<'a, T> {}
impl<'a, T> CliArgument for Optional<'a, T> {}

impl<'a, T> Optional<'a, T> {
    /// Create an optional parameter.
    pub fn new(variable: &'a mut Option<T>) -> Self {
        Self { variable }
    }
}

impl<'a, T> GenericCapturable<'a, T> for Optional<'a, T> {
    fn begin(&mut self) {
        // Do nothing.
    }

    fn capture(&mut self, value: T) {
        self.variable.replace(value);
    }

    fn finish(&mut self) {
        // Do nothing.
    }

    fn nargs(&self) -> Option<Nargs> {
        None
    }

    fn required(&self) -> bool {
        false
    }
}

/// A parameter that takes multiple values (specifiable [`Nargs`]).
///
/// Values are buffered per occurrence: a repeated option replaces the values of its previous occurrence.
/// The final occurrence is added to the collection once parsing completes.
pub struct Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    variable: &'a mut C,
    nargs: Nargs,
    buffer: Vec<T>,
    _phantom: PhantomData<T>,
}

impl<'a, C, T> CliOption for Collection<'a, C, T> where C: 'a + Collectable<T> {}

impl<'a, C, T> CliArgument for Collection<'a, C, T> where C: 'a + Collectable<T> {}

impl<'a, C, T> Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    /// Create a collection parameter.
    pub fn new(variable: &'a mut C, nargs: Nargs) -> Self {
        Self {
            variable,
            nargs,
            buffer: Vec::default(),
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> GenericCapturable<'a, T> for Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    fn begin(&mut self) {
        self.buffer.clear();
    }

    fn capture(&mut self, value: T) {
        self.buffer.push(value);
    }

    fn finish(&mut self) {
        for value in self.buffer.drain(..) {
            self.variable.add(value);
        }
    }

    fn nargs(&self) -> Option<Nargs> {
        Some(self.nargs)
    }

    fn required(&self) -> bool {
        false
    }
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Eq + std::hash::Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

impl<T: Ord> Collectable<T> for BTreeSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec() {
        let mut collection: Vec<u32> = Vec::default();
        collection.add(1);
        collection.add(0);
        assert_eq!(collection, vec![1, 0]);
    }

    #[test]
    fn hash_set() {
        let mut collection: HashSet<u32> = HashSet::default();
        collection.add(1);
        collection.add(0);
        collection.add(1);
        assert_eq!(collection, HashSet::from([1, 0]));
    }

    #[test]
    fn btree_set() {
        let mut collection: BTreeSet<u32> = BTreeSet::default();
        collection.add(3);
        collection.add(1);
        collection.add(3);
        assert_eq!(collection.into_iter().collect::<Vec<u32>>(), vec![1, 3]);
    }

    #[test]
    fn scalar_capture() {
        // Integer
        let mut variable: u32 = u32::default();
        let mut value = Scalar::new(&mut variable);
        value.begin();
        value.capture(5);
        value.begin();
        value.capture(7);
        value.finish();
        assert_eq!(variable, 7);

        // Boolean
        let mut variable: bool = false;
        let mut value = Scalar::new(&mut variable);
        value.capture(true);
        assert!(variable);
    }

    #[test]
    fn optional_capture() {
        let mut variable: Option<u32> = None;
        let mut optional = Optional::new(&mut variable);
        optional.begin();
        optional.capture(1);
        optional.finish();
        assert_eq!(variable, Some(1));
    }

    #[test]
    fn optional_untouched() {
        let mut variable: Option<u32> = Some(3);
        let mut optional = Optional::new(&mut variable);
        optional.finish();
        assert_eq!(variable, Some(3));
    }

    #[test]
    fn collection_capture() {
        // Vec<u32>
        let mut variable: Vec<u32> = Vec::default();
        let mut collection = Collection::new(&mut variable, Nargs::AtLeastOne);
        collection.begin();
        collection.capture(1);
        collection.capture(0);
        collection.finish();
        assert_eq!(variable, vec![1, 0]);

        // HashSet<u32>
        let mut variable: HashSet<u32> = HashSet::default();
        let mut collection = Collection::new(&mut variable, Nargs::AtLeastOne);
        collection.begin();
        collection.capture(1);
        collection.capture(0);
        collection.capture(0);
        collection.finish();
        assert_eq!(variable, HashSet::from([0, 1]));
    }

    #[test]
    fn collection_last_occurrence_wins() {
        let mut variable: Vec<u32> = Vec::default();
        let mut collection = Collection::new(&mut variable, Nargs::AtLeastOne);
        collection.begin();
        collection.capture(1);
        collection.capture(2);
        collection.begin();
        collection.capture(3);
        collection.finish();
        assert_eq!(variable, vec![3]);
    }

    #[test]
    fn collection_appends_to_existing() {
        let mut variable: Vec<u32> = vec![9];
        let mut collection = Collection::new(&mut variable, Nargs::AtMost(2));
        collection.begin();
        collection.capture(1);
        collection.finish();
        assert_eq!(variable, vec![9, 1]);
    }

    #[test]
    fn test_nargs() {
        let mut variable: u32 = u32::default();
        let value = Scalar::new(&mut variable);
        assert_eq!(value.nargs(), None);
        assert!(value.required());

        let mut variable: Option<u32> = None;
        let optional = Optional::new(&mut variable);
        assert_eq!(optional.nargs(), None);
        assert!(!optional.required());

        let mut variable: Vec<u32> = Vec::default();
        let collection = Collection::new(&mut variable, Nargs::AtMost(3));
        assert_eq!(collection.nargs(), Some(Nargs::AtMost(3)));
        assert!(!collection.required());

        let mut variable: Vec<u32> = Vec::default();
        let collection = Collection::new(&mut variable, Nargs::AtLeastOne);
        assert_eq!(collection.nargs(), Some(Nargs::AtLeastOne));
    }
}
