use crate::data::DataProvider;
use crate::geometry::Rectangle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Looks up the bounds of comments and attachment targets.
///
/// Bounds providers are shared between the attacher, filters and matchers, so every method takes
/// `&self`. Implementations that keep state use interior mutability.
pub trait BoundsProvider<C, T> {
    /// Bounds of the given comment, if they can be determined.
    fn bounds_for_comment(&self, comment: &C) -> Option<Rectangle>;

    /// Bounds of the given attachment target, if they can be determined.
    fn bounds_for_target(&self, target: &T) -> Option<Rectangle>;

    fn preprocess(&self, _data: &dyn DataProvider<C, T>, _include_hierarchy: bool) {}

    fn cleanup(&self) {}
}

/// Bounds provider handle shared between the attacher and its collaborators
pub type SharedBounds<C, T> = Rc<dyn BoundsProvider<C, T>>;

impl<C, T, P> BoundsProvider<C, T> for Rc<P>
where
    P: BoundsProvider<C, T> + ?Sized,
{
    fn bounds_for_comment(&self, comment: &C) -> Option<Rectangle> {
        (**self).bounds_for_comment(comment)
    }

    fn bounds_for_target(&self, target: &T) -> Option<Rectangle> {
        (**self).bounds_for_target(target)
    }

    fn preprocess(&self, data: &dyn DataProvider<C, T>, include_hierarchy: bool) {
        (**self).preprocess(data, include_hierarchy);
    }

    fn cleanup(&self) {
        (**self).cleanup();
    }
}

/// Bounds provider decorator that computes the bounds of each comment and target only once per
/// run. Lookups that yield no bounds are remembered as well.
pub struct CachingBoundsProvider<C, T, P> {
    inner: P,
    comment_cache: RefCell<HashMap<C, Option<Rectangle>>>,
    target_cache: RefCell<HashMap<T, Option<Rectangle>>>,
}

impl<C, T, P> CachingBoundsProvider<C, T, P>
where
    C: Clone + Eq + Hash,
    T: Clone + Eq + Hash,
    P: BoundsProvider<C, T>,
{
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            comment_cache: RefCell::new(HashMap::new()),
            target_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached comment and target entries
    pub fn cached_entries(&self) -> (usize, usize) {
        (
            self.comment_cache.borrow().len(),
            self.target_cache.borrow().len(),
        )
    }
}

impl<C, T, P> BoundsProvider<C, T> for CachingBoundsProvider<C, T, P>
where
    C: Clone + Eq + Hash,
    T: Clone + Eq + Hash,
    P: BoundsProvider<C, T>,
{
    fn bounds_for_comment(&self, comment: &C) -> Option<Rectangle> {
        if let Some(cached) = self.comment_cache.borrow().get(comment) {
            return *cached;
        }

        let bounds = self.inner.bounds_for_comment(comment);
        self.comment_cache
            .borrow_mut()
            .insert(comment.clone(), bounds);
        bounds
    }

    fn bounds_for_target(&self, target: &T) -> Option<Rectangle> {
        if let Some(cached) = self.target_cache.borrow().get(target) {
            return *cached;
        }

        let bounds = self.inner.bounds_for_target(target);
        self.target_cache.borrow_mut().insert(target.clone(), bounds);
        bounds
    }

    fn preprocess(&self, data: &dyn DataProvider<C, T>, include_hierarchy: bool) {
        self.inner.preprocess(data, include_hierarchy);
    }

    fn cleanup(&self) {
        self.comment_cache.borrow_mut().clear();
        self.target_cache.borrow_mut().clear();
        self.inner.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingBounds {
        comment_lookups: Cell<usize>,
        target_lookups: Cell<usize>,
        cleanups: Cell<usize>,
    }

    impl BoundsProvider<u32, u32> for CountingBounds {
        fn bounds_for_comment(&self, comment: &u32) -> Option<Rectangle> {
            self.comment_lookups.set(self.comment_lookups.get() + 1);
            (*comment != 0).then(|| Rectangle::new(*comment as f64, 0.0, 1.0, 1.0))
        }

        fn bounds_for_target(&self, target: &u32) -> Option<Rectangle> {
            self.target_lookups.set(self.target_lookups.get() + 1);
            Some(Rectangle::new(0.0, *target as f64, 1.0, 1.0))
        }

        fn cleanup(&self) {
            self.cleanups.set(self.cleanups.get() + 1);
        }
    }

    #[test]
    fn test_comment_bounds_computed_once() {
        let cache = CachingBoundsProvider::new(CountingBounds::default());

        let first = cache.bounds_for_comment(&3);
        let second = cache.bounds_for_comment(&3);

        assert_eq!(first, second);
        assert_eq!(cache.inner().comment_lookups.get(), 1);
    }

    #[test]
    fn test_missing_bounds_are_cached_too() {
        let cache = CachingBoundsProvider::new(CountingBounds::default());

        assert_eq!(cache.bounds_for_comment(&0), None);
        assert_eq!(cache.bounds_for_comment(&0), None);
        assert_eq!(cache.inner().comment_lookups.get(), 1);
    }

    #[test]
    fn test_cleanup_clears_and_forwards() {
        let cache = CachingBoundsProvider::new(CountingBounds::default());
        cache.bounds_for_comment(&1);
        cache.bounds_for_target(&1);
        cache.bounds_for_target(&1);
        assert_eq!(cache.cached_entries(), (1, 1));
        assert_eq!(cache.inner().target_lookups.get(), 1);

        cache.cleanup();
        assert_eq!(cache.cached_entries(), (0, 0));
        assert_eq!(cache.inner().cleanups.get(), 1);

        cache.bounds_for_target(&1);
        assert_eq!(cache.inner().target_lookups.get(), 2);
    }
}
