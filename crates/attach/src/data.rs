use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Provides the comments and attachment targets of one level of a hierarchical data set.
///
/// Scopes form a tree through [`DataProvider::provide_sub_hierarchies`]. The attacher walks that
/// tree breadth-first and reports every attachment it decides on through
/// [`DataProvider::attach`] of the root scope.
pub trait DataProvider<C, T> {
    /// Comments on this level, in a stable order.
    fn provide_comments(&self) -> Vec<C>;

    /// Attachment targets on this level, in a stable order.
    fn provide_targets(&self) -> Vec<T>;

    /// Attachment targets considered for the given comment. Implementations may restrict the
    /// candidates to speed things up or to rule out nonsensical pairs.
    fn provide_targets_for(&self, _comment: &C) -> Vec<T> {
        self.provide_targets()
    }

    /// Data providers for the levels nested below this one.
    fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<C, T>>>;

    /// Attach the comment to the target. Calling this twice for the same pair is the caller's
    /// problem.
    fn attach(&self, comment: &C, target: &T);

    /// Called on the root scope before a run starts.
    fn preprocess(&self, _include_hierarchy: bool) {}

    /// Called on the root scope once a run has finished scoring, even if it failed.
    fn cleanup(&self) {}
}

/// Data provider decorator that materializes everything it is asked for only once.
///
/// Sub-hierarchies are wrapped in caching providers as well. [`DataProvider::attach`] is
/// forwarded as is. [`DataProvider::cleanup`] forgets everything, so a cached root can be reused
/// for the next run.
pub struct CachingDataProvider<C, T> {
    inner: Rc<dyn DataProvider<C, T>>,
    comments: RefCell<Option<Vec<C>>>,
    targets: RefCell<Option<Vec<T>>>,
    targets_for: RefCell<HashMap<C, Vec<T>>>,
    sub_hierarchies: RefCell<Option<Vec<Rc<dyn DataProvider<C, T>>>>>,
}

impl<C, T> CachingDataProvider<C, T>
where
    C: Clone + Eq + Hash + 'static,
    T: Clone + 'static,
{
    pub fn new(inner: impl DataProvider<C, T> + 'static) -> Self {
        Self::from_rc(Rc::new(inner))
    }

    pub fn from_rc(inner: Rc<dyn DataProvider<C, T>>) -> Self {
        Self {
            inner,
            comments: RefCell::new(None),
            targets: RefCell::new(None),
            targets_for: RefCell::new(HashMap::new()),
            sub_hierarchies: RefCell::new(None),
        }
    }
}

fn cached<V: Clone>(cell: &RefCell<Option<V>>, load: impl FnOnce() -> V) -> V {
    if let Some(value) = cell.borrow().as_ref() {
        return value.clone();
    }

    let value = load();
    *cell.borrow_mut() = Some(value.clone());
    value
}

impl<C, T> DataProvider<C, T> for CachingDataProvider<C, T>
where
    C: Clone + Eq + Hash + 'static,
    T: Clone + 'static,
{
    fn provide_comments(&self) -> Vec<C> {
        cached(&self.comments, || self.inner.provide_comments())
    }

    fn provide_targets(&self) -> Vec<T> {
        cached(&self.targets, || self.inner.provide_targets())
    }

    fn provide_targets_for(&self, comment: &C) -> Vec<T> {
        if let Some(cached) = self.targets_for.borrow().get(comment) {
            return cached.clone();
        }

        let targets = self.inner.provide_targets_for(comment);
        self.targets_for
            .borrow_mut()
            .insert(comment.clone(), targets.clone());
        targets
    }

    fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<C, T>>> {
        cached(&self.sub_hierarchies, || {
            self.inner
                .provide_sub_hierarchies()
                .into_iter()
                .map(|sub| {
                    Rc::new(CachingDataProvider::from_rc(sub)) as Rc<dyn DataProvider<C, T>>
                })
                .collect()
        })
    }

    fn attach(&self, comment: &C, target: &T) {
        self.inner.attach(comment, target);
    }

    fn preprocess(&self, include_hierarchy: bool) {
        self.inner.preprocess(include_hierarchy);
    }

    /// Forget everything cached so far, including cached sub-hierarchies, and forward to the
    /// wrapped provider.
    fn cleanup(&self) {
        self.comments.borrow_mut().take();
        self.targets.borrow_mut().take();
        self.targets_for.borrow_mut().clear();
        let subs = self.sub_hierarchies.borrow_mut().take();
        for sub in subs.into_iter().flatten() {
            sub.cleanup();
        }
        self.inner.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[derive(Default)]
    struct Calls {
        comments: Cell<usize>,
        targets: Cell<usize>,
        targets_for: Cell<usize>,
        subs: Cell<usize>,
        cleanups: Cell<usize>,
        attached: RefCell<Vec<(u32, u32)>>,
    }

    struct Level {
        depth: u32,
        calls: Rc<Calls>,
    }

    impl DataProvider<u32, u32> for Level {
        fn provide_comments(&self) -> Vec<u32> {
            self.calls.comments.set(self.calls.comments.get() + 1);
            vec![self.depth * 10, self.depth * 10 + 1]
        }

        fn provide_targets(&self) -> Vec<u32> {
            self.calls.targets.set(self.calls.targets.get() + 1);
            vec![self.depth * 100]
        }

        fn provide_targets_for(&self, comment: &u32) -> Vec<u32> {
            self.calls.targets_for.set(self.calls.targets_for.get() + 1);
            vec![*comment + 1000]
        }

        fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<u32, u32>>> {
            self.calls.subs.set(self.calls.subs.get() + 1);
            if self.depth >= 1 {
                return Vec::new();
            }
            vec![Rc::new(Level {
                depth: self.depth + 1,
                calls: Rc::clone(&self.calls),
            })]
        }

        fn attach(&self, comment: &u32, target: &u32) {
            self.calls.attached.borrow_mut().push((*comment, *target));
        }

        fn cleanup(&self) {
            self.calls.cleanups.set(self.calls.cleanups.get() + 1);
        }
    }

    struct AllTargets;

    impl DataProvider<u32, u32> for AllTargets {
        fn provide_comments(&self) -> Vec<u32> {
            vec![1]
        }

        fn provide_targets(&self) -> Vec<u32> {
            vec![7, 8]
        }

        fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<u32, u32>>> {
            Vec::new()
        }

        fn attach(&self, _comment: &u32, _target: &u32) {}
    }

    fn cached_root() -> (CachingDataProvider<u32, u32>, Rc<Calls>) {
        let calls = Rc::new(Calls::default());
        let root = CachingDataProvider::new(Level {
            depth: 0,
            calls: Rc::clone(&calls),
        });
        (root, calls)
    }

    #[test]
    fn test_targets_for_defaults_to_all_targets() {
        assert_eq!(AllTargets.provide_targets_for(&1), vec![7, 8]);
    }

    #[test]
    fn test_materializes_once() {
        let (root, calls) = cached_root();

        assert_eq!(root.provide_comments(), vec![0, 1]);
        assert_eq!(root.provide_comments(), vec![0, 1]);
        assert_eq!(root.provide_targets(), vec![0]);
        assert_eq!(root.provide_targets(), vec![0]);
        assert_eq!(root.provide_targets_for(&1), vec![1001]);
        assert_eq!(root.provide_targets_for(&1), vec![1001]);
        assert_eq!(root.provide_targets_for(&0), vec![1000]);

        assert_eq!(calls.comments.get(), 1);
        assert_eq!(calls.targets.get(), 1);
        assert_eq!(calls.targets_for.get(), 2);
    }

    #[test]
    fn test_sub_hierarchies_are_cached_recursively() {
        let (root, calls) = cached_root();

        let subs = root.provide_sub_hierarchies();
        assert_eq!(subs.len(), 1);
        assert_eq!(root.provide_sub_hierarchies().len(), 1);
        assert_eq!(calls.subs.get(), 1);

        let child = &subs[0];
        assert_eq!(child.provide_comments(), vec![10, 11]);
        assert_eq!(child.provide_comments(), vec![10, 11]);
        // one lookup for the child itself, none for the cached second call
        assert_eq!(calls.comments.get(), 1);
    }

    #[test]
    fn test_attach_is_not_cached() {
        let (root, calls) = cached_root();

        root.attach(&1, &2);
        root.attach(&1, &2);

        assert_eq!(*calls.attached.borrow(), vec![(1, 2), (1, 2)]);
    }

    #[test]
    fn test_cleanup_forgets_cached_values() {
        let (root, calls) = cached_root();

        root.provide_comments();
        root.provide_targets_for(&1);
        let child = Rc::clone(&root.provide_sub_hierarchies()[0]);
        child.provide_comments();
        root.cleanup();

        root.provide_comments();
        root.provide_targets_for(&1);
        root.provide_sub_hierarchies();
        child.provide_comments();

        assert_eq!(calls.comments.get(), 4);
        assert_eq!(calls.targets_for.get(), 2);
        assert_eq!(calls.subs.get(), 2);
        // the cached child forwards as well
        assert_eq!(calls.cleanups.get(), 2);
    }
}
