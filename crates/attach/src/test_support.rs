use crate::bounds::BoundsProvider;
use crate::data::DataProvider;
use crate::geometry::Rectangle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Comments and targets share one id space, each id has at most one rectangle
#[derive(Default)]
pub(crate) struct MapBounds(pub HashMap<u32, Rectangle>);

impl MapBounds {
    pub(crate) fn with(mut self, id: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.0.insert(id, Rectangle::new(x, y, width, height));
        self
    }
}

impl BoundsProvider<u32, u32> for MapBounds {
    fn bounds_for_comment(&self, comment: &u32) -> Option<Rectangle> {
        self.0.get(comment).copied()
    }

    fn bounds_for_target(&self, target: &u32) -> Option<Rectangle> {
        self.0.get(target).copied()
    }
}

#[derive(Default)]
pub(crate) struct TestScope {
    pub comments: Vec<u32>,
    pub targets: Vec<u32>,
    pub children: Vec<Rc<TestScope>>,
    pub attached: RefCell<Vec<(u32, u32)>>,
}

impl TestScope {
    pub(crate) fn new(comments: &[u32], targets: &[u32]) -> Self {
        Self {
            comments: comments.to_vec(),
            targets: targets.to_vec(),
            ..Default::default()
        }
    }

    pub(crate) fn with_child(mut self, child: TestScope) -> Self {
        self.children.push(Rc::new(child));
        self
    }
}

impl DataProvider<u32, u32> for TestScope {
    fn provide_comments(&self) -> Vec<u32> {
        self.comments.clone()
    }

    fn provide_targets(&self) -> Vec<u32> {
        self.targets.clone()
    }

    fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<u32, u32>>> {
        self.children
            .iter()
            .map(|child| Rc::clone(child) as Rc<dyn DataProvider<u32, u32>>)
            .collect()
    }

    fn attach(&self, comment: &u32, target: &u32) {
        self.attached.borrow_mut().push((*comment, *target));
    }
}
