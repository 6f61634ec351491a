use crate::data::DataProvider;
use crate::error::Result;

/// Finds attachments that were established explicitly by whoever authored the diagram. Explicit
/// attachments take precedence over anything the heuristics come up with.
pub trait ExplicitAttachmentProvider<C, T> {
    /// The target the comment is explicitly attached to, if any.
    fn find_explicit_attachment(&self, comment: &C) -> Option<T>;

    fn preprocess(
        &mut self,
        _data: &dyn DataProvider<C, T>,
        _include_hierarchy: bool,
    ) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) {}
}

/// Explicit attachment provider that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExplicitAttachments;

impl<C, T> ExplicitAttachmentProvider<C, T> for NoExplicitAttachments {
    fn find_explicit_attachment(&self, _comment: &C) -> Option<T> {
        None
    }
}

/// Explicit attachment provider backed by a lookup function.
pub struct ExplicitAttachmentFn<F>(pub F);

impl<C, T, F> ExplicitAttachmentProvider<C, T> for ExplicitAttachmentFn<F>
where
    F: Fn(&C) -> Option<T>,
{
    fn find_explicit_attachment(&self, comment: &C) -> Option<T> {
        (self.0)(comment)
    }
}
