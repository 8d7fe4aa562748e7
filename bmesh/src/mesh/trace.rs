use ahash::AHashSet;
use std::hash::Hash;

/// Trace of a walk over a cycle.
pub trait Trace<T> {
    /// Inserts the given breadcrumb into the trace.
    ///
    /// If an intersection with the trace is detected, then this function
    /// returns `false` and otherwise returns `true` (similarly to collections
    /// like `HashSet`). If `false` is returned, then the walk should
    /// terminate.
    fn insert(&mut self, breadcrumb: T) -> bool;
}

/// Trace that detects any breadcrumb that has been previously encountered.
///
/// Walks over cycles of unknown consistency use this trace to detect links
/// that close into a loop that excludes the starting element, which would
/// otherwise never terminate.
#[derive(Clone, Debug, Default)]
pub struct TraceAny<T>
where
    T: Copy + Eq + Hash,
{
    breadcrumbs: AHashSet<T>,
}

impl<T> Trace<T> for TraceAny<T>
where
    T: Copy + Eq + Hash,
{
    fn insert(&mut self, breadcrumb: T) -> bool {
        self.breadcrumbs.insert(breadcrumb)
    }
}
