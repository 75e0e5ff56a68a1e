use crate::facade::Feature;

/// Picks the parent of a row whose `Parent` attribute lists more than one
/// ID while the store does not allow multiple parentage.
///
/// `line` is the row after text correction and `candidates` are the listed
/// parents in attribute order. `None`, or an index past the end, means no
/// choice could be made.
///
/// Closures with the same signature are resolvers too:
///
/// ```
/// use gfftree::prelude::*;
///
/// let by_type = |_: &str, candidates: &[Feature<'_>]| {
///     candidates
///         .iter()
///         .position(|f| f.feature_type().map(|t| t.as_str() == "mRNA").unwrap_or(false))
/// };
/// let builder = GffReaderBuilder::default().with_parent_resolver(by_type.or_else(Leftmost));
/// # let _ = builder;
/// ```
pub trait ParentResolver: Send + Sync {
    fn resolve(
        &self,
        line: &str,
        candidates: &[Feature<'_>],
    ) -> Option<usize>;

    /// Uses `fallback` whenever `self` cannot decide.
    fn or_else<R: ParentResolver>(
        self,
        fallback: R,
    ) -> Fallback<Self, R>
    where
        Self: Sized, {
        Fallback {
            primary: self,
            fallback,
        }
    }
}

/// First listed parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leftmost;

/// Last listed parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rightmost;

/// See [`ParentResolver::or_else`].
#[derive(Debug, Clone, Copy)]
pub struct Fallback<A, B> {
    primary:  A,
    fallback: B,
}

impl ParentResolver for Leftmost {
    fn resolve(
        &self,
        _line: &str,
        candidates: &[Feature<'_>],
    ) -> Option<usize> {
        (!candidates.is_empty()).then_some(0)
    }
}

impl ParentResolver for Rightmost {
    fn resolve(
        &self,
        _line: &str,
        candidates: &[Feature<'_>],
    ) -> Option<usize> {
        candidates.len().checked_sub(1)
    }
}

impl<A: ParentResolver, B: ParentResolver> ParentResolver for Fallback<A, B> {
    fn resolve(
        &self,
        line: &str,
        candidates: &[Feature<'_>],
    ) -> Option<usize> {
        self.primary
            .resolve(line, candidates)
            .filter(|idx| *idx < candidates.len())
            .or_else(|| self.fallback.resolve(line, candidates))
    }
}

impl<F> ParentResolver for F
where
    F: Fn(&str, &[Feature<'_>]) -> Option<usize> + Send + Sync,
{
    fn resolve(
        &self,
        line: &str,
        candidates: &[Feature<'_>],
    ) -> Option<usize> {
        self(line, candidates)
    }
}
