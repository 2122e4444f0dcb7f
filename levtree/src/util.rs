use std::ops::Bound;

pub(crate) trait IterExt<'a>: Iterator + Sized {
    fn boxed(self) -> BoxedIter<'a, Self::Item>;
}

pub type BoxedIter<'a, T> = Box<dyn Iterator<Item = T> + Send + 'a>;

impl<'a, T: Iterator + Sized + Send + 'a> IterExt<'a> for T {
    fn boxed(self) -> BoxedIter<'a, Self::Item> {
        Box::new(self)
    }
}

/// Upper bound of the range of all keys starting with `prefix`.
///
/// This is the prefix with trailing 0xff bytes removed and the last byte incremented,
/// or unbounded if the prefix consists of 0xff bytes only.
pub(crate) fn prefix_end(prefix: &[u8]) -> Bound<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return Bound::Excluded(end);
        }
    }
    Bound::Unbounded
}
