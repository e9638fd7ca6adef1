use std::fmt::{Display, Formatter};

/// Renders at most `limit` leading items of a slice, noting how many were left out.
pub struct DisplayTruncated<'a, D: Display> {
    items: &'a [D],
    limit: usize,
}
impl<'a, D: Display> DisplayTruncated<'a, D> {
    pub fn new(items: &'a [D], limit: usize) -> Self {
        Self { items, limit }
    }
}

impl<'a, D: Display> Display for DisplayTruncated<'a, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        let shown = usize::min(self.items.len(), self.limit);
        for (index, item) in self.items[..shown].iter().enumerate() {
            write!(f, "{item}")?;
            if index != shown - 1 {
                write!(f, ", ")?;
            }
        }
        let omitted = self.items.len() - shown;
        if omitted > 0 {
            if shown > 0 {
                write!(f, ", ")?;
            }
            write!(f, "… {omitted} more")?;
        }
        write!(f, "]")
    }
}

impl<'a, D: Display> From<&'a [D]> for DisplayTruncated<'a, D> {
    fn from(items: &'a [D]) -> Self {
        Self::new(items, usize::MAX)
    }
}
