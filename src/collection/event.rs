// Change events published by ItemCollection

/// Kind of change, without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Reset,
    Add,
    Remove,
}

/// A single change to an item collection
///
/// Every mutating operation publishes exactly one event. New subscribers
/// always receive a `Reset` with the full contents first.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    /// Contents replaced; `items` is the complete new contents
    Reset { items: Vec<T> },
    /// `items` were appended, in order
    Add { items: Vec<T> },
    /// `items` were removed starting at `index`
    Remove { index: usize, items: Vec<T> },
}

impl<T> ChangeEvent<T> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Reset { .. } => ChangeKind::Reset,
            ChangeEvent::Add { .. } => ChangeKind::Add,
            ChangeEvent::Remove { .. } => ChangeKind::Remove,
        }
    }

    /// Items carried by the event (delta for Add/Remove, contents for Reset)
    pub fn items(&self) -> &[T] {
        match self {
            ChangeEvent::Reset { items }
            | ChangeEvent::Add { items }
            | ChangeEvent::Remove { items, .. } => items,
        }
    }
}
