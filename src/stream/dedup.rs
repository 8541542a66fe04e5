// src/stream/dedup.rs
//
// Per-subscriber duplicate filter
//
// Holds the last value handed to one subscriber. Owned by that
// subscriber's delivery task, so it is never shared.

pub struct DuplicateFilter<T> {
    last: Option<T>,
}

impl<T: PartialEq + Clone> DuplicateFilter<T> {
    /// `initial` is what the subscriber already shows, if anything.
    /// A first value equal to it is suppressed.
    pub fn new(initial: Option<T>) -> Self {
        Self { last: initial }
    }

    /// Returns the value when it differs from the previous one
    pub fn admit(&mut self, value: T) -> Option<T> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

impl<T: PartialEq + Clone> Default for DuplicateFilter<T> {
    fn default() -> Self {
        Self::new(None)
    }
}
