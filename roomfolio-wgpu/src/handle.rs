use std::collections::HashMap;

/// Store mapping opaque u64 handles to GPU resources.
/// Handles start at 1 and are never reused within a store.
pub struct HandleStore<T> {
    items: HashMap<u64, T>,
    next: u64,
}

impl<T> HandleStore<T> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            next: 1,
        }
    }

    /// Insert an item and return its handle.
    pub fn insert(&mut self, item: T) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.items.insert(handle, item);
        handle
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        self.items.get(&handle)
    }

}

impl<T> Default for HandleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
