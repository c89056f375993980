pub mod config;
pub mod map;

/// Convenience helper for handing the most recent value from one thread to
/// another. For example from the thread running the refresh loop to the UI
/// thread that paints the panel.
#[derive(Clone)]
pub struct Latest<T>(std::sync::Arc<std::sync::Mutex<Option<T>>>);

// The slot starts empty; no `T: Default` bound.
impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(None)))
    }
}

impl<T> Latest<T> {
    /// Publishes `value`, replacing whatever was stored before.
    ///
    /// # Panics
    ///
    /// If locking the internally used mutex fails.
    pub fn publish(&self, value: T) {
        let mut slot = self.0.lock().unwrap();
        let _ = slot.insert(value);
    }

    /// Takes the stored value, leaving the slot empty.
    ///
    /// # Panics
    ///
    /// If locking the internally used mutex fails.
    pub fn take(&self) -> Option<T> {
        let mut slot = self.0.lock().unwrap();
        slot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_keeps_only_the_newest_value() {
        let latest = Latest::default();
        latest.publish(1);
        latest.publish(2);
        assert_eq!(latest.take(), Some(2));
        assert_eq!(latest.take(), None);
    }
}
