use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Audio sample ring shared by the decoder (writer) and audio output (reader).
///
/// Writes never block: once full, the oldest samples are dropped.
pub struct SampleRing<T> {
    inner: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> SampleRing<T> {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        })
    }

    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let mut buf = self.inner.lock();
        for item in items {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(item);
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_write_order() {
        let ring = SampleRing::new(8);
        ring.extend([1.0f32, 2.0, 3.0]);

        assert_eq!(ring.try_pop(), Some(1.0));
        assert_eq!(ring.try_pop(), Some(2.0));
        assert!(!ring.is_empty());
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let ring = SampleRing::new(3);
        ring.extend(0..5);

        assert_eq!(ring.try_pop(), Some(2));
        assert_eq!(ring.try_pop(), Some(3));
        assert_eq!(ring.try_pop(), Some(4));
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn clear_empties() {
        let ring = SampleRing::new(4);
        ring.extend([7u8, 8]);
        ring.clear();
        assert!(ring.is_empty());
    }
}
