//! Reusable byte buffers for the encode path.
//!
//! Buffers are handed out by value, so a buffer has exactly one holder until
//! it is released back.

use parking_lot::Mutex;

#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
    initial_capacity: usize,
}

impl BufferPool {
    /// Pool keeping at most `max_pooled` idle buffers. New buffers start with
    /// `initial_capacity` bytes reserved.
    pub fn new(max_pooled: usize, initial_capacity: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::with_capacity(max_pooled)),
            max_pooled,
            initial_capacity,
        }
    }

    /// Take an idle buffer, or allocate one. The buffer is empty.
    pub fn acquire(&self) -> Vec<u8> {
        self.buffers
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity))
    }

    /// Give a buffer back. Dropped when the pool is full.
    pub fn release(&self, mut buffer: Vec<u8>) {
        buffer.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_pooled {
            buffers.push(buffer);
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.buffers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_allocates_with_capacity() {
        let pool = BufferPool::new(2, 1024);
        let buffer = pool.acquire();
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= 1024);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_release_clears_and_reuses() {
        let pool = BufferPool::new(2, 16);
        let mut buffer = pool.acquire();
        buffer.extend_from_slice(b"payload");
        let ptr = buffer.as_ptr();
        pool.release(buffer);

        let reused = pool.acquire();
        assert!(reused.is_empty());
        assert_eq!(reused.as_ptr(), ptr);
    }

    #[test]
    fn test_release_drops_when_full() {
        let pool = BufferPool::new(1, 16);
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_concurrent_holders_never_share_a_buffer() {
        let pool = BufferPool::new(4, 64);
        std::thread::scope(|scope| {
            for tag in 0..8u8 {
                let pool = &pool;
                scope.spawn(move || {
                    for _ in 0..200 {
                        let mut buffer = pool.acquire();
                        assert!(buffer.is_empty());
                        buffer.resize(64, tag);
                        std::thread::yield_now();
                        assert!(buffer.iter().all(|b| *b == tag));
                        pool.release(buffer);
                    }
                });
            }
        });
        assert!(pool.idle() <= 4);
    }
}
