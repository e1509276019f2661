//! SIMD-aligned buffers and a shared free list for them.

use core::any::Any;
use core::ops::{Deref, DerefMut};
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::num::{Complex, Float, Precision};

/// Byte boundary every non-empty [`AlignedBuffer`] starts on. Wide enough for
/// AVX-512 loads and a full cache line.
pub const ALIGNMENT: usize = 64;

/// A run of complex values whose first element sits on an [`ALIGNMENT`]
/// boundary. The backing allocation is over-sized and the view slides
/// forward to the first aligned element.
pub struct AlignedBuffer<T: Float> {
    backing: Vec<Complex<T>>,
    offset: usize,
    len: usize,
}

impl<T: Float> AlignedBuffer<T> {
    pub fn empty() -> Self {
        Self {
            backing: Vec::new(),
            offset: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Complex<T>] {
        &self.backing[self.offset..self.offset + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex<T>] {
        &mut self.backing[self.offset..self.offset + self.len]
    }

    pub fn is_aligned(&self) -> bool {
        self.is_empty() || (self.as_ptr() as usize) % ALIGNMENT == 0
    }

    /// Total elements held by the backing store, padding included.
    pub fn capacity(&self) -> usize {
        self.backing.len()
    }

    pub fn fill_zero(&mut self) {
        self.as_mut_slice().fill(Complex::zero());
    }
}

impl<T: Float> Deref for AlignedBuffer<T> {
    type Target = [Complex<T>];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Float> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: Float> core::fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Allocates `count` zeroed elements starting on an [`ALIGNMENT`] boundary.
/// `count <= 0` yields an empty buffer.
pub fn alloc_aligned<T: Float>(count: isize) -> AlignedBuffer<T> {
    if count <= 0 {
        return AlignedBuffer::empty();
    }
    let len = count as usize;
    let elem = core::mem::size_of::<Complex<T>>();
    let slack = ALIGNMENT / elem;
    let backing = vec![Complex::zero(); len + slack];
    let offset = match backing.as_ptr().align_offset(ALIGNMENT) {
        o if o <= slack => o,
        // The allocator handed back memory that cannot reach the boundary in
        // whole elements; keep the view usable, just unaligned.
        _ => 0,
    };
    AlignedBuffer {
        backing,
        offset,
        len,
    }
}

type Key = (usize, Precision);

/// Concurrency-safe free list of aligned buffers keyed by length and
/// precision.
#[derive(Default)]
pub struct BufferPool {
    free: Mutex<HashMap<Key, Vec<Box<dyn Any + Send>>>>,
}

impl core::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let free = self.free.lock();
        f.debug_struct("BufferPool")
            .field("keys", &free.len())
            .finish()
    }
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide pool.
    pub fn global() -> &'static Arc<BufferPool> {
        static GLOBAL: OnceLock<Arc<BufferPool>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(BufferPool::new()))
    }

    /// A zeroed buffer of `size` elements, reused when one is free.
    pub fn get<T: Float>(&self, size: usize) -> AlignedBuffer<T> {
        let reused = {
            let mut free = self.free.lock();
            free.get_mut(&(size, T::PRECISION)).and_then(|v| v.pop())
        };
        match reused.and_then(|b| b.downcast::<AlignedBuffer<T>>().ok()) {
            Some(mut b) => {
                b.fill_zero();
                *b
            }
            None => {
                crate::trace!("pool miss: {} x {}", size, T::PRECISION);
                alloc_aligned(isize::try_from(size).unwrap_or(isize::MAX))
            }
        }
    }

    /// Returns a buffer to the free list. Empty buffers are dropped.
    pub fn put<T: Float>(&self, buffer: AlignedBuffer<T>) {
        if buffer.is_empty() {
            return;
        }
        let key = (buffer.len(), T::PRECISION);
        self.free.lock().entry(key).or_default().push(Box::new(buffer));
    }

    /// Number of free buffers for `(size, precision)`.
    pub fn cached(&self, size: usize, precision: Precision) -> usize {
        self.free
            .lock()
            .get(&(size, precision))
            .map_or(0, |v| v.len())
    }

    pub fn clear(&self) {
        self.free.lock().clear();
    }
}
