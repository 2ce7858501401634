//! Descriptor heap offset arithmetic.
//!
//! A descriptor heap is a table of fixed-size records; the handle for slot
//! `n` lives at `base + n × increment`, where the increment is queried from
//! the device. [`HeapLayout`] keeps that arithmetic in one typed accessor
//! instead of scattering raw address math across the renderer.

/// Base address and per-descriptor stride of one heap.
#[derive(Debug, Clone, Copy)]
pub struct HeapLayout {
    base: usize,
    increment: usize,
    len: usize,
}

impl HeapLayout {
    pub fn new(base: usize, increment: usize, len: usize) -> Self {
        Self {
            base,
            increment,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address of the descriptor in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds; callers index with the type-safe
    /// back-buffer index, which is always in range.
    pub fn at(&self, index: usize) -> usize {
        assert!(
            index < self.len,
            "descriptor index {} out of bounds (len {})",
            index,
            self.len
        );
        self.base + index * self.increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_spaced_by_the_increment() {
        let layout = HeapLayout::new(0x1000, 32, 2);
        assert_eq!(layout.at(0), 0x1000);
        assert_eq!(layout.at(1), 0x1020);
    }

    #[test]
    fn slot_for_index_is_stable() {
        // The RTV bound for back buffer i must always be the one created
        // for slot i at surface-creation time.
        let layout = HeapLayout::new(0xfe00, 128, 2);
        let first = [layout.at(0), layout.at(1)];
        let second = [layout.at(0), layout.at(1)];
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_slot_panics() {
        let layout = HeapLayout::new(0, 32, 2);
        let _ = layout.at(2);
    }
}
