//! Deterministic address assignment.
//!
//! Stack addresses grow down from [`STACK_TOP`]; heap addresses grow up from
//! [`HEAP_BASE`]. Every block is aligned to [`ALIGNMENT`] bytes, so the same
//! sequence of requests always produces the same addresses.

use memviz_core::MemoryAddress;

/// Highest stack address
pub const STACK_TOP: u64 = 0x7FFF_0000_0000;

/// Lowest heap address
pub const HEAP_BASE: u64 = 0x1000;

/// Block alignment in bytes
pub const ALIGNMENT: u64 = 8;

/// Bump allocator for simulated stack and heap addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLayout {
    stack_pointer: u64,
    heap_pointer: u64,
}

impl AddressLayout {
    /// Create a layout with empty stack and heap
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack_pointer: STACK_TOP,
            heap_pointer: HEAP_BASE,
        }
    }

    /// Reserve `size` bytes on the stack and return the block's lowest address
    pub fn push_stack(&mut self, size: u64) -> MemoryAddress {
        self.stack_pointer = self.stack_pointer.saturating_sub(align(size));
        MemoryAddress::from_u64(self.stack_pointer)
    }

    /// Reserve `size` bytes on the heap and return the block's address
    pub fn alloc_heap(&mut self, size: u64) -> MemoryAddress {
        let addr = self.heap_pointer;
        self.heap_pointer = self.heap_pointer.saturating_add(align(size));
        MemoryAddress::from_u64(addr)
    }

    /// Current top of stack
    #[must_use]
    pub fn stack_pointer(&self) -> MemoryAddress {
        MemoryAddress::from_u64(self.stack_pointer)
    }

    /// Bytes reserved on the stack so far
    #[must_use]
    pub fn stack_used(&self) -> u64 {
        STACK_TOP - self.stack_pointer
    }

    /// Bytes reserved on the heap so far
    #[must_use]
    pub fn heap_used(&self) -> u64 {
        self.heap_pointer - HEAP_BASE
    }
}

impl Default for AddressLayout {
    fn default() -> Self {
        Self::new()
    }
}

fn align(size: u64) -> u64 {
    size.max(1).div_ceil(ALIGNMENT).saturating_mul(ALIGNMENT)
}
