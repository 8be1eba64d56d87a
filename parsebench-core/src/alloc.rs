// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Allocation accounting for timed parse loops.
//!
//! `CountingAllocator` wraps the system allocator and keeps per-thread
//! byte/call counters. A benchmark worker samples its own thread's counters
//! around the loop, so concurrent workers never see each other's traffic.
//! The counters stay at zero unless a binary installs the allocator:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: parsebench_core::CountingAllocator = parsebench_core::CountingAllocator;
//! ```
//!
//! Numbers reflect this allocator only and are not comparable across runtimes.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static BYTES_ALLOCATED: Cell<u64> = const { Cell::new(0) };
    static ALLOCATIONS: Cell<u64> = const { Cell::new(0) };
}

/// System allocator wrapper counting allocations per thread.
pub struct CountingAllocator;

#[inline]
fn record(size: usize) {
    // try_with: the slot may already be gone during thread teardown.
    let _ = BYTES_ALLOCATED.try_with(|b| b.set(b.get().wrapping_add(size as u64)));
    let _ = ALLOCATIONS.try_with(|c| c.set(c.get().wrapping_add(1)));
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

/// Counter values for the calling thread at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    pub bytes: u64,
    pub count: u64,
}

impl AllocSnapshot {
    /// Read the calling thread's counters.
    pub fn take() -> Self {
        Self {
            bytes: BYTES_ALLOCATED.try_with(Cell::get).unwrap_or(0),
            count: ALLOCATIONS.try_with(Cell::get).unwrap_or(0),
        }
    }

    /// Allocation traffic between `earlier` and this snapshot.
    pub fn since(&self, earlier: AllocSnapshot) -> AllocDelta {
        AllocDelta {
            bytes: self.bytes.wrapping_sub(earlier.bytes),
            count: self.count.wrapping_sub(earlier.count),
        }
    }
}

/// Bytes and allocation calls observed across a measured section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocDelta {
    pub bytes: u64,
    pub count: u64,
}
