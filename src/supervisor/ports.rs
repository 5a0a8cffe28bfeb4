//! Local port allocation for launched instances.

use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out sequential ports starting at a fixed base.
///
/// Ports are never reused and gaps are never filled. Safe to share across
/// concurrent launches; every call returns a distinct value.
#[derive(Debug)]
pub struct PortAllocator {
    next: AtomicU32,
}

impl PortAllocator {
    pub fn new(base: u16) -> Self {
        Self {
            next: AtomicU32::new(u32::from(base)),
        }
    }

    /// Next unused port, or `None` once the port range is exhausted.
    pub fn allocate(&self) -> Option<u16> {
        let port = self.next.fetch_add(1, Ordering::Relaxed);
        u16::try_from(port).ok()
    }
}
