// SPDX-License-Identifier: AGPL-3.0-only

//! Per-open-descriptor state.
//!
//! Each time the intercepted device node is opened, a [`Session`] is
//! created and keyed by the file descriptor. A session owns the handle
//! table of the buffer objects created through it. Driver stacks create
//! and map buffer objects from several threads at once, so the table is
//! internally synchronized.

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::bo::Bo;

/// State attached to one open descriptor of the emulated device node.
#[derive(Debug)]
pub struct Session {
    fd: RawFd,
    bos: Mutex<HashMap<u32, Arc<Bo>>>,
    next_handle: AtomicU32,
}

impl Session {
    fn new(fd: RawFd) -> Self {
        Self {
            fd,
            bos: Mutex::new(HashMap::new()),
            // GEM handles start at 1; 0 is the invalid handle.
            next_handle: AtomicU32::new(1),
        }
    }

    /// The descriptor this session is keyed by.
    #[must_use]
    pub const fn fd(&self) -> RawFd {
        self.fd
    }

    /// Register a buffer object and return its handle.
    pub fn register(&self, bo: Arc<Bo>) -> u32 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.bos.lock().unwrap().insert(handle, bo);
        handle
    }

    /// Look up a buffer object by handle.
    #[must_use]
    pub fn lookup(&self, handle: u32) -> Option<Arc<Bo>> {
        self.bos.lock().unwrap().get(&handle).cloned()
    }

    /// Number of live buffer objects in this session.
    #[must_use]
    pub fn bo_count(&self) -> usize {
        self.bos.lock().unwrap().len()
    }
}

/// Table of live sessions, keyed by file descriptor.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<RawFd, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a newly opened descriptor.
    ///
    /// A reused descriptor number replaces the stale session outright —
    /// the kernel guarantees the old open is gone before the number
    /// comes back.
    pub fn open(&self, fd: RawFd) -> Arc<Session> {
        let session = Arc::new(Session::new(fd));
        self.sessions.lock().unwrap().insert(fd, Arc::clone(&session));
        session
    }

    /// Look up the session for a descriptor.
    #[must_use]
    pub fn lookup(&self, fd: RawFd) -> Option<Arc<Session>> {
        self.sessions.lock().unwrap().get(&fd).cloned()
    }

    /// Drop the session for a closed descriptor.
    ///
    /// Buffer objects registered with it are released with the last
    /// reference.
    pub fn close(&self, fd: RawFd) {
        self.sessions.lock().unwrap().remove(&fd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bo::BoHeap;

    #[test]
    fn handles_start_at_one_and_increase() {
        let heap = BoHeap::new().unwrap();
        let session = Session::new(3);
        let h1 = session.register(heap.alloc(16).unwrap());
        let h2 = session.register(heap.alloc(16).unwrap());
        assert_eq!(h1, 1);
        assert_eq!(h2, 2);
    }

    #[test]
    fn lookup_finds_only_registered_handles() {
        let heap = BoHeap::new().unwrap();
        let session = Session::new(3);
        let handle = session.register(heap.alloc(4096).unwrap());
        assert!(session.lookup(handle).is_some());
        assert!(session.lookup(handle + 1).is_none());
        assert!(session.lookup(0).is_none());
    }

    #[test]
    fn registry_round_trip() {
        let registry = SessionRegistry::new();
        let session = registry.open(7);
        assert_eq!(registry.lookup(7).unwrap().fd(), session.fd());
        registry.close(7);
        assert!(registry.lookup(7).is_none());
    }

    #[test]
    fn sessions_do_not_share_handles() {
        let heap = BoHeap::new().unwrap();
        let registry = SessionRegistry::new();
        let a = registry.open(3);
        let b = registry.open(4);
        let handle = a.register(heap.alloc(64).unwrap());
        assert!(a.lookup(handle).is_some());
        assert!(b.lookup(handle).is_none());
    }

    #[test]
    fn concurrent_registration_yields_unique_handles() {
        let heap = Arc::new(BoHeap::new().unwrap());
        let session = Arc::new(Session::new(3));

        let mut joins = Vec::new();
        for _ in 0..8 {
            let heap = Arc::clone(&heap);
            let session = Arc::clone(&session);
            joins.push(std::thread::spawn(move || {
                (0..32)
                    .map(|_| session.register(heap.alloc(4096).unwrap()))
                    .collect::<Vec<_>>()
            }));
        }

        let mut handles: Vec<u32> = joins
            .into_iter()
            .flat_map(|j| j.join().unwrap())
            .collect();
        handles.sort_unstable();
        handles.dedup();
        assert_eq!(handles.len(), 8 * 32);
        assert_eq!(session.bo_count(), 8 * 32);
    }
}
