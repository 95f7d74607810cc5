mod binary_subtype;
mod bson;
mod document;
mod extjson;
mod raw;
mod roundtrip;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock over the process-wide state (the ObjectId generator) that some tests
/// manipulate. Tests that only read the state take the lock concurrently;
/// tests that reset it take it exclusively.
pub(crate) struct TestLock {
    lock: RwLock<()>,
}

impl TestLock {
    pub(crate) fn new() -> Self {
        Self {
            lock: RwLock::new(()),
        }
    }

    pub(crate) fn run_concurrently(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap()
    }

    pub(crate) fn run_exclusively(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap()
    }
}
