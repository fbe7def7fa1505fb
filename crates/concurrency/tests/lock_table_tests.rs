//! Multi-threaded tests for the key lock table
//!
//! These tests exercise the table under real concurrent execution:
//!
//! 1. **Same instance** - racing first requests for one key share a lock
//! 2. **Isolation** - holding one key never blocks another
//! 3. **Mutual exclusion** - same-key critical sections never overlap
//! 4. **Reclamation** - entries disappear once every handle is dropped

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

use chunkform_concurrency::KeyLockTable;

// ============================================================================
// Same instance
// ============================================================================

#[test]
fn racing_first_requests_share_one_lock() {
    const THREADS: usize = 16;
    let table = KeyLockTable::<(i32, i32)>::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let table = table.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                table.get(&(12, -4))
            })
        })
        .collect();

    let locks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for lock in &locks[1..] {
        assert!(Arc::ptr_eq(&locks[0], lock));
    }
    assert_eq!(table.len(), 1);
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn held_key_does_not_block_other_keys() {
    let table = KeyLockTable::<u64>::new();
    let held = table.get(&1);
    let _guard = held.lock();

    let (tx, rx) = mpsc::channel();
    let worker_table = table.clone();
    let worker = thread::spawn(move || {
        let other = worker_table.get(&2);
        let _g = other.lock();
        tx.send(()).unwrap();
    });

    rx.recv_timeout(Duration::from_secs(5))
        .expect("distinct key blocked behind a held lock");
    worker.join().unwrap();
}

// ============================================================================
// Mutual exclusion
// ============================================================================

#[test]
fn same_key_sections_never_overlap() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 200;
    let table = KeyLockTable::<&'static str>::new();
    let inside = Arc::new(AtomicBool::new(false));
    let entered = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let table = table.clone();
            let inside = Arc::clone(&inside);
            let entered = Arc::clone(&entered);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    let lock = table.get(&"region/0/0");
                    let _guard = lock.lock();
                    assert!(!inside.swap(true, Ordering::SeqCst), "two holders at once");
                    entered.fetch_add(1, Ordering::SeqCst);
                    inside.store(false, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(entered.load(Ordering::SeqCst), THREADS * ROUNDS);
    assert!(table.is_empty());
}

// ============================================================================
// Reclamation
// ============================================================================

#[test]
fn entries_reclaimed_after_concurrent_use() {
    const THREADS: usize = 8;
    let table = KeyLockTable::<usize>::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let table = table.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for key in 0..32 {
                    let lock = table.get(&((key + i) % 32));
                    drop(lock.lock());
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(table.len(), 0);
    assert_eq!(table.purge(), 0);
}
