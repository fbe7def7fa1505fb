//! Per-chunk locking under concurrent callers.

use crate::common::*;
use chunkform::{Block, BlockComponent, ChunkKey, FormatVersion, NamespacedId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn racing_callers_share_one_lock_per_key() {
    let translator = Arc::new(world_translator());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let translator = Arc::clone(&translator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                translator.lock(ChunkKey::new(3, 3))
            })
        })
        .collect();

    let locks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for lock in &locks[1..] {
        assert!(Arc::ptr_eq(&locks[0], lock));
    }
}

#[test]
fn held_chunk_does_not_block_its_neighbour() {
    let translator = Arc::new(world_translator());
    let chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();

    let held = translator.lock(ChunkKey::new(0, 0));
    let _guard = held.lock();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let translator = Arc::clone(&translator);
        thread::spawn(move || {
            let key = ChunkKey::new(0, 1);
            let raw = translator.save_chunk(key, &chunk, FormatVersion::new(2)).unwrap();
            translator.load_chunk(key, &raw).unwrap();
            tx.send(()).unwrap();
        })
    };

    rx.recv_timeout(Duration::from_secs(5))
        .expect("neighbouring chunk should not wait on the held lock");
    worker.join().unwrap();
}

#[test]
fn same_chunk_saves_are_serialized() {
    let translator = Arc::new(world_translator());
    let key = ChunkKey::new(-1, 8);
    let chunk = translator
        .create_chunk(Block::new("core", "air"), NamespacedId::new("core", "plains"))
        .unwrap();
    let threads = 4;
    let barrier = Arc::new(Barrier::new(threads));
    let inside = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let translator = Arc::clone(&translator);
            let barrier = Arc::clone(&barrier);
            let inside = Arc::clone(&inside);
            let overlaps = Arc::clone(&overlaps);
            let mut chunk = chunk.clone();
            thread::spawn(move || {
                chunk
                    .get_mut::<BlockComponent>()
                    .unwrap()
                    .set_block(i, 0, 0, Block::new("core", "stone"))
                    .unwrap();
                barrier.wait();
                for _ in 0..20 {
                    let lock = translator.lock(key);
                    let _guard = lock.lock();
                    if inside.swap(true, Ordering::SeqCst) {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    let raw = translator.save_chunk(key, &chunk, FormatVersion::new(3)).unwrap();
                    let loaded = translator.load_chunk(key, &raw).unwrap();
                    assert_eq!(
                        loaded.get::<BlockComponent>().unwrap().block_at(i, 0, 0).unwrap(),
                        &Block::new("core", "stone")
                    );
                    inside.store(false, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}

#[test]
fn contended_key_is_visible_to_other_threads() {
    let translator = Arc::new(world_translator());
    let key = ChunkKey::new(5, 5);
    let lock = translator.lock(key);
    let guard = lock.lock();

    let probe = {
        let translator = Arc::clone(&translator);
        thread::spawn(move || {
            let lock = translator.lock(key);
            let probed = (lock.is_locked(), lock.try_lock().is_none());
            probed
        })
    };
    assert_eq!(probe.join().unwrap(), (true, true));

    drop(guard);
    let lock = translator.lock(key);
    assert!(lock.try_lock().is_some());
}
