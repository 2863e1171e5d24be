// Failure injection through an engine whose resets and encodes fail on demand.
//
// Coverage:
//   - a failed background reset discards only that context; the warmer keeps
//     serving later returns and the counter records the failure
//   - a failed warm-up leaves the Clean set short; borrows still succeed by
//     fallback once binds work again
//   - a failed fallback bind surfaces to the caller
//   - a failed encode surfaces unchanged, leaves dst untouched, and still
//     returns the context to the pool
//   - a reset that panics on a warmer thread is counted as a failure; the
//     worker survives and keeps refreshing

use std::sync::Arc;

use zprewarm::{DictRegistry, Encoder, EncoderOptions, Error, PrewarmPool};

use crate::support::{raw_dict, wait_for, FlakyEngine};

fn registry() -> DictRegistry {
    let mut reg = DictRegistry::new();
    reg.register(raw_dict(1, 4096)).unwrap();
    reg
}

fn flaky_pool(target: usize) -> (Arc<FlakyEngine>, PrewarmPool<FlakyEngine>) {
    let engine = Arc::new(FlakyEngine::default());
    let pool = PrewarmPool::new(Arc::clone(&engine), &registry(), target).unwrap();
    (engine, pool)
}

#[test]
fn failed_refresh_discards_only_that_context() {
    let (engine, pool) = flaky_pool(1);
    assert!(wait_for(|| pool.stats(1).unwrap().clean == 1));

    let lease = pool.borrow(1).unwrap();
    engine.set_fail_resets(true);
    drop(lease);
    assert!(wait_for(|| {
        let stats = pool.stats(1).unwrap();
        stats.reset_failures == 1 && stats.outstanding == 0
    }));
    assert_eq!(pool.stats(1).unwrap().clean, 0);

    // No retry: the pool stays short until demand recreates a context.
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert_eq!(pool.stats(1).unwrap().clean, 0);

    engine.set_fail_resets(false);
    let lease = pool.borrow(1).unwrap();
    assert_eq!(pool.stats(1).unwrap().fallbacks, 1);
    drop(lease);
    // The warmer is still alive and refreshes the new context.
    assert!(wait_for(|| pool.stats(1).unwrap().clean == 1));
}

#[test]
fn failed_warm_up_is_recovered_by_fallback() {
    let engine = Arc::new(FlakyEngine::default());
    engine.set_fail_resets(true);
    let pool = PrewarmPool::new(Arc::clone(&engine), &registry(), 2).unwrap();
    assert!(wait_for(|| pool.stats(1).unwrap().warming == 0));
    let stats = pool.stats(1).unwrap();
    assert_eq!(stats.clean, 0);
    assert_eq!(stats.reset_failures, 2);

    engine.set_fail_resets(false);
    let lease = pool.borrow(1).unwrap();
    assert_eq!(lease.dict_id(), 1);
    assert_eq!(pool.stats(1).unwrap().fallbacks, 1);
}

#[test]
fn failed_fallback_bind_surfaces() {
    let (engine, pool) = flaky_pool(1);
    assert!(wait_for(|| pool.stats(1).unwrap().clean == 1));
    let held = pool.borrow(1).unwrap();

    engine.set_fail_resets(true);
    match pool.borrow(1) {
        Err(Error::DictionaryBind { id, .. }) => assert_eq!(id, 1),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("bind failure was hidden"),
    }
    assert_eq!(pool.stats(1).unwrap().outstanding, 1);
    engine.set_fail_resets(false);
    drop(held);
    assert!(wait_for(|| pool.stats(1).unwrap().outstanding == 0));
}

#[test]
fn failed_encode_returns_context_and_surfaces_error() {
    let enc = Encoder::with_engine(
        FlakyEngine::default(),
        EncoderOptions::new()
            .with_prewarm_concurrency(1)
            .with_dictionary(raw_dict(1, 4096)),
    )
    .unwrap();
    assert!(wait_for(|| enc.pool_stats(1).unwrap().clean == 1));

    enc.engine().set_fail_encodes(true);
    let mut dst = b"untouched".to_vec();
    let res = enc.encode_all_prewarmed(b"payload", &mut dst);
    assert!(matches!(res, Err(Error::Encode(_))));
    assert_eq!(dst, b"untouched");

    // The context went back Dirty and was refreshed.
    assert!(wait_for(|| {
        let stats = enc.pool_stats(1).unwrap();
        stats.outstanding == 0 && stats.clean == 1
    }));
    assert_eq!(enc.pool_stats(1).unwrap().created, 1);

    enc.engine().set_fail_encodes(false);
    dst.clear();
    assert!(enc.encode_all_prewarmed(b"payload", &mut dst).unwrap() > 0);
}

#[test]
fn panicking_refresh_keeps_worker_alive() {
    // Target 1 runs a single warmer worker.
    let (engine, pool) = flaky_pool(1);
    assert_eq!(pool.warmer_workers(), 1);
    assert!(wait_for(|| pool.stats(1).unwrap().clean == 1));

    let lease = pool.borrow(1).unwrap();
    engine.set_panic_resets(true);
    drop(lease);
    assert!(wait_for(|| {
        let stats = pool.stats(1).unwrap();
        stats.reset_failures == 1 && stats.outstanding == 0
    }));
    assert_eq!(pool.stats(1).unwrap().clean, 0);

    engine.set_panic_resets(false);
    let lease = pool.borrow(1).unwrap();
    drop(lease);
    // Only a live worker can bring the context back Clean.
    assert!(wait_for(|| {
        let stats = pool.stats(1).unwrap();
        stats.outstanding == 0 && stats.clean == 1
    }));
}

#[test]
fn panicking_warm_up_settles_warming_count() {
    let engine = Arc::new(FlakyEngine::default());
    engine.set_panic_resets(true);
    let pool = PrewarmPool::new(Arc::clone(&engine), &registry(), 2).unwrap();
    assert!(wait_for(|| pool.stats(1).unwrap().warming == 0));
    let stats = pool.stats(1).unwrap();
    assert_eq!(stats.reset_failures, 2);
    assert_eq!(stats.clean, 0);
}
