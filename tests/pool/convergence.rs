// Population convergence under bursts.
//
// Coverage:
//   - a burst of B > target concurrent borrows is served without waiting
//   - every returned context comes back Clean; once the warmer is idle the
//     Clean set settles at target and the surplus is counted as retired
//   - repeated bursts do not grow the pool without bound
//   - with several dictionaries, a burst on one settles even when the last
//     job the warmer drains belongs to another

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use zprewarm::{DictRegistry, PrewarmPool, ZstdEngine};

use crate::support::{raw_dict, wait_for, FlakyEngine};

const TARGET: usize = 2;
const BURST: usize = 8;

fn pool() -> PrewarmPool<ZstdEngine> {
    let mut reg = DictRegistry::new();
    reg.register(raw_dict(1, 8192)).unwrap();
    PrewarmPool::new(Arc::new(ZstdEngine::default()), &reg, TARGET).unwrap()
}

/// Hold BURST leases at once, then release them all.
fn burst(p: &PrewarmPool<ZstdEngine>) {
    let barrier = Barrier::new(BURST);
    thread::scope(|s| {
        for _ in 0..BURST {
            s.spawn(|| {
                let lease = p.borrow(1).unwrap();
                barrier.wait();
                drop(lease);
            });
        }
    });
}

fn settled(p: &PrewarmPool<ZstdEngine>) -> bool {
    let stats = p.stats(1).unwrap();
    stats.outstanding == 0 && stats.clean == TARGET
}

#[test]
fn burst_settles_back_to_target() {
    let p = pool();
    assert!(wait_for(|| p.stats(1).unwrap().clean == TARGET));

    burst(&p);
    let stats = p.stats(1).unwrap();
    assert_eq!(stats.hits + stats.fallbacks, BURST);
    assert!(stats.fallbacks >= BURST - TARGET);

    assert!(wait_for(|| settled(&p)), "stats: {:?}", p.stats(1));
    let stats = p.stats(1).unwrap();
    assert_eq!(stats.retired, stats.created - TARGET);
}

#[test]
fn repeated_bursts_stay_bounded() {
    let p = pool();
    assert!(wait_for(|| p.stats(1).unwrap().clean == TARGET));
    for _ in 0..3 {
        burst(&p);
        assert!(wait_for(|| settled(&p)), "stats: {:?}", p.stats(1));
    }
    let stats = p.stats(1).unwrap();
    assert_eq!(stats.hits + stats.fallbacks, 3 * BURST);
    assert!(stats.created <= TARGET + 3 * BURST);
}

#[test]
fn burst_settles_when_other_dictionary_drains_last() {
    let engine = Arc::new(FlakyEngine::default());
    let mut reg = DictRegistry::new();
    reg.register(raw_dict(1, 4096)).unwrap();
    reg.register(raw_dict(2, 2048)).unwrap();
    // Target 1: one worker, so jobs drain strictly in queue order.
    let p = PrewarmPool::new(Arc::clone(&engine), &reg, 1).unwrap();
    assert!(wait_for(|| {
        p.stats(1).unwrap().clean == 1 && p.stats(2).unwrap().clean == 1
    }));

    // Slow resets keep the queue non-empty until the dictionary 2 job.
    engine.set_reset_delay(Duration::from_millis(20));
    let burst: Vec<_> = (0..4).map(|_| p.borrow(1).unwrap()).collect();
    let other = p.borrow(2).unwrap();
    drop(burst);
    drop(other);

    for id in [1, 2] {
        assert!(
            wait_for(|| {
                let stats = p.stats(id).unwrap();
                stats.outstanding == 0 && stats.clean == 1
            }),
            "dict {id}: {:?}",
            p.stats(id)
        );
    }
    let stats = p.stats(1).unwrap();
    assert_eq!(stats.created, 4);
    assert_eq!(stats.retired, 3);
}
