// e2e/concurrency.rs: whole-system stress of the prewarmed encoder
//
// Many callers hammer one encoder across several dictionaries while the pool
// warms, bursts and shuts down underneath them. Every frame produced must
// decode to its input, and the pool's bookkeeping must balance at the end.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use zprewarm::sample::{gen_pattern, gen_repeat, SampleRng};
use zprewarm::{Decoder, DecoderOptions, Dictionary, Encoder, EncoderOptions};

const CALLERS: usize = 8;
const CALLS: usize = 200;

fn dictionary(id: u32) -> Dictionary {
    // Distinct raw content per id so a wrong binding cannot decode by accident.
    let mut content = gen_repeat(4096);
    content.extend_from_slice(&id.to_le_bytes().repeat(64));
    Dictionary::new(id, content).unwrap()
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..5000 {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn mixed_sizes_single_dictionary() {
    let dict = dictionary(1);
    let enc = Encoder::new(
        EncoderOptions::new()
            .with_level(1)
            .with_prewarm_concurrency(4)
            .with_dictionary(dict.clone()),
    )
    .unwrap();
    let dec = Decoder::new(DecoderOptions::new().with_dictionary(dict)).unwrap();
    let start = Barrier::new(CALLERS);

    thread::scope(|s| {
        for caller in 0..CALLERS {
            let (enc, dec, start) = (&enc, &dec, &start);
            s.spawn(move || {
                let mut rng = SampleRng::new(caller as u32);
                let mut dst = Vec::new();
                start.wait();
                for _ in 0..CALLS {
                    let len = rng.next_below(16 << 10) as usize;
                    let input = gen_pattern(&mut rng, len);
                    dst.clear();
                    enc.encode_all_prewarmed(&input, &mut dst).unwrap();
                    assert_eq!(dec.decode_to_vec(&dst).unwrap(), input);
                }
            });
        }
    });

    assert!(wait_for(|| {
        let stats = enc.pool_stats(1).unwrap();
        stats.outstanding == 0 && stats.clean == 4
    }));
    let stats = enc.pool_stats(1).unwrap();
    assert_eq!(stats.hits + stats.fallbacks, CALLERS * CALLS);
    assert_eq!(stats.created, stats.clean + stats.retired + stats.reset_failures);
}

#[test]
fn many_dictionaries_interleaved() {
    // Raw-dictionary frames carry no id: each caller decodes with a decoder
    // holding only its own dictionary.
    let ids: Vec<u32> = (1..=4).collect();
    let mut options = EncoderOptions::new().with_prewarm_concurrency(2);
    for &id in &ids {
        options = options.with_dictionary(dictionary(id));
    }
    let enc = Encoder::new(options).unwrap();

    thread::scope(|s| {
        for caller in 0..CALLERS {
            let enc = &enc;
            let id = ids[caller % ids.len()];
            s.spawn(move || {
                let dec =
                    Decoder::new(DecoderOptions::new().with_dictionary(dictionary(id))).unwrap();
                let mut rng = SampleRng::new(1000 + caller as u32);
                for _ in 0..CALLS / 2 {
                    let input = gen_pattern(&mut rng, 2048);
                    let mut dst = Vec::new();
                    enc.encode_prewarmed_with(id, &[input.as_slice()], &mut dst)
                        .unwrap();
                    assert_eq!(dec.decode_to_vec(&dst).unwrap(), input);
                }
            });
        }
    });

    for &id in &ids {
        assert!(wait_for(|| enc.pool_stats(id).unwrap().outstanding == 0));
        let stats = enc.pool_stats(id).unwrap();
        assert_eq!(stats.hits + stats.fallbacks, (CALLERS / ids.len()) * (CALLS / 2));
    }
}

#[test]
fn shutdown_under_load() {
    let dict = dictionary(1);
    let enc = Encoder::new(
        EncoderOptions::new()
            .with_prewarm_concurrency(2)
            .with_dictionary(dict.clone()),
    )
    .unwrap();
    let dec = Decoder::new(DecoderOptions::new().with_dictionary(dict)).unwrap();
    let stop = AtomicBool::new(false);
    let done = AtomicUsize::new(0);

    thread::scope(|s| {
        for caller in 0..CALLERS {
            let (enc, dec, stop, done) = (&enc, &dec, &stop, &done);
            s.spawn(move || {
                let mut rng = SampleRng::new(caller as u32);
                let mut dst = Vec::new();
                while !stop.load(Ordering::Relaxed) {
                    let input = gen_pattern(&mut rng, 1024);
                    dst.clear();
                    enc.encode_all_prewarmed(&input, &mut dst).unwrap();
                    assert_eq!(dec.decode_to_vec(&dst).unwrap(), input);
                    done.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
        thread::sleep(Duration::from_millis(50));
        enc.shutdown();
        thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Relaxed);
    });

    assert!(done.load(Ordering::Relaxed) > 0);
    let stats = enc.pool_stats(1).unwrap();
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.clean, 0);
}
