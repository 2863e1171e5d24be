// Round-trip tests for the standard and prewarmed encode facades.
//
// Coverage:
//   - prewarmed and standard frames both decode to the input (1 KiB, 256 KiB)
//   - prewarm concurrency 0 routes prewarmed calls through the standard path
//   - 4 threads × 50 prewarmed encodes against one encoder, each verified
//   - batch encoding keeps input order
//   - dst is appended to, never overwritten
//   - empty input encodes to a valid, empty frame

use std::thread;

use zprewarm::{Decoder, DecoderOptions, Encoder, EncoderOptions};

use crate::support::{pattern, raw_dict};

fn pair(prewarm: usize) -> (Encoder, Decoder) {
    let dict = raw_dict(1, 8 << 10);
    let enc = Encoder::new(
        EncoderOptions::new()
            .with_prewarm_concurrency(prewarm)
            .with_dictionary(dict.clone()),
    )
    .unwrap();
    let dec = Decoder::new(DecoderOptions::new().with_dictionary(dict)).unwrap();
    (enc, dec)
}

#[test]
fn prewarmed_and_standard_both_round_trip() {
    let (enc, dec) = pair(2);
    for (i, input) in [pattern(1, 1 << 10), pattern(2, 256 << 10)].iter().enumerate() {
        let mut prewarmed = Vec::new();
        enc.encode_all_prewarmed(input, &mut prewarmed).unwrap();
        assert_eq!(&dec.decode_to_vec(&prewarmed).unwrap(), input, "prewarmed[{i}]");

        let mut standard = Vec::new();
        enc.encode_all(input, &mut standard).unwrap();
        assert_eq!(&dec.decode_to_vec(&standard).unwrap(), input, "standard[{i}]");
    }
}

#[test]
fn prewarm_zero_uses_standard_path() {
    let (enc, dec) = pair(0);
    assert!(!enc.prewarm_enabled());
    assert!(enc.pool_stats(1).is_none());

    let input = pattern(3, 4096);
    let mut dst = Vec::new();
    enc.encode_all_prewarmed(&input, &mut dst).unwrap();
    assert_eq!(dec.decode_to_vec(&dst).unwrap(), input);
}

#[test]
fn concurrent_prewarmed_encodes_round_trip() {
    let dict = raw_dict(1, 8 << 10);
    let enc = Encoder::new(
        EncoderOptions::new()
            .with_concurrency(4)
            .with_prewarm_concurrency(4)
            .with_dictionary(dict.clone()),
    )
    .unwrap();
    let input = pattern(2, 64 << 10);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let dec = Decoder::new(DecoderOptions::new().with_dictionary(dict.clone())).unwrap();
                let mut dst = Vec::new();
                for _ in 0..50 {
                    dst.clear();
                    enc.encode_all_prewarmed(&input, &mut dst).unwrap();
                    assert_eq!(dec.decode_to_vec(&dst).unwrap(), input);
                }
            });
        }
    });

    let stats = enc.pool_stats(1).unwrap();
    assert_eq!(stats.hits + stats.fallbacks, 200);
}

#[test]
fn batch_preserves_order() {
    let (enc, dec) = pair(2);
    let inputs: Vec<Vec<u8>> = (0..16).map(|i| pattern(100 + i, 2048 + i as usize)).collect();
    let refs: Vec<&[u8]> = inputs.iter().map(Vec::as_slice).collect();
    let frames = enc.encode_batch_prewarmed(&refs).unwrap();
    assert_eq!(frames.len(), inputs.len());
    for (frame, input) in frames.iter().zip(&inputs) {
        assert_eq!(&dec.decode_to_vec(frame).unwrap(), input);
    }
}

#[test]
fn dst_is_appended_to() {
    let (enc, dec) = pair(1);
    let input = pattern(4, 1000);
    let mut dst = b"prefix".to_vec();
    let n = enc.encode_all_prewarmed(&input, &mut dst).unwrap();
    assert_eq!(dst.len(), 6 + n);
    assert_eq!(&dst[..6], b"prefix");
    assert_eq!(dec.decode_to_vec(&dst[6..]).unwrap(), input);
}

#[test]
fn empty_input_round_trips() {
    let (enc, dec) = pair(1);
    let mut dst = Vec::new();
    assert!(enc.encode_all_prewarmed(&[], &mut dst).unwrap() > 0);
    assert!(dec.decode_to_vec(&dst).unwrap().is_empty());
}

#[test]
fn max_encoded_size_bounds_output() {
    let (enc, _) = pair(1);
    let input = pattern(5, 32 << 10);
    let mut dst = Vec::new();
    let n = enc.encode_all_prewarmed(&input, &mut dst).unwrap();
    assert!(n <= enc.max_encoded_size(input.len()));
}
