// Multi-part encoding: a slice of parts is one logical input and one frame.
//
// Coverage:
//   - 32 parts with random sizes (some empty), no dictionary, checksum off
//   - 16 parts against a trained dictionary, standard and prewarmed
//   - parts decode to the same bytes as the concatenated single input
//   - exactly one frame is produced regardless of part count

use zprewarm::engine::header::{parse_frame_header, FrameKind};
use zprewarm::sample::SampleRng;
use zprewarm::{Decoder, DecoderOptions, Encoder, EncoderOptions};

use crate::support::{pattern, trained_dict};

fn random_parts(seed: u32, count: usize) -> Vec<Vec<u8>> {
    let mut rng = SampleRng::new(seed);
    (0..count)
        .map(|_| {
            let n = if rng.next_below(8) == 0 {
                0
            } else {
                rng.next_below(4096) as usize
            };
            (0..n).map(|_| rng.next_below(256) as u8).collect()
        })
        .collect()
}

fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.iter().flatten().copied().collect()
}

#[test]
fn parts_without_dictionary_round_trip() {
    let parts = random_parts(1, 32);
    let want = concat(&parts);
    let refs: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();

    let enc = Encoder::new(
        EncoderOptions::new()
            .with_checksum(false)
            .with_concurrency(1),
    )
    .unwrap();
    let dec = Decoder::new(DecoderOptions::new()).unwrap();

    let mut encoded = Vec::new();
    enc.encode_all_parts(&refs, &mut encoded).unwrap();
    assert_eq!(dec.decode_to_vec(&encoded).unwrap(), want);
}

#[test]
fn parts_with_trained_dictionary_round_trip() {
    let dict = trained_dict(123);
    let samples: Vec<Vec<u8>> = (0..16).map(|i| pattern(i * 7, 256 + 32 * i as usize)).collect();
    let want = concat(&samples);
    let refs: Vec<&[u8]> = samples.iter().map(Vec::as_slice).collect();

    let enc = Encoder::new(
        EncoderOptions::new()
            .with_checksum(false)
            .with_level(1)
            .with_concurrency(1)
            .with_prewarm_concurrency(1)
            .with_dictionary(dict.clone()),
    )
    .unwrap();
    let dec = Decoder::new(DecoderOptions::new().with_dictionary(dict)).unwrap();

    let mut standard = Vec::new();
    enc.encode_all_parts(&refs, &mut standard).unwrap();
    assert_eq!(dec.decode_to_vec(&standard).unwrap(), want);

    let mut prewarmed = Vec::new();
    enc.encode_all_parts_prewarmed(&refs, &mut prewarmed).unwrap();
    assert_eq!(dec.decode_to_vec(&prewarmed).unwrap(), want);

    match parse_frame_header(&prewarmed).unwrap() {
        FrameKind::Zstd(header) => assert_eq!(header.dict_id, Some(123)),
        FrameKind::Skippable { .. } => panic!("expected a zstd frame"),
    }
}

#[test]
fn parts_equal_single_input() {
    let parts = random_parts(5, 8);
    let whole = concat(&parts);
    let refs: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();

    let enc = Encoder::new(EncoderOptions::new()).unwrap();
    let dec = Decoder::new(DecoderOptions::new()).unwrap();

    let mut from_parts = Vec::new();
    enc.encode_all_parts(&refs, &mut from_parts).unwrap();
    let mut from_whole = Vec::new();
    enc.encode_all(&whole, &mut from_whole).unwrap();

    assert_eq!(
        dec.decode_to_vec(&from_parts).unwrap(),
        dec.decode_to_vec(&from_whole).unwrap()
    );
}

#[test]
fn many_parts_make_one_frame() {
    let parts = random_parts(9, 64);
    let refs: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
    let enc = Encoder::new(EncoderOptions::new()).unwrap();

    let mut encoded = Vec::new();
    enc.encode_all_parts(&refs, &mut encoded).unwrap();
    let mut two_frames = encoded.clone();
    // A second frame appended decodes to the data twice; one frame decodes once.
    enc.encode_all_parts(&refs, &mut two_frames).unwrap();

    let dec = Decoder::new(DecoderOptions::new()).unwrap();
    let once = dec.decode_to_vec(&encoded).unwrap();
    let twice = dec.decode_to_vec(&two_frames).unwrap();
    assert_eq!(once, concat(&parts));
    assert_eq!(twice.len(), 2 * once.len());
}

#[test]
fn no_parts_is_an_empty_frame() {
    let enc = Encoder::new(EncoderOptions::new()).unwrap();
    let mut encoded = Vec::new();
    assert!(enc.encode_all_parts(&[], &mut encoded).unwrap() > 0);
    let dec = Decoder::new(DecoderOptions::new()).unwrap();
    assert!(dec.decode_to_vec(&encoded).unwrap().is_empty());
}
