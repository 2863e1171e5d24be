// Decoded-size limit.
//
// Coverage:
//   - streaming frames (no content size) are cut off once the limit is passed
//   - frames declaring a content size over the limit are rejected up front
//   - output exactly at the limit is accepted
//   - the limit applies to the whole call, across frames

use zprewarm::{Decoder, DecoderOptions, Encoder, EncoderOptions, Error};

use crate::support::pattern;

fn limited(limit: usize) -> Decoder {
    Decoder::new(DecoderOptions::new().with_max_decoded_size(limit)).unwrap()
}

fn encode(input: &[u8]) -> Vec<u8> {
    let enc = Encoder::new(EncoderOptions::new()).unwrap();
    let mut frame = Vec::new();
    enc.encode_all(input, &mut frame).unwrap();
    frame
}

#[test]
fn streaming_frame_over_limit() {
    let frame = encode(&pattern(1, 200_000));
    let mut out = Vec::new();
    let res = limited(1000).decode_all(&frame, &mut out);
    assert!(matches!(res, Err(Error::DecodedSizeLimit(1000))));
    assert!(out.is_empty());
}

#[test]
fn declared_content_size_over_limit() {
    let input = pattern(2, 5000);
    let frame = zstd::bulk::compress(&input, 3).unwrap();
    assert!(matches!(
        limited(4999).decode_to_vec(&frame),
        Err(Error::DecodedSizeLimit(4999))
    ));
    assert_eq!(limited(5000).decode_to_vec(&frame).unwrap(), input);
}

#[test]
fn output_at_limit_accepted() {
    let input = pattern(3, 4096);
    let frame = encode(&input);
    assert_eq!(limited(4096).decode_to_vec(&frame).unwrap(), input);
}

#[test]
fn limit_spans_frames() {
    let input = pattern(4, 3000);
    let mut stream = encode(&input);
    stream.extend_from_slice(&encode(&input));
    assert!(limited(6000).decode_to_vec(&stream).is_ok());
    assert!(matches!(
        limited(5999).decode_to_vec(&stream),
        Err(Error::DecodedSizeLimit(5999))
    ));
}
