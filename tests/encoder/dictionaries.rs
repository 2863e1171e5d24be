// Several dictionaries behind one encoder.
//
// Coverage:
//   - each registered dictionary gets its own pool, warmed independently
//   - frames carry the id they were encoded with; one decoder handles all
//   - unknown ids are rejected on both facades
//   - the default dictionary is the first registered unless overridden
//   - re-registering the same dictionary is a no-op, different content is not

use zprewarm::{Decoder, DecoderOptions, Encoder, EncoderOptions, Error};

use crate::support::{pattern, raw_dict, trained_dict, wait_for};

fn two_dict_encoder(prewarm: usize) -> Encoder {
    Encoder::new(
        EncoderOptions::new()
            .with_prewarm_concurrency(prewarm)
            .with_dictionary(trained_dict(10))
            .with_dictionary(trained_dict(20)),
    )
    .unwrap()
}

#[test]
fn each_dictionary_has_its_own_pool() {
    let enc = two_dict_encoder(2);
    assert!(wait_for(|| enc.pool_stats(10).unwrap().clean == 2));
    assert!(wait_for(|| enc.pool_stats(20).unwrap().clean == 2));
    assert!(enc.pool_stats(30).is_none());
}

#[test]
fn frames_route_to_their_dictionary() {
    let enc = two_dict_encoder(1);
    let dec = Decoder::new(
        DecoderOptions::new()
            .with_dictionary(trained_dict(10))
            .with_dictionary(trained_dict(20)),
    )
    .unwrap();
    let a = pattern(1, 3000);
    let b = pattern(2, 5000);

    let mut stream = Vec::new();
    enc.encode_prewarmed_with(10, &[a.as_slice()], &mut stream).unwrap();
    enc.encode_prewarmed_with(20, &[b.as_slice()], &mut stream).unwrap();
    enc.encode_standard_with(10, &[b.as_slice()], &mut stream).unwrap();

    let mut want = a.clone();
    want.extend_from_slice(&b);
    want.extend_from_slice(&b);
    assert_eq!(dec.decode_to_vec(&stream).unwrap(), want);
}

#[test]
fn unknown_dictionary_rejected() {
    let enc = two_dict_encoder(1);
    let mut dst = Vec::new();
    assert!(matches!(
        enc.encode_prewarmed_with(99, &[b"x".as_slice()], &mut dst),
        Err(Error::UnknownDictionary(99))
    ));
    assert!(matches!(
        enc.encode_standard_with(99, &[b"x".as_slice()], &mut dst),
        Err(Error::UnknownDictionary(99))
    ));
    assert!(dst.is_empty());
}

#[test]
fn default_dictionary_selection() {
    let enc = two_dict_encoder(0);
    assert_eq!(enc.default_dictionary(), Some(10));

    let enc = Encoder::new(
        EncoderOptions::new()
            .with_dictionary(trained_dict(10))
            .with_dictionary(trained_dict(20))
            .with_default_dictionary(20),
    )
    .unwrap();
    assert_eq!(enc.default_dictionary(), Some(20));

    let dec = Decoder::new(DecoderOptions::new().with_dictionary(trained_dict(20))).unwrap();
    let input = pattern(3, 2048);
    let mut dst = Vec::new();
    enc.encode_all(&input, &mut dst).unwrap();
    assert_eq!(dec.decode_to_vec(&dst).unwrap(), input);
}

#[test]
fn duplicate_registration() {
    let same = Encoder::new(
        EncoderOptions::new()
            .with_dictionary(raw_dict(5, 1024))
            .with_dictionary(raw_dict(5, 1024)),
    );
    assert!(same.is_ok());
    assert_eq!(same.unwrap().registry().len(), 1);

    let clash = Encoder::new(
        EncoderOptions::new()
            .with_dictionary(raw_dict(5, 1024))
            .with_dictionary(raw_dict(5, 2048)),
    );
    assert!(matches!(clash, Err(Error::DuplicateDictionary(5))));
}
