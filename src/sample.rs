// sample.rs: synthetic inputs for benchmarks, fixtures and the `bench` command
//
// Values look like small key/value records: a handful of recurring field
// names and tokens with pseudo-random numbers mixed in. That is the shape
// dictionary compression is meant for, so a dictionary built from
// `gen_repeat` or trained on `gen_pattern` samples actually pays off.

const FIELDS: &[&str] = &[
    "id", "user", "ts", "kind", "status", "region", "score", "tags", "ref", "seq",
];

const TOKENS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
    "ok", "pending", "failed", "eu-west", "us-east", "ap-south", "true", "false",
];

/// Small deterministic PRNG (multiply / xor / rotate), seedable for fixtures.
#[derive(Debug, Clone)]
pub struct SampleRng {
    state: u32,
}

impl SampleRng {
    pub fn new(seed: u32) -> Self {
        SampleRng { state: seed ^ 0x9E37_79B9 }
    }

    /// Uniform-ish value in `0..range`.
    #[inline]
    pub fn next_below(&mut self, range: u32) -> u32 {
        const PRIME1: u32 = 2_654_435_761;
        const PRIME2: u32 = 2_246_822_519;
        let mut r = self.state.wrapping_mul(PRIME1);
        r ^= PRIME2;
        r = r.rotate_left(13);
        self.state = r;
        ((r as u64 * range as u64) >> 32) as u32
    }
}

/// `len` bytes of record-shaped text drawn from `rng`.
pub fn gen_pattern(rng: &mut SampleRng, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 32);
    while out.len() < len {
        out.push(b'{');
        let nb_fields = 2 + rng.next_below(5);
        for i in 0..nb_fields {
            if i > 0 {
                out.push(b',');
            }
            let field = FIELDS[rng.next_below(FIELDS.len() as u32) as usize];
            out.extend_from_slice(field.as_bytes());
            out.push(b'=');
            if rng.next_below(3) == 0 {
                out.extend_from_slice(rng.next_below(1_000_000).to_string().as_bytes());
            } else {
                let token = TOKENS[rng.next_below(TOKENS.len() as u32) as usize];
                out.extend_from_slice(token.as_bytes());
            }
        }
        out.extend_from_slice(b"}\n");
    }
    out.truncate(len);
    out
}

/// `len` bytes cycling through the field and token vocabulary; used as raw
/// dictionary history.
pub fn gen_repeat(len: usize) -> Vec<u8> {
    let mut unit = Vec::new();
    for (i, field) in FIELDS.iter().enumerate() {
        unit.extend_from_slice(field.as_bytes());
        unit.push(b'=');
        unit.extend_from_slice(TOKENS[i % TOKENS.len()].as_bytes());
        unit.push(b',');
    }
    for token in TOKENS {
        unit.extend_from_slice(token.as_bytes());
        unit.push(b' ');
    }
    unit.push(b'\n');
    unit.iter().copied().cycle().take(len).collect()
}
