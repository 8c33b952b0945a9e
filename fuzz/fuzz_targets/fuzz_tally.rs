#![no_main]

use libfuzzer_sys::fuzz_target;

use covenant_governance::{isqrt, resolve, Outcome};

// Vote weighting and outcome resolution over the full u128 range.
fuzz_target!(|data: &[u8]| {
    if data.len() < 48 {
        return;
    }
    let word = |i: usize| {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&data[i * 16..(i + 1) * 16]);
        u128::from_le_bytes(buf)
    };
    let (raw, against, quorum) = (word(0), word(1), word(2));

    let root = isqrt(raw);
    assert!(root.checked_mul(root).is_some_and(|sq| sq <= raw));
    let next = root + 1;
    assert!(next.checked_mul(next).map_or(true, |sq| sq > raw));

    match resolve(root, against, quorum) {
        Outcome::Defeated => assert!(root <= against),
        Outcome::QuorumFailed => assert!(root > against && root < quorum),
        Outcome::Succeeded => assert!(root > against && root >= quorum),
    }
});
