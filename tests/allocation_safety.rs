//! The per-sample path must not touch the allocator.
//!
//! `nih_plug`'s `assert_process_allocs` feature installs the allocation
//! checker as the global allocator in debug builds, so these only run there.
#![cfg(debug_assertions)]

use assert_no_alloc::assert_no_alloc;
use multiband_deesser::dsp::{MultibandDeEsser, NUM_BANDS};

#[test]
fn test_process_and_reset_do_not_allocate() {
    let mut dsp = MultibandDeEsser::new();
    dsp.prepare(48000.0, 512);

    let mut left: Vec<f32> = (0..512).map(|i| (i as f32 * 0.7).sin() * 0.9).collect();
    let mut right: Vec<f32> = (0..512).map(|i| (i as f32 * 0.3).cos() * 0.9).collect();
    let amounts = [1.0; NUM_BANDS];

    for _ in 0..50 {
        assert_no_alloc(|| {
            dsp.process(&mut left, Some(&mut right), -18.0, &amounts, true);
            dsp.process(&mut left, None, -18.0, &amounts, false);
        });
    }
    assert_no_alloc(|| dsp.reset());

    assert!(left.iter().chain(right.iter()).all(|s| s.is_finite()));
}
