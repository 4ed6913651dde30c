//! Unit tests for the benchmark candidate generators.

use rstest::rstest;

/// Include the benchmark support module from the benches directory.
#[path = "../benches/bench_support.rs"]
mod bench_support;

use bench_support::{BENCHMARK_SEED, benchmark_now, generate_candidates, generate_profile};

#[rstest]
#[case(0)]
#[case(1)]
#[case(250)]
fn generates_requested_number_of_candidates(#[case] count: usize) {
    assert_eq!(generate_candidates(count, BENCHMARK_SEED).len(), count);
}

#[rstest]
fn candidates_are_deterministic_per_seed() {
    assert_eq!(
        generate_candidates(50, BENCHMARK_SEED),
        generate_candidates(50, BENCHMARK_SEED)
    );
    assert_ne!(
        generate_candidates(50, BENCHMARK_SEED),
        generate_candidates(50, BENCHMARK_SEED + 1)
    );
}

#[rstest]
fn candidates_have_sequential_ids_and_past_timestamps() {
    let now = benchmark_now();
    let candidates = generate_candidates(30, BENCHMARK_SEED);
    for (expected, candidate) in (1_u64..).zip(&candidates) {
        assert_eq!(candidate.id.get(), expected);
        assert!(candidate.created_at <= now);
        assert!(candidate.tags.len() <= 4);
    }
}

#[rstest]
#[expect(clippy::float_arithmetic, reason = "profile weights sum to one")]
fn profile_is_normalised() {
    let profile = generate_profile(60, BENCHMARK_SEED);
    assert!(!profile.is_empty());
    assert!((profile.total_weight() - 1.0).abs() < 1e-9);
    assert!(generate_profile(0, BENCHMARK_SEED).is_empty());
}
