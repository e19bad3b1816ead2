//! Bucket-count selection used by automatic rehashing.
//!
//! Bucket counts are biased towards primes so that `hash % buckets` spreads
//! weak hashes (such as shifted addresses) across the whole array. The
//! primality check is only trial division by small odd numbers; a composite
//! that slips through costs some load balance, never correctness.

/// Bucket count a table is reset to after `remove_all`.
pub const POST_CLEAR_BUCKETS: usize = 5;

/// Smallest bucket count `ideal_bucket_count` will propose.
const MIN_IDEAL_BUCKETS: usize = 5;

/// Cap on the starting candidate, leaving room to step up to the next
/// probable prime without overflow.
const MAX_IDEAL_START: usize = usize::MAX / 2;

/// Largest odd trial divisor.
const MAX_TRIAL_DIVISOR: usize = 49;

/// Trial-divides `n` by every odd number in `3..=49`.
///
/// Returns `true` when `n` equals one of the divisors, `false` when one of
/// them divides it, and `true` ("probably prime") otherwise. Callers only
/// pass odd numbers.
pub fn is_probable_prime(n: usize) -> bool {
    for divisor in (3..=MAX_TRIAL_DIVISOR).step_by(2) {
        if n == divisor {
            return true;
        }
        if n % divisor == 0 {
            return false;
        }
    }
    true
}

/// Bucket count that brings `elements / buckets` close to `ideal_ratio`.
///
/// Starts from `floor(elements / ideal_ratio)`, clamps to at least 5, forces
/// the value odd and then walks up in steps of two until
/// [`is_probable_prime`] accepts it.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn ideal_bucket_count(elements: usize, ideal_ratio: f32) -> usize {
    assert!(ideal_ratio > 0.0, "ideal ratio must be positive");

    let raw = (elements as f64 / f64::from(ideal_ratio)).floor();
    let mut candidate = if raw < MIN_IDEAL_BUCKETS as f64 {
        MIN_IDEAL_BUCKETS
    } else {
        // `as` saturates; the cap keeps the search below usize::MAX.
        (raw as usize).min(MAX_IDEAL_START) | 1
    };

    while !is_probable_prime(candidate) {
        candidate += 2;
    }
    candidate
}
