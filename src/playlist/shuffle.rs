//! In-place Fisher–Yates shuffle.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Uniformly permutes `items` in place.
///
/// For each position `i` a partner `j` is drawn from `i..len` and the two
/// are swapped. Slices of length 0 or 1 are left untouched.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    let len = items.len();
    for i in 0..len {
        let j = rng.random_range(i..len);
        items.swap(i, j);
    }
}

/// A cryptographically strong generator seeded from the operating system.
#[must_use]
pub fn secure_rng() -> StdRng {
    StdRng::from_os_rng()
}
