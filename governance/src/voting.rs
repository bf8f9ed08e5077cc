//! Quadratic vote weighting.
//!
//! `weight(balance) = floor(isqrt(balance) × multiplier / scale)`
//!
//! Quorum uses the same transform on a fraction of supply, so participation
//! and threshold are always compared in the same unit.

/// Integer square root: the largest `r` with `r * r <= n`.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Newton's method from an overestimate; the sequence decreases to the root.
    let mut x = 1u128 << (((128 - n.leading_zeros()) + 1) / 2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Vote weight for a snapshot balance. `None` only if `scale` is zero.
pub fn quadratic_weight(balance: u128, multiplier: u128, scale: u128) -> Option<u128> {
    if scale == 0 {
        return None;
    }
    // isqrt(u128::MAX) < 2^64, so the product fits unless multiplier is huge.
    let root = isqrt(balance);
    Some(match root.checked_mul(multiplier) {
        Some(product) => product / scale,
        None => (root / scale).saturating_mul(multiplier),
    })
}
