//! Table builder: roots of unity, bit reversal and their re-layouts.
//!
//! Every table is evaluated in `f64` and rounded once to the target precision,
//! so `f32` plans carry correctly rounded twiddles rather than accumulated
//! single-precision error.

use core::f64::consts::PI;

use crate::num::{Complex, Float};

#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// `log2(n)` for a power of two.
#[inline]
pub fn log2(n: usize) -> u32 {
    n.trailing_zeros()
}

/// `W_N^k = exp(-2πik/N)` for `k in 0..N`.
pub fn twiddles<T: Float>(n: usize) -> Vec<Complex<T>> {
    let step = -2.0 * PI / n as f64;
    (0..n).map(|k| Complex::expi(step * k as f64)).collect()
}

/// Bit-reversal permutation of `0..n` over `log2(n)` bits. Empty when `n` is
/// not a power of two.
pub fn bit_reversal(n: usize) -> Vec<usize> {
    if !is_power_of_two(n) {
        return Vec::new();
    }
    let bits = log2(n);
    if bits == 0 {
        return vec![0];
    }
    (0..n)
        .map(|i| i.reverse_bits() >> (usize::BITS - bits))
        .collect()
}

/// Radix-2 stage table: for each span `2h` (h = 1, 2, 4, .., n/2) the `h`
/// twiddles `W_{2h}^j`, stored contiguously at offset `h - 1`.
///
/// The entries for span `2h` do not depend on `n`, so the table for `n` also
/// serves every power-of-two sub-transform of it.
pub fn stage_twiddles<T: Float>(n: usize, tw: &[Complex<T>]) -> Vec<Complex<T>> {
    let mut out = Vec::with_capacity(n.saturating_sub(1));
    let mut half = 1;
    while half < n {
        let stride = n / (2 * half);
        out.extend((0..half).map(|j| tw[j * stride]));
        half *= 2;
    }
    out
}

/// Number of leading radix-2 stages a radix-`radix` DIT runs before its first
/// radix-`radix` stage.
#[inline]
pub fn leading_radix2_stages(n: usize, radix: usize) -> u32 {
    log2(n) % log2(radix)
}

/// Packed radix-`radix` table. After the leading radix-2 stages, every
/// radix-`radix` stage of span `S -> S*radix` gets one block laid out as
/// `[j][r-1] = W_{S*radix}^{j*r}` for `j < S` and `1 <= r < radix`. Blocks are
/// concatenated in stage order.
pub fn packed_twiddles<T: Float>(n: usize, radix: usize, tw: &[Complex<T>]) -> Vec<Complex<T>> {
    if !is_power_of_two(n) || n < radix {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut span = 1usize << leading_radix2_stages(n, radix);
    while span < n {
        let stride = n / (span * radix);
        for j in 0..span {
            for r in 1..radix {
                out.push(tw[j * r * stride]);
            }
        }
        span *= radix;
    }
    out
}

/// Factors `n` into mixed-radix butterflies, preferring 4, then 2, 3, 5.
/// `None` when `n` has a prime factor above 5.
pub fn factorize(mut n: usize) -> Option<Vec<usize>> {
    if n == 0 {
        return None;
    }
    let mut out = Vec::new();
    while n % 4 == 0 {
        out.push(4);
        n /= 4;
    }
    for p in [2usize, 3, 5] {
        while n % p == 0 {
            out.push(p);
            n /= p;
        }
    }
    (n == 1).then_some(out)
}

/// True for lengths whose only prime factors are 2, 3 and 5. Runs on the
/// transform path, so it must not allocate.
pub fn is_smooth(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    for p in [2usize, 3, 5] {
        while n % p == 0 {
            n /= p;
        }
    }
    n == 1
}
