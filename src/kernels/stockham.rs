//! Self-sorting Stockham kernels.
//!
//! Each stage reads one buffer and writes the other, so no bit-reversal pass
//! is needed; the result is copied back into `data` if it ends in scratch.

use crate::fft_kernels::butterfly;
use crate::features::Isa;
use crate::num::{Complex, Float};

use super::{conjugated, pow2_len, smooth_len, KernelCandidate, PlanTables};

/// One decimation-in-frequency stage of radix `p` over a sub-transform of
/// length `len`, stride `s = N / len`:
/// `y[k + s(p q + t)] = DFT_p(x[k + s(q + m r)])_t * W_len^(q t)`.
#[inline]
fn stage<T: Float>(
    x: &[Complex<T>],
    y: &mut [Complex<T>],
    tw: &[Complex<T>],
    len: usize,
    p: usize,
) {
    let n = x.len();
    let s = n / len;
    let m = len / p;
    let mut a = [Complex::zero(); 5];
    for q in 0..m {
        for k in 0..s {
            for (r, v) in a[..p].iter_mut().enumerate() {
                *v = x[k + s * (q + m * r)];
            }
            butterfly(p, &mut a[..p]);
            y[k + s * p * q] = a[0];
            for t in 1..p {
                y[k + s * (p * q + t)] = a[t] * tw[q * t * s];
            }
        }
    }
}

/// Radix-2 specialization of [`stage`] with the loops ordered for contiguous
/// access in `k`.
#[inline]
fn stage2<T: Float>(x: &[Complex<T>], y: &mut [Complex<T>], tw: &[Complex<T>], len: usize) {
    let n = x.len();
    let s = n / len;
    let m = len / 2;
    for q in 0..m {
        let w = tw[q * s];
        let (src_a, src_b) = (&x[s * q..s * q + s], &x[s * (q + m)..s * (q + m) + s]);
        let (dst, rest) = y[s * 2 * q..].split_at_mut(s);
        let dst_b = &mut rest[..s];
        for k in 0..s {
            let a = src_a[k];
            let b = src_b[k];
            dst[k] = a + b;
            dst_b[k] = (a - b) * w;
        }
    }
}

fn run_stages<T: Float>(
    data: &mut [Complex<T>],
    scratch: &mut [Complex<T>],
    tw: &[Complex<T>],
    radices: impl Iterator<Item = usize>,
) {
    let n = data.len();
    let scratch = &mut scratch[..n];
    let mut in_data = true;
    let mut len = n;
    for p in radices {
        let (x, y): (&[Complex<T>], &mut [Complex<T>]) = if in_data {
            (&*data, &mut *scratch)
        } else {
            (&*scratch, &mut *data)
        };
        if p == 2 {
            stage2(x, y, tw, len);
        } else {
            stage(x, y, tw, len, p);
        }
        len /= p;
        in_data = !in_data;
    }
    if !in_data {
        data.copy_from_slice(scratch);
    }
}

fn forward_radix2<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    let n = data.len();
    if n != tables.len() || !pow2_len(n) || scratch.len() < n || tables.twiddles.len() != n {
        return false;
    }
    let stages = n.trailing_zeros() as usize;
    run_stages(data, scratch, &tables.twiddles, core::iter::repeat(2).take(stages));
    true
}

fn inverse_radix2<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    conjugated(forward_radix2::<T>, data, tables, scratch)
}

fn forward_mixed<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    let n = data.len();
    if n != tables.len() || scratch.len() < n || tables.twiddles.len() != n {
        return false;
    }
    if tables.factors.iter().product::<usize>() != n {
        return false;
    }
    run_stages(data, scratch, &tables.twiddles, tables.factors.iter().copied());
    true
}

fn inverse_mixed<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    conjugated(forward_mixed::<T>, data, tables, scratch)
}

pub(crate) const fn radix2<T: Float>() -> KernelCandidate<T> {
    KernelCandidate {
        name: "stockham-radix2",
        isa: Isa::Generic,
        accepts: pow2_len,
        forward: forward_radix2::<T>,
        inverse: inverse_radix2::<T>,
        pass: None,
    }
}

pub(crate) const fn mixed_radix<T: Float>() -> KernelCandidate<T> {
    KernelCandidate {
        name: "stockham-mixed-radix",
        isa: Isa::Generic,
        accepts: smooth_len,
        forward: forward_mixed::<T>,
        inverse: inverse_mixed::<T>,
        pass: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_radix_impulse_and_constant() {
        for n in [6usize, 12, 15, 30, 45, 60, 100] {
            let t = PlanTables::<f64>::build(n, false).unwrap();
            let mut scratch = vec![Complex::zero(); n];

            let mut x = vec![Complex::zero(); n];
            x[0] = Complex::one();
            assert!(forward_mixed(&mut x, &t, &mut scratch));
            assert!(x.iter().all(|c| (c.re - 1.0).abs() < 1e-12 && c.im.abs() < 1e-12));

            let mut x = vec![Complex::new(2.0, 0.0); n];
            assert!(forward_mixed(&mut x, &t, &mut scratch));
            assert!((x[0].re - 2.0 * n as f64).abs() < 1e-9);
            assert!(x[1..].iter().all(|c| c.norm() < 1e-9));
        }
    }

    #[test]
    fn radix2_shifted_impulse() {
        let n = 32;
        let t = PlanTables::<f64>::build(n, false).unwrap();
        let mut scratch = vec![Complex::zero(); n];
        let mut x = vec![Complex::zero(); n];
        x[1] = Complex::one();
        assert!(forward_radix2(&mut x, &t, &mut scratch));
        for (k, c) in x.iter().enumerate() {
            let w = Complex::<f64>::expi(-2.0 * core::f64::consts::PI * k as f64 / n as f64);
            assert!((c.re - w.re).abs() < 1e-12 && (c.im - w.im).abs() < 1e-12);
        }
    }
}
