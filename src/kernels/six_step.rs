//! Six-step and eight-step decompositions for large power-of-two lengths.
//!
//! `N = N1 * N2` with `N1 = 2^floor(L/2)` and `N2 = 2^ceil(L/2)`. The data is
//! treated as a matrix so that every inner FFT is a short contiguous row that
//! stays in cache. Row FFTs reuse the radix-2 DIT of `dit.rs` with sub-size
//! views of the plan tables.

use crate::features::Isa;
use crate::num::{Complex, Float};
use crate::twiddle;

use super::dit::{radix2_pass, transform_with};
use super::{conjugated, pow2_len, KernelCandidate, PassFn, PlanTables};

const TILE: usize = 16;

#[inline]
fn split(n: usize) -> (usize, usize) {
    let l = twiddle::log2(n);
    let n1 = 1usize << (l / 2);
    (n1, n / n1)
}

/// `dst[c * rows + r] = src[r * cols + c]`.
fn transpose<T: Float>(src: &[Complex<T>], dst: &mut [Complex<T>], rows: usize, cols: usize) {
    for r in 0..rows {
        let row = &src[r * cols..(r + 1) * cols];
        for (c, &v) in row.iter().enumerate() {
            dst[c * rows + r] = v;
        }
    }
}

/// Tiled transpose; when `tw` is given each element is multiplied by
/// `tw[r * c]` on the way through.
fn transpose_blocked<T: Float>(
    src: &[Complex<T>],
    dst: &mut [Complex<T>],
    rows: usize,
    cols: usize,
    tw: Option<&[Complex<T>]>,
) {
    for r0 in (0..rows).step_by(TILE) {
        let r1 = (r0 + TILE).min(rows);
        for c0 in (0..cols).step_by(TILE) {
            let c1 = (c0 + TILE).min(cols);
            for r in r0..r1 {
                for c in c0..c1 {
                    let v = src[r * cols + c];
                    dst[c * rows + r] = match tw {
                        Some(tw) => v * tw[r * c],
                        None => v,
                    };
                }
            }
        }
    }
}

/// # Safety
///
/// `pass` must be runnable on this CPU.
pub(crate) unsafe fn six_step_with<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
    pass: PassFn<T>,
) -> bool {
    let n = data.len();
    if n != tables.len() || !pow2_len(n) || scratch.len() < n {
        return false;
    }
    let (n1, n2) = split(n);
    let scratch = &mut scratch[..n];
    let tw = &tables.twiddles;

    transpose(data, scratch, n2, n1);
    for row in scratch.chunks_exact_mut(n2) {
        transform_with(row, tables, pass);
    }
    for (i, row) in scratch.chunks_exact_mut(n2).enumerate() {
        for (k, v) in row.iter_mut().enumerate().skip(1) {
            *v = *v * tw[i * k];
        }
    }
    transpose(scratch, data, n1, n2);
    for row in data.chunks_exact_mut(n1) {
        transform_with(row, tables, pass);
    }
    transpose(data, scratch, n2, n1);
    data.copy_from_slice(scratch);
    true
}

/// Six-step with cache-blocked transposes and the twiddle multiply fused into
/// the middle transpose.
///
/// # Safety
///
/// `pass` must be runnable on this CPU.
pub(crate) unsafe fn eight_step_with<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
    pass: PassFn<T>,
) -> bool {
    let n = data.len();
    if n != tables.len() || !pow2_len(n) || scratch.len() < n {
        return false;
    }
    let (n1, n2) = split(n);
    let scratch = &mut scratch[..n];

    transpose_blocked(data, scratch, n2, n1, None);
    for row in scratch.chunks_exact_mut(n2) {
        transform_with(row, tables, pass);
    }
    transpose_blocked(scratch, data, n1, n2, Some(&tables.twiddles));
    for row in data.chunks_exact_mut(n1) {
        transform_with(row, tables, pass);
    }
    transpose_blocked(data, scratch, n2, n1, None);
    data.copy_from_slice(scratch);
    true
}

fn forward_six<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    // SAFETY: portable pass.
    unsafe { six_step_with(data, tables, scratch, radix2_pass::<T>) }
}

fn inverse_six<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    conjugated(forward_six::<T>, data, tables, scratch)
}

fn forward_eight<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    // SAFETY: portable pass.
    unsafe { eight_step_with(data, tables, scratch, radix2_pass::<T>) }
}

fn inverse_eight<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    conjugated(forward_eight::<T>, data, tables, scratch)
}

pub(crate) const fn six_step<T: Float>() -> KernelCandidate<T> {
    KernelCandidate {
        name: "six-step",
        isa: Isa::Generic,
        accepts: pow2_len,
        forward: forward_six::<T>,
        inverse: inverse_six::<T>,
        pass: None,
    }
}

pub(crate) const fn eight_step<T: Float>() -> KernelCandidate<T> {
    KernelCandidate {
        name: "eight-step",
        isa: Isa::Generic,
        accepts: pow2_len,
        forward: forward_eight::<T>,
        inverse: inverse_eight::<T>,
        pass: None,
    }
}
