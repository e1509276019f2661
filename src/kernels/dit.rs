//! In-place decimation-in-time kernels for power-of-two lengths.
//!
//! Data is bit-reversed up front, then combined by radix-2 stages or, for the
//! radix-4/8/16 kernels, by a few leading radix-2 stages followed by radix-R
//! stages that read the packed twiddle layout.

use crate::fft_kernels::butterfly;
use crate::features::Isa;
use crate::num::{Complex, Float};
use crate::twiddle;

use super::{conjugated, pow2_len, KernelCandidate, PassFn, PlanTables};

/// Portable radix-2 stage.
pub(crate) fn radix2_pass<T: Float>(data: &mut [Complex<T>], half: usize, tw: &[Complex<T>]) {
    let tw = &tw[..half];
    for block in data.chunks_exact_mut(2 * half) {
        let (lo, hi) = block.split_at_mut(half);
        for ((a, b), &w) in lo.iter_mut().zip(hi.iter_mut()).zip(tw) {
            let t = *b * w;
            let u = *a;
            *a = u + t;
            *b = u - t;
        }
    }
}

/// Bit-reverses `data` in place using the table of a larger power-of-two
/// length; `shift` is `log2(table len) - log2(data len)`.
#[inline]
pub(crate) fn bit_reverse_permute<T: Float>(data: &mut [Complex<T>], bitrev: &[usize], shift: u32) {
    for i in 0..data.len() {
        let j = bitrev[i] >> shift;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// Radix-2 stages with spans `2 * half` for `half` in `[first, data.len())`.
///
/// # Safety
///
/// `pass` must be runnable on this CPU.
#[inline]
pub(crate) unsafe fn radix2_stages<T: Float>(
    data: &mut [Complex<T>],
    stages: &[Complex<T>],
    first: usize,
    pass: PassFn<T>,
) {
    let n = data.len();
    let mut half = first;
    while half < n {
        pass(data, half, &stages[half - 1..2 * half - 1]);
        half *= 2;
    }
}

/// Full radix-2 DIT of a power-of-two `data` no longer than the tables.
///
/// # Safety
///
/// `pass` must be runnable on this CPU.
pub(crate) unsafe fn transform_with<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    pass: PassFn<T>,
) {
    let m = data.len();
    if m <= 1 {
        return;
    }
    let shift = twiddle::log2(tables.len()) - twiddle::log2(m);
    bit_reverse_permute(data, &tables.bitrev, shift);
    radix2_stages(data, &tables.stages, 1, pass);
}

fn forward_radix2<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    _scratch: &mut [Complex<T>],
) -> bool {
    if data.len() != tables.len() || tables.bitrev.len() != data.len() {
        return false;
    }
    // SAFETY: the portable pass has no CPU requirement.
    unsafe { transform_with(data, tables, radix2_pass::<T>) };
    true
}

fn inverse_radix2<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    conjugated(forward_radix2::<T>, data, tables, scratch)
}

fn forward_radix_r<T: Float, const R: usize>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    _scratch: &mut [Complex<T>],
) -> bool {
    let n = data.len();
    if n != tables.len() || n < R || tables.bitrev.len() != n {
        return false;
    }
    bit_reverse_permute(data, &tables.bitrev, 0);

    let lead = 1usize << twiddle::leading_radix2_stages(n, R);
    let mut half = 1;
    while half < lead {
        radix2_pass(data, half, &tables.stages[half - 1..2 * half - 1]);
        half *= 2;
    }

    let rbits = twiddle::log2(R);
    let rev: [usize; R] = core::array::from_fn(|r| r.reverse_bits() >> (usize::BITS - rbits));
    let packed = tables.packed(R);
    let mut span = lead;
    let mut offset = 0;
    let mut x = [Complex::zero(); R];
    while span < n {
        let tw = &packed[offset..offset + span * (R - 1)];
        for block in data.chunks_exact_mut(span * R) {
            for j in 0..span {
                let w = &tw[j * (R - 1)..(j + 1) * (R - 1)];
                x[0] = block[j];
                for r in 1..R {
                    x[r] = block[rev[r] * span + j] * w[r - 1];
                }
                butterfly(R, &mut x);
                for (q, v) in x.iter().enumerate() {
                    block[q * span + j] = *v;
                }
            }
        }
        offset += span * (R - 1);
        span *= R;
    }
    true
}

fn inverse_radix_r<T: Float, const R: usize>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    conjugated(forward_radix_r::<T, R>, data, tables, scratch)
}

fn at_least<const R: usize>(n: usize) -> bool {
    pow2_len(n) && n >= R
}

pub(crate) const fn radix_r<T: Float, const R: usize>(name: &'static str) -> KernelCandidate<T> {
    KernelCandidate {
        name,
        isa: Isa::Generic,
        accepts: at_least::<R>,
        forward: forward_radix_r::<T, R>,
        inverse: inverse_radix_r::<T, R>,
        pass: None,
    }
}

pub(crate) const fn radix2<T: Float>() -> KernelCandidate<T> {
    let pass: PassFn<T> = radix2_pass::<T>;
    KernelCandidate {
        name: "dit-radix2",
        isa: Isa::Generic,
        accepts: pow2_len,
        forward: forward_radix2::<T>,
        inverse: inverse_radix2::<T>,
        pass: Some(pass),
    }
}
