//! SIMD radix-2 passes and the candidates built on them.
//!
//! Every SIMD candidate exists on every target; on targets (or builds without
//! the `simd` feature) where its instruction set cannot exist the pass is the
//! portable one and [`features::detect`] never reports the ISA, so the
//! candidate is never selected and always declines.

use crate::features::{self, Isa};
use crate::num::{Complex, Float};

use super::dit::{self, radix2_pass};
use super::six_step::{eight_step_with, six_step_with};
use super::{pow2_len, KernelCandidate, PassFn, PlanTables};

pub(crate) const SSE2: u8 = 1;
pub(crate) const AVX2_FMA: u8 = 2;
pub(crate) const NEON: u8 = 3;

const fn isa_of(level: u8) -> Isa {
    match level {
        SSE2 => Isa::Sse2,
        AVX2_FMA => Isa::Avx2Fma,
        NEON => Isa::Neon,
        _ => Isa::Generic,
    }
}

/// Per-precision SIMD passes.
pub(crate) trait SimdFloat: Float {
    const SSE2_PASS: PassFn<Self>;
    const AVX2_PASS: PassFn<Self>;
    const NEON_PASS: PassFn<Self>;
}

const fn pass_of<T: SimdFloat>(level: u8) -> PassFn<T> {
    match level {
        SSE2 => T::SSE2_PASS,
        AVX2_FMA => T::AVX2_PASS,
        _ => T::NEON_PASS,
    }
}

#[inline]
fn supported(level: u8) -> bool {
    features::detect().supports(isa_of(level))
}

impl SimdFloat for f32 {
    #[cfg(all(target_arch = "x86_64", feature = "simd"))]
    const SSE2_PASS: PassFn<f32> = x86::sse2_pass_f32;
    #[cfg(all(target_arch = "x86_64", feature = "simd"))]
    const AVX2_PASS: PassFn<f32> = x86::avx2_pass_f32;
    #[cfg(not(all(target_arch = "x86_64", feature = "simd")))]
    const SSE2_PASS: PassFn<f32> = radix2_pass::<f32>;
    #[cfg(not(all(target_arch = "x86_64", feature = "simd")))]
    const AVX2_PASS: PassFn<f32> = radix2_pass::<f32>;

    #[cfg(all(target_arch = "aarch64", feature = "simd"))]
    const NEON_PASS: PassFn<f32> = arm::neon_pass_f32;
    #[cfg(not(all(target_arch = "aarch64", feature = "simd")))]
    const NEON_PASS: PassFn<f32> = radix2_pass::<f32>;
}

impl SimdFloat for f64 {
    #[cfg(all(target_arch = "x86_64", feature = "simd"))]
    const SSE2_PASS: PassFn<f64> = x86::sse2_pass_f64;
    #[cfg(all(target_arch = "x86_64", feature = "simd"))]
    const AVX2_PASS: PassFn<f64> = x86::avx2_pass_f64;
    #[cfg(not(all(target_arch = "x86_64", feature = "simd")))]
    const SSE2_PASS: PassFn<f64> = radix2_pass::<f64>;
    #[cfg(not(all(target_arch = "x86_64", feature = "simd")))]
    const AVX2_PASS: PassFn<f64> = radix2_pass::<f64>;

    #[cfg(all(target_arch = "aarch64", feature = "simd"))]
    const NEON_PASS: PassFn<f64> = arm::neon_pass_f64;
    #[cfg(not(all(target_arch = "aarch64", feature = "simd")))]
    const NEON_PASS: PassFn<f64> = radix2_pass::<f64>;
}

fn dit_forward<T: SimdFloat, const L: u8>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    _scratch: &mut [Complex<T>],
) -> bool {
    let n = data.len();
    if n != tables.len() || tables.bitrev.len() != n || !supported(L) {
        return false;
    }
    // SAFETY: the ISA was just confirmed.
    unsafe { dit::transform_with(data, tables, pass_of::<T>(L)) };
    true
}

fn dit_inverse<T: SimdFloat, const L: u8>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    supported(L) && super::conjugated(dit_forward::<T, L>, data, tables, scratch)
}

fn six_forward<T: SimdFloat, const L: u8>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    // SAFETY: the ISA is confirmed before the pass can run.
    supported(L) && unsafe { six_step_with(data, tables, scratch, pass_of::<T>(L)) }
}

fn six_inverse<T: SimdFloat, const L: u8>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    supported(L) && super::conjugated(six_forward::<T, L>, data, tables, scratch)
}

fn eight_forward<T: SimdFloat, const L: u8>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    // SAFETY: the ISA is confirmed before the pass can run.
    supported(L) && unsafe { eight_step_with(data, tables, scratch, pass_of::<T>(L)) }
}

fn eight_inverse<T: SimdFloat, const L: u8>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    supported(L) && super::conjugated(eight_forward::<T, L>, data, tables, scratch)
}

pub(crate) const fn dit<T: SimdFloat, const L: u8>(name: &'static str) -> KernelCandidate<T> {
    KernelCandidate {
        name,
        isa: isa_of(L),
        accepts: pow2_len,
        forward: dit_forward::<T, L>,
        inverse: dit_inverse::<T, L>,
        pass: Some(pass_of::<T>(L)),
    }
}

pub(crate) const fn six_step<T: SimdFloat, const L: u8>(name: &'static str) -> KernelCandidate<T> {
    KernelCandidate {
        name,
        isa: isa_of(L),
        accepts: pow2_len,
        forward: six_forward::<T, L>,
        inverse: six_inverse::<T, L>,
        pass: None,
    }
}

pub(crate) const fn eight_step<T: SimdFloat, const L: u8>(
    name: &'static str,
) -> KernelCandidate<T> {
    KernelCandidate {
        name,
        isa: isa_of(L),
        accepts: pow2_len,
        forward: eight_forward::<T, L>,
        inverse: eight_inverse::<T, L>,
        pass: None,
    }
}

#[cfg(all(target_arch = "x86_64", feature = "simd"))]
mod x86 {
    use core::arch::x86_64::*;

    use super::radix2_pass;
    use crate::num::{Complex32, Complex64};

    /// `b * w` for two interleaved complex doubles.
    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn cmul_avx_pd(b: __m256d, w: __m256d) -> __m256d {
        let w_re = _mm256_permute_pd::<0b0000>(w);
        let w_im = _mm256_permute_pd::<0b1111>(w);
        let b_sw = _mm256_permute_pd::<0b0101>(b);
        _mm256_fmaddsub_pd(b, w_re, _mm256_mul_pd(b_sw, w_im))
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn cmul_avx_ps(b: __m256, w: __m256) -> __m256 {
        let w_re = _mm256_moveldup_ps(w);
        let w_im = _mm256_movehdup_ps(w);
        let b_sw = _mm256_permute_ps::<0xB1>(b);
        _mm256_fmaddsub_ps(b, w_re, _mm256_mul_ps(b_sw, w_im))
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn cmul_sse_pd(b: __m128d, w: __m128d) -> __m128d {
        let w_re = _mm_unpacklo_pd(w, w);
        let w_im = _mm_unpackhi_pd(w, w);
        let b_sw = _mm_shuffle_pd::<0b01>(b, b);
        let sign = _mm_set_pd(0.0, -0.0);
        _mm_add_pd(
            _mm_mul_pd(b, w_re),
            _mm_xor_pd(_mm_mul_pd(b_sw, w_im), sign),
        )
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn cmul_sse_ps(b: __m128, w: __m128) -> __m128 {
        let w_re = _mm_shuffle_ps::<0xA0>(w, w);
        let w_im = _mm_shuffle_ps::<0xF5>(w, w);
        let b_sw = _mm_shuffle_ps::<0xB1>(b, b);
        let sign = _mm_setr_ps(-0.0, 0.0, -0.0, 0.0);
        _mm_add_ps(
            _mm_mul_ps(b, w_re),
            _mm_xor_ps(_mm_mul_ps(b_sw, w_im), sign),
        )
    }

    #[target_feature(enable = "avx2,fma")]
    pub(super) unsafe fn avx2_pass_f64(data: &mut [Complex64], half: usize, tw: &[Complex64]) {
        if half < 2 {
            return radix2_pass(data, half, tw);
        }
        let w = tw.as_ptr() as *const f64;
        for block in data.chunks_exact_mut(2 * half) {
            let p = block.as_mut_ptr() as *mut f64;
            for j in (0..half).step_by(2) {
                let lo = p.add(2 * j);
                let hi = p.add(2 * (j + half));
                let a = _mm256_loadu_pd(lo);
                let t = cmul_avx_pd(_mm256_loadu_pd(hi), _mm256_loadu_pd(w.add(2 * j)));
                _mm256_storeu_pd(lo, _mm256_add_pd(a, t));
                _mm256_storeu_pd(hi, _mm256_sub_pd(a, t));
            }
        }
    }

    #[target_feature(enable = "avx2,fma")]
    pub(super) unsafe fn avx2_pass_f32(data: &mut [Complex32], half: usize, tw: &[Complex32]) {
        if half < 4 {
            return radix2_pass(data, half, tw);
        }
        let w = tw.as_ptr() as *const f32;
        for block in data.chunks_exact_mut(2 * half) {
            let p = block.as_mut_ptr() as *mut f32;
            for j in (0..half).step_by(4) {
                let lo = p.add(2 * j);
                let hi = p.add(2 * (j + half));
                let a = _mm256_loadu_ps(lo);
                let t = cmul_avx_ps(_mm256_loadu_ps(hi), _mm256_loadu_ps(w.add(2 * j)));
                _mm256_storeu_ps(lo, _mm256_add_ps(a, t));
                _mm256_storeu_ps(hi, _mm256_sub_ps(a, t));
            }
        }
    }

    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn sse2_pass_f64(data: &mut [Complex64], half: usize, tw: &[Complex64]) {
        let w = tw.as_ptr() as *const f64;
        for block in data.chunks_exact_mut(2 * half) {
            let p = block.as_mut_ptr() as *mut f64;
            for j in 0..half {
                let lo = p.add(2 * j);
                let hi = p.add(2 * (j + half));
                let a = _mm_loadu_pd(lo);
                let t = cmul_sse_pd(_mm_loadu_pd(hi), _mm_loadu_pd(w.add(2 * j)));
                _mm_storeu_pd(lo, _mm_add_pd(a, t));
                _mm_storeu_pd(hi, _mm_sub_pd(a, t));
            }
        }
    }

    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn sse2_pass_f32(data: &mut [Complex32], half: usize, tw: &[Complex32]) {
        if half < 2 {
            return radix2_pass(data, half, tw);
        }
        let w = tw.as_ptr() as *const f32;
        for block in data.chunks_exact_mut(2 * half) {
            let p = block.as_mut_ptr() as *mut f32;
            for j in (0..half).step_by(2) {
                let lo = p.add(2 * j);
                let hi = p.add(2 * (j + half));
                let a = _mm_loadu_ps(lo);
                let t = cmul_sse_ps(_mm_loadu_ps(hi), _mm_loadu_ps(w.add(2 * j)));
                _mm_storeu_ps(lo, _mm_add_ps(a, t));
                _mm_storeu_ps(hi, _mm_sub_ps(a, t));
            }
        }
    }
}

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
mod arm {
    use core::arch::aarch64::*;

    use super::radix2_pass;
    use crate::num::{Complex32, Complex64};

    #[target_feature(enable = "neon")]
    pub(super) unsafe fn neon_pass_f64(data: &mut [Complex64], half: usize, tw: &[Complex64]) {
        let sign_arr = [-1.0f64, 1.0];
        let sign = vld1q_f64(sign_arr.as_ptr());
        for block in data.chunks_exact_mut(2 * half) {
            let p = block.as_mut_ptr() as *mut f64;
            for (j, w) in tw[..half].iter().enumerate() {
                let lo = p.add(2 * j);
                let hi = p.add(2 * (j + half));
                let a = vld1q_f64(lo);
                let b = vld1q_f64(hi);
                let b_sw = vmulq_f64(vextq_f64::<1>(b, b), sign);
                let t = vfmaq_f64(vmulq_n_f64(b, w.re), b_sw, vdupq_n_f64(w.im));
                vst1q_f64(lo, vaddq_f64(a, t));
                vst1q_f64(hi, vsubq_f64(a, t));
            }
        }
    }

    #[target_feature(enable = "neon")]
    pub(super) unsafe fn neon_pass_f32(data: &mut [Complex32], half: usize, tw: &[Complex32]) {
        if half < 2 {
            return radix2_pass(data, half, tw);
        }
        let sign_arr = [-1.0f32, 1.0, -1.0, 1.0];
        let sign = vld1q_f32(sign_arr.as_ptr());
        let w = tw.as_ptr() as *const f32;
        for block in data.chunks_exact_mut(2 * half) {
            let p = block.as_mut_ptr() as *mut f32;
            for j in (0..half).step_by(2) {
                let lo = p.add(2 * j);
                let hi = p.add(2 * (j + half));
                let a = vld1q_f32(lo);
                let b = vld1q_f32(hi);
                let wv = vld1q_f32(w.add(2 * j));
                let w_re = vtrn1q_f32(wv, wv);
                let w_im = vtrn2q_f32(wv, wv);
                let b_sw = vmulq_f32(vrev64q_f32(b), sign);
                let t = vfmaq_f32(vmulq_f32(b, w_re), b_sw, w_im);
                vst1q_f32(lo, vaddq_f32(a, t));
                vst1q_f32(hi, vsubq_f32(a, t));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::PlanTables;

    fn check<T: SimdFloat>(level: u8, tol: f64) {
        if !supported(level) {
            return;
        }
        for n in [2usize, 4, 8, 64, 256] {
            let t = PlanTables::<T>::build(n, false).unwrap();
            let x: Vec<Complex<T>> = (0..n)
                .map(|i| {
                    Complex::new(
                        T::from_f64((i as f64 * 0.37).sin()),
                        T::from_f64((i as f64 * 0.11).cos()),
                    )
                })
                .collect();
            let mut want = x.clone();
            unsafe { dit::transform_with(&mut want, &t, radix2_pass::<T>) };
            let mut got = x.clone();
            unsafe { dit::transform_with(&mut got, &t, pass_of::<T>(level)) };
            for (a, b) in got.iter().zip(&want) {
                assert!((a.re - b.re).to_f64().abs() < tol, "level={level} n={n}");
                assert!((a.im - b.im).to_f64().abs() < tol, "level={level} n={n}");
            }
        }
    }

    #[test]
    fn simd_passes_match_portable() {
        for level in [SSE2, AVX2_FMA, NEON] {
            check::<f32>(level, 1e-3);
            check::<f64>(level, 1e-10);
        }
    }
}
