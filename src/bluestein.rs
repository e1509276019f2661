//! Bluestein (chirp-z) transform for lengths the decomposing kernels cannot
//! serve.
//!
//! An `N`-point DFT is rewritten with `2nk = n² + k² - (k-n)²` as a chirp
//! multiply, a circular convolution of length `M` (the next power of two
//! `>= 2N - 1`) and a second chirp multiply. The convolution runs through the
//! DIT chain, so it picks up SIMD passes when available.

use core::f64::consts::PI;

use crate::error::FftError;
use crate::kernels::{self, KernelStrategy, PlanTables};
use crate::num::{conj_in_place, Complex, Float};

/// Side tables for one Bluestein length.
pub struct BluesteinTables<T: Float> {
    n: usize,
    m: usize,
    /// `exp(-iπn²/N)`
    pub(crate) chirp: Vec<Complex<T>>,
    pub(crate) chirp_inv: Vec<Complex<T>>,
    /// `FFT_M` of the wrapped `chirp_inv`, pre-scaled by `1/M`.
    pub(crate) filter: Vec<Complex<T>>,
    pub(crate) filter_inv: Vec<Complex<T>>,
    pub(crate) inner: Box<PlanTables<T>>,
}

impl<T: Float> BluesteinTables<T> {
    pub(crate) fn build(n: usize) -> Result<Self, FftError> {
        let m = padded_len(n).ok_or(FftError::InvalidLength)?;
        let inner = Box::new(PlanTables::<T>::build(m, false)?);

        let two_n = 2 * n as u128;
        let chirp: Vec<Complex<T>> = (0..n)
            .map(|k| {
                // n² mod 2N keeps the angle small and exact for large n.
                let r = (k as u128 * k as u128) % two_n;
                Complex::expi(-PI * r as f64 / n as f64)
            })
            .collect();
        let chirp_inv: Vec<Complex<T>> = chirp.iter().map(|c| c.conj()).collect();

        let scale = T::from_f64(1.0 / m as f64);
        let filter = convolution_filter(&chirp_inv, m, &inner, scale)?;
        let filter_inv = convolution_filter(&chirp, m, &inner, scale)?;

        Ok(Self {
            n,
            m,
            chirp,
            chirp_inv,
            filter,
            filter_inv,
            inner,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Convolution length `M`.
    pub fn padded_len(&self) -> usize {
        self.m
    }

    pub fn chirp(&self) -> &[Complex<T>] {
        &self.chirp
    }
}

/// `M = next_pow2(2N - 1)`, or `None` on overflow.
pub fn padded_len(n: usize) -> Option<usize> {
    n.checked_mul(2)?.checked_sub(1)?.checked_next_power_of_two()
}

/// `FFT_M(wrap(seq)) / M`, where `wrap` places `seq[k]` at `k` and `M - k`.
fn convolution_filter<T: Float>(
    seq: &[Complex<T>],
    m: usize,
    inner: &PlanTables<T>,
    scale: T,
) -> Result<Vec<Complex<T>>, FftError> {
    let mut buf = vec![Complex::zero(); m];
    buf[0] = seq[0];
    for k in 1..seq.len() {
        buf[k] = seq[k];
        buf[m - k] = seq[k];
    }
    let chain = T::kernel_chain(KernelStrategy::Dit);
    kernels::run(chain, true, &mut buf, inner, &mut [])?;
    for v in buf.iter_mut() {
        *v = v.scale(scale);
    }
    Ok(buf)
}

fn convolve<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
    inverse: bool,
) -> bool {
    let Some(b) = tables.bluestein() else {
        return false;
    };
    let n = data.len();
    if n != b.n || scratch.len() < b.m {
        return false;
    }
    let (chirp, filter) = if inverse {
        (&b.chirp_inv, &b.filter_inv)
    } else {
        (&b.chirp, &b.filter)
    };
    let work = &mut scratch[..b.m];
    for ((w, &x), &c) in work.iter_mut().zip(data.iter()).zip(chirp.iter()) {
        *w = x * c;
    }
    for w in work[n..].iter_mut() {
        *w = Complex::zero();
    }

    let chain = T::kernel_chain(KernelStrategy::Dit);
    if kernels::run(chain, true, work, &b.inner, &mut []).is_err() {
        return false;
    }
    for (w, &f) in work.iter_mut().zip(filter.iter()) {
        *w = *w * f;
    }
    conj_in_place(work);
    if kernels::run(chain, true, work, &b.inner, &mut []).is_err() {
        return false;
    }
    for ((d, w), &c) in data.iter_mut().zip(work.iter()).zip(chirp.iter()) {
        *d = w.conj() * c;
    }
    true
}

/// Forward Bluestein kernel. Scratch must hold `M` elements.
pub(crate) fn forward<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    convolve(data, tables, scratch, false)
}

/// Unscaled inverse Bluestein kernel.
pub(crate) fn inverse<T: Float>(
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    convolve(data, tables, scratch, true)
}
