//! Straight-line small DFTs used as butterflies by the radix-R stages.
//!
//! Each function transforms its slice in place, natural order in and out,
//! with the forward sign `exp(-2πi·jk/R)`.

use core::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::num::{Complex, Float};

#[inline(always)]
pub fn fft2<T: Float>(x: &mut [Complex<T>]) {
    debug_assert_eq!(x.len(), 2);
    let a = x[0];
    let b = x[1];
    x[0] = a + b;
    x[1] = a - b;
}

#[inline(always)]
pub fn fft3<T: Float>(x: &mut [Complex<T>]) {
    debug_assert_eq!(x.len(), 3);
    let half = T::from_f64(0.5);
    let s = T::from_f64(0.75f64.sqrt());
    let sum = x[1] + x[2];
    let m = x[0] - sum.scale(half);
    let u = (x[1] - x[2]).mul_neg_i().scale(s);
    x[0] = x[0] + sum;
    x[1] = m + u;
    x[2] = m - u;
}

#[inline(always)]
pub fn fft4<T: Float>(x: &mut [Complex<T>]) {
    debug_assert_eq!(x.len(), 4);
    let e0 = x[0] + x[2];
    let e1 = x[0] - x[2];
    let o0 = x[1] + x[3];
    let o1 = (x[1] - x[3]).mul_neg_i();
    x[0] = e0 + o0;
    x[1] = e1 + o1;
    x[2] = e0 - o0;
    x[3] = e1 - o1;
}

#[inline(always)]
pub fn fft5<T: Float>(x: &mut [Complex<T>]) {
    debug_assert_eq!(x.len(), 5);
    let c1 = T::from_f64((2.0 * PI / 5.0).cos());
    let c2 = T::from_f64((4.0 * PI / 5.0).cos());
    let s1 = T::from_f64((2.0 * PI / 5.0).sin());
    let s2 = T::from_f64((4.0 * PI / 5.0).sin());

    let t1 = x[1] + x[4];
    let t2 = x[2] + x[3];
    let t3 = x[1] - x[4];
    let t4 = x[2] - x[3];

    let a1 = x[0] + t1.scale(c1) + t2.scale(c2);
    let a2 = x[0] + t1.scale(c2) + t2.scale(c1);
    let b1 = (t3.scale(s1) + t4.scale(s2)).mul_neg_i();
    let b2 = (t3.scale(s2) - t4.scale(s1)).mul_neg_i();

    x[0] = x[0] + t1 + t2;
    x[1] = a1 + b1;
    x[4] = a1 - b1;
    x[2] = a2 + b2;
    x[3] = a2 - b2;
}

#[inline(always)]
pub fn fft8<T: Float>(x: &mut [Complex<T>]) {
    debug_assert_eq!(x.len(), 8);
    let h = T::from_f64(FRAC_1_SQRT_2);
    let mut e = [x[0], x[2], x[4], x[6]];
    let mut o = [x[1], x[3], x[5], x[7]];
    fft4(&mut e);
    fft4(&mut o);

    let t = [
        o[0],
        o[1] * Complex::new(h, -h),
        o[2].mul_neg_i(),
        o[3] * Complex::new(-h, -h),
    ];
    for k in 0..4 {
        x[k] = e[k] + t[k];
        x[k + 4] = e[k] - t[k];
    }
}

#[inline(always)]
pub fn fft16<T: Float>(x: &mut [Complex<T>]) {
    debug_assert_eq!(x.len(), 16);
    let mut e = [Complex::zero(); 8];
    let mut o = [Complex::zero(); 8];
    for k in 0..8 {
        e[k] = x[2 * k];
        o[k] = x[2 * k + 1];
    }
    fft8(&mut e);
    fft8(&mut o);

    let c1 = T::from_f64((PI / 8.0).cos());
    let s1 = T::from_f64((PI / 8.0).sin());
    let h = T::from_f64(FRAC_1_SQRT_2);
    // W16^k for k = 0..8
    let w = [
        Complex::one(),
        Complex::new(c1, -s1),
        Complex::new(h, -h),
        Complex::new(s1, -c1),
        Complex::new(T::zero(), -T::one()),
        Complex::new(-s1, -c1),
        Complex::new(-h, -h),
        Complex::new(-c1, -s1),
    ];
    for k in 0..8 {
        let t = o[k] * w[k];
        x[k] = e[k] + t;
        x[k + 8] = e[k] - t;
    }
}

/// Dispatch to the butterfly for `radix`. Only the radices produced by the
/// table builder reach this.
#[inline(always)]
pub(crate) fn butterfly<T: Float>(radix: usize, x: &mut [Complex<T>]) {
    match radix {
        2 => fft2(x),
        3 => fft3(x),
        4 => fft4(x),
        5 => fft5(x),
        8 => fft8(x),
        16 => fft16(x),
        _ => unreachable!("no butterfly for radix {radix}"),
    }
}
