#![allow(dead_code)]

use planfft::{Complex, Float};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Direct O(N²) DFT evaluated in f64, the oracle every kernel is checked
/// against.
pub fn direct_dft<T: Float>(x: &[Complex<T>]) -> Vec<Complex<f64>> {
    let n = x.len();
    (0..n)
        .map(|k| {
            x.iter().enumerate().fold(Complex::zero(), |acc, (j, v)| {
                let theta = -2.0 * std::f64::consts::PI * ((j * k) % n) as f64 / n as f64;
                let v = Complex::new(v.re.to_f64(), v.im.to_f64());
                acc + v * Complex::expi(theta)
            })
        })
        .collect()
}

pub fn random_signal<T: Float>(n: usize, seed: u64) -> Vec<Complex<T>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Complex::new(
                T::from_f64(rng.gen_range(-1.0..1.0)),
                T::from_f64(rng.gen_range(-1.0..1.0)),
            )
        })
        .collect()
}

/// Largest component-wise distance between `a` and `b`.
pub fn max_err<T: Float>(a: &[Complex<T>], b: &[Complex<f64>]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x.re.to_f64() - y.re).abs().max((x.im.to_f64() - y.im).abs()))
        .fold(0.0, f64::max)
}

pub fn max_diff<T: Float>(a: &[Complex<T>], b: &[Complex<T>]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            (x.re.to_f64() - y.re.to_f64())
                .abs()
                .max((x.im.to_f64() - y.im.to_f64()).abs())
        })
        .fold(0.0, f64::max)
}

/// Absolute tolerance for a length-`n` transform of unit-magnitude input.
pub fn tolerance<T: Float>(n: usize) -> f64 {
    let scale = (n.max(2) as f64).log2() * (n as f64).sqrt().max(1.0);
    match T::PRECISION {
        planfft::Precision::Single => 2e-6 * scale * 8.0,
        planfft::Precision::Double => 1e-14 * scale * 8.0,
    }
}
