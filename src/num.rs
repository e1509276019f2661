//! Numeric building blocks shared by every kernel.
//!
//! The engine is written once against [`Float`] and monomorphized for `f32`
//! and `f64`. Per-precision behavior (kernel tables, tolerances) hangs off the
//! trait so that nothing on the hot path compares type ids.

use crate::error::ParseError;
use crate::kernels::{self, KernelCandidate, KernelStrategy};

/// The two supported component precisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    /// `f32` components (`Complex32`).
    Single,
    /// `f64` components (`Complex64`).
    Double,
}

impl Precision {
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Single => "f32",
            Precision::Double => "f64",
        }
    }
}

impl core::fmt::Display for Precision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Precision {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f32" | "single" => Ok(Precision::Single),
            "f64" | "double" => Ok(Precision::Double),
            _ => Err(ParseError::new("precision", s)),
        }
    }
}

pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Default
    + Send
    + Sync
    + core::fmt::Debug
    + core::ops::Add<Output = Self>
    + core::ops::Sub<Output = Self>
    + core::ops::Mul<Output = Self>
    + core::ops::Div<Output = Self>
    + core::ops::Neg<Output = Self>
    + 'static
{
    const PRECISION: Precision;

    fn zero() -> Self;
    fn one() -> Self;
    /// Rounds an `f64` to this precision. Tables are evaluated in `f64` and
    /// narrowed through here.
    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;
    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    /// Converts a length into the floating-point type, used for `1/N` scales.
    fn from_usize(x: usize) -> Self {
        Self::from_f64(x as f64)
    }
    /// Kernel candidates for `strategy` at this precision, most specialized
    /// first.
    fn kernel_chain(strategy: KernelStrategy) -> &'static [KernelCandidate<Self>];
}

impl Float for f32 {
    const PRECISION: Precision = Precision::Single;

    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(x: f64) -> Self {
        x as f32
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn abs(self) -> Self {
        f32::abs(self)
    }
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
    fn kernel_chain(strategy: KernelStrategy) -> &'static [KernelCandidate<Self>] {
        kernels::chain_f32(strategy)
    }
}

impl Float for f64 {
    const PRECISION: Precision = Precision::Double;

    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(x: f64) -> Self {
        x
    }
    fn to_f64(self) -> f64 {
        self
    }
    fn abs(self) -> Self {
        f64::abs(self)
    }
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    fn kernel_chain(strategy: KernelStrategy) -> &'static [KernelCandidate<Self>] {
        kernels::chain_f64(strategy)
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<T: Float> {
    pub re: T,
    pub im: T,
}

impl<T: Float> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
    pub fn zero() -> Self {
        Self {
            re: T::zero(),
            im: T::zero(),
        }
    }
    pub fn one() -> Self {
        Self {
            re: T::one(),
            im: T::zero(),
        }
    }
    /// `exp(i·theta)` evaluated in `f64` and rounded to `T`.
    #[inline(always)]
    pub fn expi(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            re: T::from_f64(cos),
            im: T::from_f64(sin),
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn mul(self, other: Self) -> Self {
        Self {
            re: self.re * other.re - self.im * other.im,
            im: self.re * other.im + self.im * other.re,
        }
    }
    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }
    #[inline(always)]
    pub fn scale(self, s: T) -> Self {
        Self {
            re: self.re * s,
            im: self.im * s,
        }
    }
    /// Multiplication by `-i`, the radix-4 rotation.
    #[inline(always)]
    pub fn mul_neg_i(self) -> Self {
        Self {
            re: self.im,
            im: -self.re,
        }
    }
    pub fn norm_sqr(self) -> T {
        self.re * self.re + self.im * self.im
    }
    pub fn norm(self) -> T {
        self.norm_sqr().sqrt()
    }
}

impl<T: Float> core::ops::Neg for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl<T: Float> core::ops::Add for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Complex::<T>::add(self, other)
    }
}

impl<T: Float> core::ops::Sub for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Complex::<T>::sub(self, other)
    }
}

impl<T: Float> core::ops::Mul for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Complex::<T>::mul(self, other)
    }
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

/// Conjugates every element in place. Inverse kernels are built as
/// `conj ∘ forward ∘ conj`.
#[inline]
pub(crate) fn conj_in_place<T: Float>(data: &mut [Complex<T>]) {
    for c in data.iter_mut() {
        c.im = -c.im;
    }
}

#[inline]
pub(crate) fn scale_in_place<T: Float>(data: &mut [Complex<T>], s: T) {
    for c in data.iter_mut() {
        *c = c.scale(s);
    }
}
