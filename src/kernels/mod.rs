//! Kernel registry and selector.
//!
//! A strategy maps to an ordered chain of [`KernelCandidate`]s, most
//! specialized first and ending in a portable implementation. A candidate may
//! decline a call (returning `false`, leaving the data untouched), in which
//! case the next one in the chain runs. Falling off the end of a chain is the
//! only way a transform reports [`FftError::NotImplemented`].

use core::fmt;
use core::str::FromStr;

use crate::bluestein::BluesteinTables;
use crate::config::{self, AutoThresholds};
use crate::error::{FftError, ParseError};
use crate::features::{self, Isa};
use crate::num::{Complex, Float};
use crate::twiddle;
use crate::wisdom::Wisdom;

pub(crate) mod dit;
pub(crate) mod simd;
pub(crate) mod six_step;
pub(crate) mod stockham;

/// Forward or inverse kernel: `(data, tables, scratch) -> accepted`.
///
/// Kernels transform `data` in place and may use all of `scratch`, which is at
/// least [`PlanTables::scratch_len`] long. A kernel that returns `false` must
/// not have modified `data`.
pub type KernelFn<T> = fn(&mut [Complex<T>], &PlanTables<T>, &mut [Complex<T>]) -> bool;

/// One radix-2 decimation-in-time stage over every block of `data`: for each
/// block of `2 * half` elements, `lo[j], hi[j] = lo[j] ± hi[j] * tw[j]`.
///
/// # Safety
///
/// SIMD passes require their instruction set; callers must have checked the
/// owning candidate's [`Isa`] against [`features::detect`].
pub type PassFn<T> = unsafe fn(&mut [Complex<T>], usize, &[Complex<T>]);

/// Strategy family requested by the caller or chosen by the Auto heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KernelStrategy {
    #[default]
    Auto,
    Dit,
    Stockham,
    SixStep,
    EightStep,
    Bluestein,
}

impl KernelStrategy {
    pub const ALL: [KernelStrategy; 6] = [
        KernelStrategy::Auto,
        KernelStrategy::Dit,
        KernelStrategy::Stockham,
        KernelStrategy::SixStep,
        KernelStrategy::EightStep,
        KernelStrategy::Bluestein,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KernelStrategy::Auto => "auto",
            KernelStrategy::Dit => "dit",
            KernelStrategy::Stockham => "stockham",
            KernelStrategy::SixStep => "six-step",
            KernelStrategy::EightStep => "eight-step",
            KernelStrategy::Bluestein => "bluestein",
        }
    }

    /// Whether this concrete strategy can serve length `n`. `Auto` serves
    /// nothing by itself.
    pub fn fits(self, n: usize) -> bool {
        match self {
            KernelStrategy::Auto => false,
            KernelStrategy::Dit | KernelStrategy::SixStep | KernelStrategy::EightStep => {
                twiddle::is_power_of_two(n)
            }
            KernelStrategy::Stockham => twiddle::is_smooth(n),
            KernelStrategy::Bluestein => n >= 1,
        }
    }
}

impl fmt::Display for KernelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelStrategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KernelStrategy::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::new("strategy", s))
    }
}

/// A concrete kernel implementation within a strategy chain.
pub struct KernelCandidate<T: Float> {
    pub name: &'static str,
    pub isa: Isa,
    pub accepts: fn(usize) -> bool,
    pub forward: KernelFn<T>,
    pub inverse: KernelFn<T>,
    /// Radix-2 stage used by the dedicated strided path, for candidates that
    /// are built from one.
    pub pass: Option<PassFn<T>>,
}

impl<T: Float> Clone for KernelCandidate<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Float> Copy for KernelCandidate<T> {}

impl<T: Float> fmt::Debug for KernelCandidate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelCandidate")
            .field("name", &self.name)
            .field("isa", &self.isa)
            .field("strided_pass", &self.pass.is_some())
            .finish()
    }
}

impl<T: Float> KernelCandidate<T> {
    /// True when the running CPU may execute this candidate for length `n`.
    pub fn usable(&self, n: usize) -> bool {
        (self.accepts)(n) && features::detect().supports(self.isa)
    }
}

pub(crate) fn pow2_len(n: usize) -> bool {
    twiddle::is_power_of_two(n)
}

pub(crate) fn smooth_len(n: usize) -> bool {
    twiddle::is_smooth(n)
}

pub(crate) fn any_len(n: usize) -> bool {
    n >= 1
}

/// Runs `f` on conjugated data, giving the unscaled inverse of a forward
/// kernel. A decline is undone exactly since negation is lossless.
#[inline]
pub(crate) fn conjugated<T: Float>(
    f: KernelFn<T>,
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> bool {
    crate::num::conj_in_place(data);
    let ok = f(data, tables, scratch);
    crate::num::conj_in_place(data);
    ok
}

/// Immutable per-length tables shared by every plan (and clone) of that
/// length.
pub struct PlanTables<T: Float> {
    n: usize,
    pub(crate) twiddles: Vec<Complex<T>>,
    pub(crate) bitrev: Vec<usize>,
    pub(crate) stages: Vec<Complex<T>>,
    pub(crate) packed4: Vec<Complex<T>>,
    pub(crate) packed8: Vec<Complex<T>>,
    pub(crate) packed16: Vec<Complex<T>>,
    pub(crate) factors: Vec<usize>,
    pub(crate) bluestein: Option<BluesteinTables<T>>,
}

impl<T: Float> fmt::Debug for PlanTables<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanTables")
            .field("n", &self.n)
            .field("factors", &self.factors)
            .field("bluestein", &self.bluestein.as_ref().map(|b| b.padded_len()))
            .finish_non_exhaustive()
    }
}

impl<T: Float> PlanTables<T> {
    /// Builds the tables for `n`. Bluestein side tables are built when
    /// `with_bluestein` is set or when `n` has a prime factor above 5.
    pub fn build(n: usize, with_bluestein: bool) -> Result<Self, FftError> {
        if n == 0 || n > max_len::<T>() {
            return Err(FftError::InvalidLength);
        }
        let factors = twiddle::factorize(n);
        let smooth = factors.is_some();
        let pow2 = twiddle::is_power_of_two(n);

        let twiddles = twiddle::twiddles(n);
        let (bitrev, stages, packed4, packed8, packed16) = if pow2 {
            (
                twiddle::bit_reversal(n),
                twiddle::stage_twiddles(n, &twiddles),
                twiddle::packed_twiddles(n, 4, &twiddles),
                twiddle::packed_twiddles(n, 8, &twiddles),
                twiddle::packed_twiddles(n, 16, &twiddles),
            )
        } else {
            Default::default()
        };
        let bluestein = if with_bluestein || !smooth {
            Some(BluesteinTables::build(n)?)
        } else {
            None
        };
        Ok(Self {
            n,
            twiddles,
            bitrev,
            stages,
            packed4,
            packed8,
            packed16,
            factors: factors.unwrap_or_default(),
            bluestein,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// `W_N^k` for `k` in `0..N`, built for every length.
    pub fn twiddles(&self) -> &[Complex<T>] {
        &self.twiddles
    }

    /// Empty unless the length is a power of two.
    pub fn bitrev(&self) -> &[usize] {
        &self.bitrev
    }

    /// Packed radix-4/8/16 twiddles; empty for other radices.
    pub fn packed(&self, radix: usize) -> &[Complex<T>] {
        match radix {
            4 => &self.packed4,
            8 => &self.packed8,
            16 => &self.packed16,
            _ => &[],
        }
    }

    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    pub fn bluestein(&self) -> Option<&BluesteinTables<T>> {
        self.bluestein.as_ref()
    }

    pub fn has_bluestein(&self) -> bool {
        self.bluestein.is_some()
    }

    /// Scratch a plan must provide: `M` when Bluestein tables are present,
    /// otherwise `N`.
    pub fn scratch_len(&self) -> usize {
        self.bluestein
            .as_ref()
            .map_or(self.n, |b| b.padded_len().max(self.n))
    }
}

/// Largest length whose Bluestein padding still fits in the address space.
fn max_len<T: Float>() -> usize {
    let elem = core::mem::size_of::<Complex<T>>();
    (isize::MAX as usize / elem) / 4
}

/// Resolves a requested strategy to the concrete one a plan of length `n`
/// will use.
///
/// Non-smooth lengths always go to Bluestein. For Auto, a fitting wisdom
/// entry wins over the size heuristic. Smooth lengths that are not powers of
/// two go to the mixed-radix Stockham chain unless Bluestein was asked for.
pub fn resolve_strategy<T: Float>(
    n: usize,
    requested: KernelStrategy,
    in_place: bool,
    wisdom: Option<&Wisdom>,
) -> KernelStrategy {
    if !twiddle::is_smooth(n) {
        return KernelStrategy::Bluestein;
    }
    if requested == KernelStrategy::Auto {
        if let Some(s) = wisdom.and_then(|w| w.lookup(n, T::PRECISION)) {
            if s.fits(n) {
                return s;
            }
        }
    }
    if requested == KernelStrategy::Bluestein {
        return KernelStrategy::Bluestein;
    }
    if !twiddle::is_power_of_two(n) {
        return KernelStrategy::Stockham;
    }
    match requested {
        KernelStrategy::Auto => auto_strategy(n, in_place, config::auto_thresholds()),
        other => other,
    }
}

/// The replaceable size-band heuristic for power-of-two lengths.
pub fn auto_strategy(n: usize, in_place: bool, t: AutoThresholds) -> KernelStrategy {
    if n <= t.dit_max {
        KernelStrategy::Dit
    } else if n <= t.stockham_max {
        if in_place {
            KernelStrategy::Dit
        } else {
            KernelStrategy::Stockham
        }
    } else if n <= t.six_step_max {
        KernelStrategy::SixStep
    } else {
        KernelStrategy::EightStep
    }
}

/// Picks the starting point in `strategy`'s chain for length `n`.
///
/// The returned slice begins at the first usable candidate (or is exactly the
/// pinned candidate); later entries are the fallbacks tried when a candidate
/// declines at call time.
pub(crate) fn select<T: Float>(
    n: usize,
    strategy: KernelStrategy,
    pin: Option<&str>,
) -> Result<&'static [KernelCandidate<T>], FftError> {
    let chain = T::kernel_chain(strategy);
    match pin {
        Some(name) => {
            let i = chain
                .iter()
                .position(|c| c.name == name)
                .ok_or(FftError::NotImplemented)?;
            if !chain[i].usable(n) {
                return Err(FftError::NotImplemented);
            }
            Ok(&chain[i..=i])
        }
        None => {
            let i = chain
                .iter()
                .position(|c| c.usable(n))
                .ok_or(FftError::NotImplemented)?;
            Ok(&chain[i..])
        }
    }
}

/// Runs the first candidate of `chain` that accepts the call.
#[inline]
pub(crate) fn run<T: Float>(
    chain: &[KernelCandidate<T>],
    forward: bool,
    data: &mut [Complex<T>],
    tables: &PlanTables<T>,
    scratch: &mut [Complex<T>],
) -> Result<(), FftError> {
    let n = data.len();
    for c in chain {
        if !(c.accepts)(n) {
            continue;
        }
        let f = if forward { c.forward } else { c.inverse };
        if f(data, tables, scratch) {
            return Ok(());
        }
    }
    Err(FftError::NotImplemented)
}

/// Names of the candidates of `strategy` usable for length `n` on this
/// machine, in preference order. `strategy` is resolved first, so asking for
/// DIT at a non-power-of-two length lists the chain actually used.
pub fn available_kernels<T: Float>(strategy: KernelStrategy, n: usize) -> Vec<&'static str> {
    if n == 0 {
        return Vec::new();
    }
    let resolved = resolve_strategy::<T>(n, strategy, false, None);
    T::kernel_chain(resolved)
        .iter()
        .filter(|c| c.usable(n))
        .map(|c| c.name)
        .collect()
}

type Chain<T> = [KernelCandidate<T>];

const fn bluestein_candidate<T: Float>() -> KernelCandidate<T> {
    KernelCandidate {
        name: "bluestein",
        isa: Isa::Generic,
        accepts: any_len,
        forward: crate::bluestein::forward::<T>,
        inverse: crate::bluestein::inverse::<T>,
        pass: None,
    }
}

static DIT_F32: [KernelCandidate<f32>; 7] = [
    simd::dit::<f32, { simd::AVX2_FMA }>("dit-avx2-fma"),
    simd::dit::<f32, { simd::SSE2 }>("dit-sse2"),
    simd::dit::<f32, { simd::NEON }>("dit-neon"),
    dit::radix_r::<f32, 16>("dit-radix16"),
    dit::radix_r::<f32, 8>("dit-radix8"),
    dit::radix_r::<f32, 4>("dit-radix4"),
    dit::radix2::<f32>(),
];
static DIT_F64: [KernelCandidate<f64>; 7] = [
    simd::dit::<f64, { simd::AVX2_FMA }>("dit-avx2-fma"),
    simd::dit::<f64, { simd::SSE2 }>("dit-sse2"),
    simd::dit::<f64, { simd::NEON }>("dit-neon"),
    dit::radix_r::<f64, 16>("dit-radix16"),
    dit::radix_r::<f64, 8>("dit-radix8"),
    dit::radix_r::<f64, 4>("dit-radix4"),
    dit::radix2::<f64>(),
];

static STOCKHAM_F32: [KernelCandidate<f32>; 2] =
    [stockham::radix2::<f32>(), stockham::mixed_radix::<f32>()];
static STOCKHAM_F64: [KernelCandidate<f64>; 2] =
    [stockham::radix2::<f64>(), stockham::mixed_radix::<f64>()];

static SIX_STEP_F32: [KernelCandidate<f32>; 4] = [
    simd::six_step::<f32, { simd::AVX2_FMA }>("six-step-avx2-fma"),
    simd::six_step::<f32, { simd::SSE2 }>("six-step-sse2"),
    simd::six_step::<f32, { simd::NEON }>("six-step-neon"),
    six_step::six_step::<f32>(),
];
static SIX_STEP_F64: [KernelCandidate<f64>; 4] = [
    simd::six_step::<f64, { simd::AVX2_FMA }>("six-step-avx2-fma"),
    simd::six_step::<f64, { simd::SSE2 }>("six-step-sse2"),
    simd::six_step::<f64, { simd::NEON }>("six-step-neon"),
    six_step::six_step::<f64>(),
];

static EIGHT_STEP_F32: [KernelCandidate<f32>; 4] = [
    simd::eight_step::<f32, { simd::AVX2_FMA }>("eight-step-avx2-fma"),
    simd::eight_step::<f32, { simd::SSE2 }>("eight-step-sse2"),
    simd::eight_step::<f32, { simd::NEON }>("eight-step-neon"),
    six_step::eight_step::<f32>(),
];
static EIGHT_STEP_F64: [KernelCandidate<f64>; 4] = [
    simd::eight_step::<f64, { simd::AVX2_FMA }>("eight-step-avx2-fma"),
    simd::eight_step::<f64, { simd::SSE2 }>("eight-step-sse2"),
    simd::eight_step::<f64, { simd::NEON }>("eight-step-neon"),
    six_step::eight_step::<f64>(),
];

static BLUESTEIN_F32: [KernelCandidate<f32>; 1] = [bluestein_candidate::<f32>()];
static BLUESTEIN_F64: [KernelCandidate<f64>; 1] = [bluestein_candidate::<f64>()];

/// `f32` chain for a concrete strategy. `Auto` has no chain of its own.
pub(crate) fn chain_f32(strategy: KernelStrategy) -> &'static Chain<f32> {
    match strategy {
        KernelStrategy::Auto => &[],
        KernelStrategy::Dit => &DIT_F32,
        KernelStrategy::Stockham => &STOCKHAM_F32,
        KernelStrategy::SixStep => &SIX_STEP_F32,
        KernelStrategy::EightStep => &EIGHT_STEP_F32,
        KernelStrategy::Bluestein => &BLUESTEIN_F32,
    }
}

pub(crate) fn chain_f64(strategy: KernelStrategy) -> &'static Chain<f64> {
    match strategy {
        KernelStrategy::Auto => &[],
        KernelStrategy::Dit => &DIT_F64,
        KernelStrategy::Stockham => &STOCKHAM_F64,
        KernelStrategy::SixStep => &SIX_STEP_F64,
        KernelStrategy::EightStep => &EIGHT_STEP_F64,
        KernelStrategy::Bluestein => &BLUESTEIN_F64,
    }
}
