//! # planfft - reusable FFT plans for any length
//!
//! One-dimensional complex DFTs in `f32` and `f64`, computed through a
//! [`Plan`] that is built once and then reused without allocating.
//!
//! ## Features
//!
//! - **Any length**: power-of-two lengths use DIT, Stockham, six-step or
//!   eight-step kernels; lengths made of 2, 3 and 5 use mixed-radix Stockham;
//!   everything else goes through Bluestein's chirp-z convolution.
//! - **Runtime SIMD dispatch**: SSE2 and AVX2+FMA on x86_64, NEON on aarch64,
//!   each with a portable fallback that produces the same result.
//! - **Zero-allocation transforms**: scratch is sized at construction.
//! - **Concurrency by cloning**: clones share the immutable tables and own
//!   their scratch.
//! - **Strided and batched access**, buffer pooling and persisted wisdom.
//!
//! ## Cargo Features
//!
//! - `simd` (default): architecture-specific kernels
//! - `verbose-logging`: `log` records for plan construction, pool misses and
//!   wisdom imports
//! - `serde`: `Serialize`/`Deserialize` for wisdom entries
//!
//! ## Example
//!
//! ```
//! use planfft::{Complex64, Plan64};
//!
//! let mut plan = Plan64::new(8).unwrap();
//! let x = vec![Complex64::new(1.0, 0.0); 8];
//! let mut y = vec![Complex64::zero(); 8];
//! plan.forward(&mut y, &x).unwrap();
//! assert!((y[0].re - 8.0).abs() < 1e-12);
//! ```
//!
//! ## Environment
//!
//! - `PLANFFT_FORCE_GENERIC=1` hides every SIMD capability.
//! - `PLANFFT_DIT_MAX`, `PLANFFT_STOCKHAM_MAX`, `PLANFFT_SIX_STEP_MAX` move the
//!   Auto size bands.

#[cfg(feature = "verbose-logging")]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
#[doc(hidden)]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "verbose-logging")]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

pub mod bluestein;
pub mod config;
pub mod error;
/// Capability probe with a forced-generic override.
pub mod features;
pub mod fft;
/// Straight-line butterflies for radix 2, 3, 4, 5, 8 and 16.
pub mod fft_kernels;
pub mod kernels;
pub mod num;
pub mod planner;
pub mod pool;
pub mod twiddle;
pub mod wisdom;

pub use config::{auto_thresholds, reset_auto_thresholds, set_auto_thresholds, AutoThresholds};
pub use error::{FftError, ParseError};
pub use features::{Features, Isa};
pub use fft::{Plan, Plan32, Plan64, PlanOptions, WorkspacePolicy};
pub use kernels::{available_kernels, KernelStrategy, PlanTables};
pub use num::{Complex, Complex32, Complex64, Float, Precision};
pub use planner::Planner;
pub use pool::{alloc_aligned, AlignedBuffer, BufferPool, ALIGNMENT};
pub use wisdom::{Wisdom, WisdomEntry};
