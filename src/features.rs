//! Runtime CPU capability probe.
//!
//! Detection runs once per process and is cached. `force_generic` is a
//! process-wide switch used by tests (and `PLANFFT_FORCE_GENERIC`) to pretend
//! no SIMD is available; it is consulted on every query so that flipping it
//! takes effect for plans built afterwards and for SIMD kernels already
//! selected by existing plans.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::config;

/// Instruction-set requirement of a kernel candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Isa {
    Generic,
    Sse2,
    Avx2Fma,
    Neon,
}

impl Isa {
    pub fn as_str(self) -> &'static str {
        match self {
            Isa::Generic => "generic",
            Isa::Sse2 => "sse2",
            Isa::Avx2Fma => "avx2+fma",
            Isa::Neon => "neon",
        }
    }
}

/// Capabilities of the running CPU as seen by the kernel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub arch: &'static str,
    pub sse2: bool,
    pub avx2: bool,
    pub fma: bool,
    pub neon: bool,
    /// True when SIMD is being hidden by [`force_generic`] or the environment.
    pub forced_generic: bool,
}

impl Features {
    const fn generic(arch: &'static str) -> Self {
        Self {
            arch,
            sse2: false,
            avx2: false,
            fma: false,
            neon: false,
            forced_generic: false,
        }
    }

    /// Whether kernels requiring `isa` may run.
    pub fn supports(&self, isa: Isa) -> bool {
        match isa {
            Isa::Generic => true,
            Isa::Sse2 => self.sse2,
            Isa::Avx2Fma => self.avx2 && self.fma,
            Isa::Neon => self.neon,
        }
    }

    /// Best SIMD level available, or `Generic`.
    pub fn best_isa(&self) -> Isa {
        if self.supports(Isa::Avx2Fma) {
            Isa::Avx2Fma
        } else if self.sse2 {
            Isa::Sse2
        } else if self.neon {
            Isa::Neon
        } else {
            Isa::Generic
        }
    }
}

static DETECTED: OnceLock<Features> = OnceLock::new();
static FORCE_GENERIC: AtomicBool = AtomicBool::new(false);

fn probe() -> Features {
    #[allow(unused_mut)]
    let mut f = Features::generic(std::env::consts::ARCH);
    #[cfg(all(target_arch = "x86_64", feature = "simd"))]
    {
        f.sse2 = std::arch::is_x86_feature_detected!("sse2");
        f.avx2 = std::arch::is_x86_feature_detected!("avx2");
        f.fma = std::arch::is_x86_feature_detected!("fma");
    }
    #[cfg(all(target_arch = "aarch64", feature = "simd"))]
    {
        f.neon = std::arch::is_aarch64_feature_detected!("neon");
    }
    crate::trace!("feature probe: {:?}", f);
    f
}

/// Hardware capabilities, probed on first call.
pub fn detect() -> Features {
    let hw = *DETECTED.get_or_init(probe);
    if is_forced_generic() {
        Features {
            forced_generic: true,
            ..Features::generic(hw.arch)
        }
    } else {
        hw
    }
}

/// Hide (or reveal again) every SIMD capability. Intended for tests that
/// compare SIMD output against the portable kernels.
pub fn force_generic(on: bool) {
    FORCE_GENERIC.store(on, Ordering::SeqCst);
}

pub fn is_forced_generic() -> bool {
    FORCE_GENERIC.load(Ordering::SeqCst) || config::env_force_generic()
}
