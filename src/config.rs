//! Process-wide tuning knobs.
//!
//! Values come from the environment the first time they are needed and can be
//! overridden at runtime. A runtime override of `0` means "no override".

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Default upper bound (inclusive) of the DIT band of the Auto heuristic.
pub const DEFAULT_DIT_MAX: usize = 1 << 10;
/// Default upper bound (inclusive) of the Stockham band.
pub const DEFAULT_STOCKHAM_MAX: usize = 1 << 14;
/// Default upper bound (inclusive) of the six-step band; above it Auto picks
/// eight-step.
pub const DEFAULT_SIX_STEP_MAX: usize = 1 << 20;

static DIT_MAX_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static STOCKHAM_MAX_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
static SIX_STEP_MAX_OVERRIDE: AtomicUsize = AtomicUsize::new(0);

static ENV: OnceLock<EnvConfig> = OnceLock::new();

struct EnvConfig {
    force_generic: bool,
    thresholds: AutoThresholds,
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
}

fn env_config() -> &'static EnvConfig {
    ENV.get_or_init(|| {
        let force_generic = std::env::var("PLANFFT_FORCE_GENERIC")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        EnvConfig {
            force_generic,
            thresholds: AutoThresholds {
                dit_max: env_usize("PLANFFT_DIT_MAX").unwrap_or(DEFAULT_DIT_MAX),
                stockham_max: env_usize("PLANFFT_STOCKHAM_MAX").unwrap_or(DEFAULT_STOCKHAM_MAX),
                six_step_max: env_usize("PLANFFT_SIX_STEP_MAX").unwrap_or(DEFAULT_SIX_STEP_MAX),
            },
        }
    })
}

/// Size bands used to resolve `KernelStrategy::Auto` for power-of-two lengths.
///
/// These are empirical; `benches/bench_fft.rs` is the place to retune them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoThresholds {
    pub dit_max: usize,
    pub stockham_max: usize,
    pub six_step_max: usize,
}

impl Default for AutoThresholds {
    fn default() -> Self {
        Self {
            dit_max: DEFAULT_DIT_MAX,
            stockham_max: DEFAULT_STOCKHAM_MAX,
            six_step_max: DEFAULT_SIX_STEP_MAX,
        }
    }
}

/// The thresholds currently in force: runtime overrides, then
/// `PLANFFT_*_MAX` environment variables, then the defaults.
pub fn auto_thresholds() -> AutoThresholds {
    let env = env_config().thresholds;
    let pick = |o: &AtomicUsize, fallback: usize| match o.load(Ordering::Relaxed) {
        0 => fallback,
        v => v,
    };
    AutoThresholds {
        dit_max: pick(&DIT_MAX_OVERRIDE, env.dit_max),
        stockham_max: pick(&STOCKHAM_MAX_OVERRIDE, env.stockham_max),
        six_step_max: pick(&SIX_STEP_MAX_OVERRIDE, env.six_step_max),
    }
}

/// Override the Auto size bands. Zero fields keep the environment/default
/// value for that band.
pub fn set_auto_thresholds(thresholds: AutoThresholds) {
    DIT_MAX_OVERRIDE.store(thresholds.dit_max, Ordering::Relaxed);
    STOCKHAM_MAX_OVERRIDE.store(thresholds.stockham_max, Ordering::Relaxed);
    SIX_STEP_MAX_OVERRIDE.store(thresholds.six_step_max, Ordering::Relaxed);
}

pub fn reset_auto_thresholds() {
    set_auto_thresholds(AutoThresholds {
        dit_max: 0,
        stockham_max: 0,
        six_step_max: 0,
    });
}

/// `PLANFFT_FORCE_GENERIC` as read at first use.
pub(crate) fn env_force_generic() -> bool {
    env_config().force_generic
}
