//! A planner hands out plans that share options and, per length, one table
//! set.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::FftError;
use crate::fft::{Plan, PlanOptions};
use crate::kernels::PlanTables;
use crate::num::Float;

/// Caches table sets by length so every plan it builds for a given `N` shares
/// a single `Arc<PlanTables>`.
#[derive(Debug)]
pub struct Planner<T: Float> {
    options: PlanOptions,
    cache: HashMap<usize, Arc<PlanTables<T>>>,
}

impl<T: Float> Default for Planner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Planner<T> {
    pub fn new() -> Self {
        Self::with_options(PlanOptions::default())
    }

    pub fn with_options(options: PlanOptions) -> Self {
        Self {
            options,
            cache: HashMap::new(),
        }
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut PlanOptions {
        &mut self.options
    }

    /// Plan for `n` using the planner's options.
    pub fn plan(&mut self, n: usize) -> Result<Plan<T>, FftError> {
        let cache = &mut self.cache;
        Plan::build(n, self.options.clone(), |n, bluestein| {
            if let Some(t) = cache.get(&n) {
                if !bluestein || t.has_bluestein() {
                    return Ok(Arc::clone(t));
                }
            }
            let t = Arc::new(PlanTables::build(n, bluestein)?);
            cache.insert(n, Arc::clone(&t));
            Ok(t)
        })
    }

    /// Lengths with a cached table set, ascending.
    pub fn cached_lengths(&self) -> Vec<usize> {
        let mut v: Vec<_> = self.cache.keys().copied().collect();
        v.sort_unstable();
        v
    }

    /// Drops the cached tables. Plans already built keep theirs.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::KernelStrategy;

    #[test]
    fn plans_share_tables() {
        let mut p = Planner::<f64>::new();
        let a = p.plan(64).unwrap();
        let b = p.plan(64).unwrap();
        assert!(Arc::ptr_eq(a.tables(), b.tables()));
        p.plan(12).unwrap();
        assert_eq!(p.cached_lengths(), vec![12, 64]);
        p.clear_cache();
        assert!(p.cached_lengths().is_empty());
    }

    #[test]
    fn bluestein_request_upgrades_cached_tables() {
        let mut p = Planner::<f32>::new();
        let a = p.plan(30).unwrap();
        assert!(!a.tables().has_bluestein());
        p.options_mut().strategy = KernelStrategy::Bluestein;
        let b = p.plan(30).unwrap();
        assert_eq!(b.strategy(), KernelStrategy::Bluestein);
        assert!(b.tables().has_bluestein());
        let c = p.plan(30).unwrap();
        assert!(Arc::ptr_eq(b.tables(), c.tables()));
    }
}
