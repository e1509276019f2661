//! The transform plan: immutable tables plus private scratch.
//!
//! A [`Plan`] is built once per length and reused. Every transform entry point
//! validates its arguments before touching any buffer and never allocates.
//! Concurrent use goes through [`Clone`], which shares the tables and gives
//! the clone its own scratch.

use std::sync::Arc;

use crate::error::FftError;
use crate::kernels::{self, KernelCandidate, KernelStrategy, PlanTables};
use crate::num::{scale_in_place, Complex, Float, Precision};
use crate::pool::{alloc_aligned, AlignedBuffer, BufferPool};
use crate::wisdom::Wisdom;

/// Where a plan's scratch comes from.
#[derive(Clone, Default)]
pub enum WorkspacePolicy {
    /// Allocated for the plan and freed with it.
    #[default]
    Owned,
    /// Drawn from and returned to a shared pool.
    Pooled(Arc<BufferPool>),
}

impl core::fmt::Debug for WorkspacePolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WorkspacePolicy::Owned => f.write_str("Owned"),
            WorkspacePolicy::Pooled(_) => f.write_str("Pooled"),
        }
    }
}

/// Construction options.
#[derive(Clone, Debug)]
pub struct PlanOptions {
    pub strategy: KernelStrategy,
    /// Transforms per [`Plan::forward_configured`] call.
    pub batch: usize,
    /// Element stride within one transform for configured calls.
    pub stride: usize,
    /// Distance between consecutive transforms of a configured batch; `0`
    /// means `N` (or `N * stride` when strided).
    pub dist: usize,
    /// Bias Auto toward kernels that need no ping-pong buffer.
    pub in_place: bool,
    /// Wisdom store consulted for Auto; `None` uses [`Wisdom::global`].
    pub wisdom: Option<Arc<Wisdom>>,
    /// Skip wisdom entirely.
    pub ignore_wisdom: bool,
    pub workspace: WorkspacePolicy,
    /// Pin a kernel candidate by name.
    pub kernel: Option<String>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            strategy: KernelStrategy::Auto,
            batch: 1,
            stride: 1,
            dist: 0,
            in_place: false,
            wisdom: None,
            ignore_wisdom: false,
            workspace: WorkspacePolicy::Owned,
            kernel: None,
        }
    }
}

impl PlanOptions {
    pub fn with_strategy(strategy: KernelStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn pooled(pool: &Arc<BufferPool>) -> Self {
        Self {
            workspace: WorkspacePolicy::Pooled(Arc::clone(pool)),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    fn is_forward(self) -> bool {
        self == Direction::Forward
    }
}

pub struct Plan<T: Float> {
    n: usize,
    strategy: KernelStrategy,
    options: PlanOptions,
    tables: Arc<PlanTables<T>>,
    chain: &'static [KernelCandidate<T>],
    scratch: AlignedBuffer<T>,
    gather: AlignedBuffer<T>,
    pool: Option<Arc<BufferPool>>,
    pooled: bool,
    closed: bool,
}

pub type Plan32 = Plan<f32>;
pub type Plan64 = Plan<f64>;

impl<T: Float> core::fmt::Debug for Plan<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Plan")
            .field("n", &self.n)
            .field("precision", &T::PRECISION)
            .field("strategy", &self.strategy)
            .field("kernel", &self.kernel_name())
            .field("pooled", &self.pooled)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<T: Float> Plan<T> {
    /// Plan for length `n` with default options.
    pub fn new(n: usize) -> Result<Self, FftError> {
        Self::with_options(n, PlanOptions::default())
    }

    /// Plan whose scratch is drawn from `pool` and returned by [`Plan::close`].
    pub fn new_pooled(n: usize, pool: &Arc<BufferPool>) -> Result<Self, FftError> {
        Self::with_options(n, PlanOptions::pooled(pool))
    }

    pub fn with_options(n: usize, options: PlanOptions) -> Result<Self, FftError> {
        Self::build(n, options, |n, bluestein| {
            PlanTables::build(n, bluestein).map(Arc::new)
        })
    }

    /// Shared constructor; `tables` supplies the table set for `(n, needs
    /// Bluestein side tables)`, letting a planner hand out cached sets.
    pub(crate) fn build(
        n: usize,
        options: PlanOptions,
        tables: impl FnOnce(usize, bool) -> Result<Arc<PlanTables<T>>, FftError>,
    ) -> Result<Self, FftError> {
        if n == 0 {
            return Err(FftError::InvalidLength);
        }
        let wisdom = if options.ignore_wisdom {
            None
        } else {
            Some(options.wisdom.as_ref().unwrap_or_else(|| Wisdom::global()))
        };
        let strategy = kernels::resolve_strategy::<T>(
            n,
            options.strategy,
            options.in_place,
            wisdom.map(|w| &**w),
        );
        let tables = tables(n, strategy == KernelStrategy::Bluestein)?;
        if tables.len() != n {
            return Err(FftError::InvalidLength);
        }
        let chain = kernels::select::<T>(n, strategy, options.kernel.as_deref())?;

        let scratch_len = if strategy == KernelStrategy::Bluestein {
            tables.scratch_len()
        } else {
            n
        };
        let pool = match &options.workspace {
            WorkspacePolicy::Owned => None,
            WorkspacePolicy::Pooled(p) => Some(Arc::clone(p)),
        };
        let (scratch, gather) = acquire::<T>(pool.as_deref(), scratch_len, n);

        crate::debug!(
            "plan n={} {} strategy={} kernel={} scratch={}",
            n,
            T::PRECISION,
            strategy,
            chain.first().map_or("-", |c| c.name),
            scratch_len
        );

        Ok(Self {
            n,
            strategy,
            options,
            tables,
            chain,
            scratch,
            gather,
            pooled: pool.is_some(),
            pool,
            closed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    /// Plans always have `N >= 1`.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The concrete strategy this plan resolved to.
    pub fn strategy(&self) -> KernelStrategy {
        self.strategy
    }

    /// Name of the preferred kernel candidate chosen at construction.
    pub fn kernel_name(&self) -> &'static str {
        self.chain.first().map_or("", |c| c.name)
    }

    pub fn precision(&self) -> Precision {
        T::PRECISION
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn tables(&self) -> &Arc<PlanTables<T>> {
        &self.tables
    }

    /// Length of the private scratch (`N`, or `M` under Bluestein).
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    pub fn is_pooled(&self) -> bool {
        self.pooled
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ---- validation -------------------------------------------------------

    fn check_open(&self) -> Result<(), FftError> {
        if self.closed {
            Err(FftError::NilBuffer)
        } else {
            Ok(())
        }
    }

    /// Fails before any data is touched if no candidate can run right now.
    fn check_runnable(&self) -> Result<(), FftError> {
        if self.chain.iter().any(|c| c.usable(self.n)) {
            Ok(())
        } else {
            Err(FftError::NotImplemented)
        }
    }

    fn check_contiguous(&self, len: usize) -> Result<(), FftError> {
        if len == 0 {
            Err(FftError::NilBuffer)
        } else if len != self.n {
            Err(FftError::LengthMismatch)
        } else {
            Ok(())
        }
    }

    /// Elements spanned by one strided transform: `(N-1)*stride + 1`.
    fn strided_span(&self, stride: usize) -> Result<usize, FftError> {
        if stride == 0 {
            return Err(FftError::InvalidStride);
        }
        (self.n - 1)
            .checked_mul(stride)
            .and_then(|s| s.checked_add(1))
            .ok_or(FftError::InvalidStride)
    }

    /// Elements spanned by `count` transforms `dist` apart, each spanning
    /// `span`.
    fn batch_span(count: usize, dist: usize, span: usize) -> Result<usize, FftError> {
        (count - 1)
            .checked_mul(dist)
            .and_then(|s| s.checked_add(span))
            .ok_or(FftError::InvalidStride)
    }

    /// Transforms `a` and `b = a + d` share an element when `d * dist` is a
    /// multiple of `stride` below `span`. The smallest such `d * dist` is
    /// `lcm(dist, stride)`, reached at `d = stride / gcd`.
    fn transforms_overlap(count: usize, stride: usize, dist: usize, span: usize) -> bool {
        let (mut a, mut b) = (dist, stride);
        while b != 0 {
            (a, b) = (b, a % b);
        }
        let step = stride / a;
        step < count && step.checked_mul(dist).is_some_and(|lcm| lcm < span)
    }

    fn check_len(len: usize, required: usize) -> Result<(), FftError> {
        if len == 0 {
            Err(FftError::NilBuffer)
        } else if len < required {
            Err(FftError::LengthMismatch)
        } else {
            Ok(())
        }
    }

    // ---- execution --------------------------------------------------------

    fn execute(&mut self, data: &mut [Complex<T>], dir: Direction) -> Result<(), FftError> {
        kernels::run(
            self.chain,
            dir.is_forward(),
            data,
            &self.tables,
            &mut self.scratch,
        )?;
        if !dir.is_forward() {
            scale_in_place(data, T::one() / T::from_usize(self.n));
        }
        Ok(())
    }

    fn contiguous(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        dir: Direction,
    ) -> Result<(), FftError> {
        self.check_open()?;
        self.check_contiguous(dst.len())?;
        self.check_contiguous(src.len())?;
        self.check_runnable()?;
        dst.copy_from_slice(src);
        self.execute(dst, dir)
    }

    fn contiguous_in_place(
        &mut self,
        data: &mut [Complex<T>],
        dir: Direction,
    ) -> Result<(), FftError> {
        self.check_open()?;
        self.check_contiguous(data.len())?;
        self.check_runnable()?;
        self.execute(data, dir)
    }

    /// Transforms the elements `src[offset + i*stride]` into
    /// `dst[offset + i*stride]`; `src == None` reads from `dst`.
    fn strided_unchecked(
        &mut self,
        dst: &mut [Complex<T>],
        src: Option<&[Complex<T>]>,
        offset: usize,
        stride: usize,
        dir: Direction,
    ) -> Result<(), FftError> {
        let n = self.n;
        let forward = dir.is_forward();
        let read = |i: usize, dst: &[Complex<T>]| match src {
            Some(s) => s[offset + i * stride],
            None => dst[offset + i * stride],
        };

        let lead = self.chain.iter().find(|c| c.usable(n));
        let dedicated = match lead {
            Some(c) if self.tables.bitrev.len() == n => c.pass,
            _ => None,
        };

        let gather = &mut self.gather[..n];
        if let Some(pass) = dedicated {
            // Bit-reversal folded into the gather, then the radix-2 stages.
            let bitrev = &self.tables.bitrev;
            for (i, g) in gather.iter_mut().enumerate() {
                let v = read(bitrev[i], &*dst);
                *g = if forward { v } else { v.conj() };
            }
            // SAFETY: `lead` was checked usable on this CPU just above.
            unsafe { kernels::dit::radix2_stages(gather, &self.tables.stages, 1, pass) };
            if !forward {
                crate::num::conj_in_place(gather);
            }
        } else {
            for (i, g) in gather.iter_mut().enumerate() {
                *g = read(i, &*dst);
            }
            kernels::run(self.chain, forward, gather, &self.tables, &mut self.scratch)?;
        }

        if !forward {
            scale_in_place(gather, T::one() / T::from_usize(n));
        }
        for (i, &g) in gather.iter().enumerate() {
            dst[offset + i * stride] = g;
        }
        Ok(())
    }

    fn strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: Option<&[Complex<T>]>,
        stride: usize,
        dir: Direction,
    ) -> Result<(), FftError> {
        self.check_open()?;
        let span = self.strided_span(stride)?;
        Self::check_len(dst.len(), span)?;
        if let Some(s) = src {
            Self::check_len(s.len(), span)?;
        }
        self.check_runnable()?;
        self.strided_unchecked(dst, src, 0, stride, dir)
    }

    fn batch(
        &mut self,
        dst: &mut [Complex<T>],
        src: Option<&[Complex<T>]>,
        count: usize,
        dist: usize,
        dir: Direction,
    ) -> Result<(), FftError> {
        self.check_open()?;
        if count == 0 {
            return Ok(());
        }
        let n = self.n;
        if dist < n {
            return Err(FftError::InvalidStride);
        }
        let span = Self::batch_span(count, dist, n)?;
        Self::check_len(dst.len(), span)?;
        if let Some(s) = src {
            Self::check_len(s.len(), span)?;
        }
        self.check_runnable()?;
        for b in 0..count {
            let range = b * dist..b * dist + n;
            if let Some(s) = src {
                dst[range.clone()].copy_from_slice(&s[range.clone()]);
            }
            self.execute(&mut dst[range], dir)?;
        }
        Ok(())
    }

    fn batch_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: Option<&[Complex<T>]>,
        count: usize,
        stride: usize,
        dist: usize,
        dir: Direction,
    ) -> Result<(), FftError> {
        self.check_open()?;
        if count == 0 {
            return Ok(());
        }
        let span = self.strided_span(stride)?;
        if dist == 0 || Self::transforms_overlap(count, stride, dist, span) {
            return Err(FftError::InvalidStride);
        }
        let total = Self::batch_span(count, dist, span)?;
        Self::check_len(dst.len(), total)?;
        if let Some(s) = src {
            Self::check_len(s.len(), total)?;
        }
        self.check_runnable()?;
        for b in 0..count {
            self.strided_unchecked(dst, src, b * dist, stride, dir)?;
        }
        Ok(())
    }

    fn configured(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        dir: Direction,
    ) -> Result<(), FftError> {
        let PlanOptions {
            batch,
            stride,
            dist,
            ..
        } = self.options;
        if stride == 1 {
            let dist = if dist == 0 { self.n } else { dist };
            self.batch(dst, Some(src), batch, dist, dir)
        } else {
            let dist = if dist == 0 {
                self.n.saturating_mul(stride)
            } else {
                dist
            };
            self.batch_strided(dst, Some(src), batch, stride, dist, dir)
        }
    }

    // ---- public transforms -----------------------------------------------

    /// `dst[k] = Σ src[n]·exp(-2πikn/N)`.
    pub fn forward(&mut self, dst: &mut [Complex<T>], src: &[Complex<T>]) -> Result<(), FftError> {
        self.contiguous(dst, src, Direction::Forward)
    }

    /// `dst[k] = (1/N)·Σ src[n]·exp(+2πikn/N)`.
    pub fn inverse(&mut self, dst: &mut [Complex<T>], src: &[Complex<T>]) -> Result<(), FftError> {
        self.contiguous(dst, src, Direction::Inverse)
    }

    pub fn forward_in_place(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        self.contiguous_in_place(data, Direction::Forward)
    }

    pub fn inverse_in_place(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        self.contiguous_in_place(data, Direction::Inverse)
    }

    /// Forward transform of `src[i*stride]` into `dst[i*stride]`. Elements
    /// between strided positions are left untouched.
    pub fn forward_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        stride: usize,
    ) -> Result<(), FftError> {
        self.strided(dst, Some(src), stride, Direction::Forward)
    }

    pub fn inverse_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        stride: usize,
    ) -> Result<(), FftError> {
        self.strided(dst, Some(src), stride, Direction::Inverse)
    }

    pub fn forward_strided_in_place(
        &mut self,
        data: &mut [Complex<T>],
        stride: usize,
    ) -> Result<(), FftError> {
        self.strided(data, None, stride, Direction::Forward)
    }

    pub fn inverse_strided_in_place(
        &mut self,
        data: &mut [Complex<T>],
        stride: usize,
    ) -> Result<(), FftError> {
        self.strided(data, None, stride, Direction::Inverse)
    }

    /// `count` consecutive transforms; transform `b` occupies
    /// `[b*N, (b+1)*N)`.
    pub fn forward_batch(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        count: usize,
    ) -> Result<(), FftError> {
        self.batch(dst, Some(src), count, self.n, Direction::Forward)
    }

    pub fn inverse_batch(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        count: usize,
    ) -> Result<(), FftError> {
        self.batch(dst, Some(src), count, self.n, Direction::Inverse)
    }

    pub fn forward_batch_in_place(
        &mut self,
        data: &mut [Complex<T>],
        count: usize,
    ) -> Result<(), FftError> {
        self.batch(data, None, count, self.n, Direction::Forward)
    }

    pub fn inverse_batch_in_place(
        &mut self,
        data: &mut [Complex<T>],
        count: usize,
    ) -> Result<(), FftError> {
        self.batch(data, None, count, self.n, Direction::Inverse)
    }

    /// `count` strided transforms; element `i` of transform `b` lives at
    /// `b*dist + i*stride`. `dist = 1, stride = count` handles interleaved
    /// channels. Layouts where two transforms share an element are rejected
    /// with `InvalidStride`.
    pub fn forward_batch_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        count: usize,
        stride: usize,
        dist: usize,
    ) -> Result<(), FftError> {
        self.batch_strided(dst, Some(src), count, stride, dist, Direction::Forward)
    }

    pub fn inverse_batch_strided(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        count: usize,
        stride: usize,
        dist: usize,
    ) -> Result<(), FftError> {
        self.batch_strided(dst, Some(src), count, stride, dist, Direction::Inverse)
    }

    /// Forward transform using the batch, stride and distance from the plan
    /// options.
    pub fn forward_configured(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
    ) -> Result<(), FftError> {
        self.configured(dst, src, Direction::Forward)
    }

    pub fn inverse_configured(
        &mut self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
    ) -> Result<(), FftError> {
        self.configured(dst, src, Direction::Inverse)
    }

    // ---- lifecycle --------------------------------------------------------

    /// Zeroes the scratch. The plan stays usable.
    pub fn reset(&mut self) {
        self.scratch.fill_zero();
        self.gather.fill_zero();
    }

    /// Returns pooled scratch to its pool and drops the plan's pool handle;
    /// later transforms fail with [`FftError::NilBuffer`]. Idempotent, and a
    /// no-op for owned plans.
    pub fn close(&mut self) {
        let Some(pool) = self.pool.take() else {
            return;
        };
        self.options.workspace = WorkspacePolicy::Owned;
        pool.put(core::mem::replace(&mut self.scratch, AlignedBuffer::empty()));
        pool.put(core::mem::replace(&mut self.gather, AlignedBuffer::empty()));
        self.closed = true;
    }

    /// The candidate that would run for a contiguous call right now.
    pub fn active_kernel(&self) -> Option<&'static str> {
        self.chain.iter().find(|c| c.usable(self.n)).map(|c| c.name)
    }

    /// True when strided calls take the gather-with-bit-reversal path.
    pub fn has_strided_kernel(&self) -> bool {
        let lead = self.chain.iter().find(|c| c.usable(self.n));
        matches!(lead, Some(c) if c.pass.is_some() && self.tables.bitrev.len() == self.n)
    }
}

fn acquire<T: Float>(
    pool: Option<&BufferPool>,
    scratch_len: usize,
    n: usize,
) -> (AlignedBuffer<T>, AlignedBuffer<T>) {
    match pool {
        Some(p) => (p.get(scratch_len), p.get(n)),
        None => (
            alloc_aligned(isize::try_from(scratch_len).unwrap_or(isize::MAX)),
            alloc_aligned(isize::try_from(n).unwrap_or(isize::MAX)),
        ),
    }
}

impl<T: Float> Clone for Plan<T> {
    /// Shares the tables; the clone gets fresh scratch from the same source.
    fn clone(&self) -> Self {
        let (scratch, gather) = if self.closed {
            (AlignedBuffer::empty(), AlignedBuffer::empty())
        } else {
            acquire::<T>(self.pool.as_deref(), self.scratch.len(), self.n)
        };
        Self {
            n: self.n,
            strategy: self.strategy,
            options: self.options.clone(),
            tables: Arc::clone(&self.tables),
            chain: self.chain,
            scratch,
            gather,
            pool: self.pool.clone(),
            pooled: self.pooled,
            closed: self.closed,
        }
    }
}

impl<T: Float> Drop for Plan<T> {
    fn drop(&mut self) {
        self.close();
    }
}
