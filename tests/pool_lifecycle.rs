// Test intent: pooled workspace is drawn, returned and refused at the right
// points of a plan's life.
use std::sync::Arc;

use planfft::{
    alloc_aligned, BufferPool, Complex32, Complex64, FftError, KernelStrategy, Plan32, Plan64,
    PlanOptions, Precision, WorkspacePolicy, ALIGNMENT,
};

#[test]
fn aligned_allocation_edges() {
    assert!(alloc_aligned::<f64>(0).is_empty());
    assert!(alloc_aligned::<f64>(-1).is_empty());
    assert!(alloc_aligned::<f32>(isize::MIN).is_empty());
    for n in [1isize, 2, 5, 64, 1023] {
        let b = alloc_aligned::<f32>(n);
        assert_eq!(b.len(), n as usize);
        assert!(b.is_aligned());
        assert_eq!(b.as_ptr() as usize % ALIGNMENT, 0);
    }
}

#[test]
fn close_returns_buffers_and_refuses_work() {
    let pool = Arc::new(BufferPool::new());
    let mut p = Plan64::new_pooled(64, &pool).unwrap();
    assert!(p.is_pooled());
    assert_eq!(pool.cached(64, Precision::Double), 0);

    let mut data = vec![Complex64::new(1.0, 0.0); 64];
    p.forward_in_place(&mut data).unwrap();
    p.close();
    assert!(p.is_closed());
    assert_eq!(pool.cached(64, Precision::Double), 2);

    let before = data.clone();
    assert_eq!(p.forward_in_place(&mut data), Err(FftError::NilBuffer));
    assert_eq!(p.inverse(&mut data, &before), Err(FftError::NilBuffer));
    assert_eq!(p.forward_batch_in_place(&mut data, 0), Err(FftError::NilBuffer));
    assert_eq!(data, before);

    // idempotent
    p.close();
    assert_eq!(pool.cached(64, Precision::Double), 2);
    drop(p);
    assert_eq!(pool.cached(64, Precision::Double), 2);
}

#[test]
fn next_plan_reuses_returned_buffers() {
    let pool = Arc::new(BufferPool::new());
    let p = Plan32::new_pooled(128, &pool).unwrap();
    drop(p);
    assert_eq!(pool.cached(128, Precision::Single), 2);
    assert_eq!(pool.cached(128, Precision::Double), 0);

    let mut q = Plan32::new_pooled(128, &pool).unwrap();
    assert_eq!(pool.cached(128, Precision::Single), 0);
    let mut data = vec![Complex32::new(0.5, 0.5); 128];
    q.forward_in_place(&mut data).unwrap();
    assert!((data[0].re - 64.0).abs() < 1e-3);
}

#[test]
fn bluestein_scratch_is_pooled_at_padded_length() {
    let pool = Arc::new(BufferPool::new());
    let p = Plan64::with_options(
        13,
        PlanOptions {
            workspace: WorkspacePolicy::Pooled(Arc::clone(&pool)),
            ..PlanOptions::default()
        },
    )
    .unwrap();
    assert_eq!(p.strategy(), KernelStrategy::Bluestein);
    assert_eq!(p.scratch_len(), 32);
    drop(p);
    assert_eq!(pool.cached(32, Precision::Double), 1);
    assert_eq!(pool.cached(13, Precision::Double), 1);
}

#[test]
fn clone_of_pooled_plan_draws_from_pool() {
    let pool = Arc::new(BufferPool::new());
    let spare = Plan64::new_pooled(32, &pool).unwrap();
    drop(spare);
    assert_eq!(pool.cached(32, Precision::Double), 2);

    let mut p = Plan64::new_pooled(32, &pool).unwrap();
    let mut c = p.clone();
    assert!(c.is_pooled());
    p.close();
    assert_eq!(pool.cached(32, Precision::Double), 2);
    let mut data = vec![Complex64::new(1.0, 2.0); 32];
    c.forward_in_place(&mut data).unwrap();
    c.close();
    assert_eq!(pool.cached(32, Precision::Double), 4);

    // a clone of a closed plan is closed too
    let mut cc = c.clone();
    assert!(cc.is_closed());
    assert_eq!(cc.forward_in_place(&mut data), Err(FftError::NilBuffer));
}

#[test]
fn owned_plans_ignore_close_and_reset_keeps_them_usable() {
    let mut p = Plan64::new(16).unwrap();
    p.close();
    assert!(!p.is_closed());
    let x: Vec<_> = (0..16).map(|i| Complex64::new(i as f64, 0.0)).collect();
    let mut a = vec![Complex64::zero(); 16];
    let mut b = vec![Complex64::zero(); 16];
    p.forward(&mut a, &x).unwrap();
    p.reset();
    p.forward(&mut b, &x).unwrap();
    assert_eq!(a, b);
}

#[test]
fn clear_drops_free_buffers() {
    let pool = BufferPool::new();
    pool.put(pool.get::<f64>(8));
    pool.put(alloc_aligned::<f64>(0));
    assert_eq!(pool.cached(8, Precision::Double), 1);
    assert_eq!(pool.cached(0, Precision::Double), 0);
    pool.clear();
    assert_eq!(pool.cached(8, Precision::Double), 0);
}

#[test]
fn close_releases_the_pool_handle() {
    let pool = Arc::new(BufferPool::new());
    let mut p = Plan64::new_pooled(16, &pool).unwrap();
    // each open plan holds the pool through its options and its workspace
    assert_eq!(Arc::strong_count(&pool), 3);
    let c = p.clone();
    assert_eq!(Arc::strong_count(&pool), 5);

    p.close();
    assert_eq!(Arc::strong_count(&pool), 3);
    assert!(p.is_pooled());
    assert!(p.is_closed());
    assert!(matches!(p.options().workspace, WorkspacePolicy::Owned));

    p.close();
    assert_eq!(Arc::strong_count(&pool), 3);
    let cc = p.clone();
    assert!(cc.is_pooled() && cc.is_closed());
    assert_eq!(Arc::strong_count(&pool), 3);

    drop(c);
    assert_eq!(Arc::strong_count(&pool), 1);
    assert_eq!(pool.cached(16, Precision::Double), 4);
}
