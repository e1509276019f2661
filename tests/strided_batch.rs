// Test intent: strided and batched layouts transform the right elements and
// leave everything else alone.
mod common;

use planfft::{Complex64, FftError, KernelStrategy, Plan64, PlanOptions};

const MARK: Complex64 = Complex64 { re: 7.5, im: -7.5 };

fn plan(n: usize, strategy: KernelStrategy, kernel: Option<&str>) -> Plan64 {
    Plan64::with_options(
        n,
        PlanOptions {
            strategy,
            ignore_wisdom: true,
            kernel: kernel.map(str::to_string),
            ..PlanOptions::default()
        },
    )
    .unwrap()
}

fn spectrum(x: &[Complex64]) -> Vec<Complex64> {
    common::direct_dft(x)
}

#[test]
fn strided_matches_contiguous_and_keeps_gaps() {
    let cases = [
        (16usize, KernelStrategy::Dit, Some("dit-radix2")),
        (16, KernelStrategy::Dit, None),
        (16, KernelStrategy::Stockham, None),
        (64, KernelStrategy::SixStep, None),
        (64, KernelStrategy::EightStep, None),
        (12, KernelStrategy::Auto, None),
        (11, KernelStrategy::Auto, None),
    ];
    for (n, s, pin) in cases {
        for stride in [1usize, 2, 3, 5] {
            let mut p = plan(n, s, pin);
            let x = common::random_signal::<f64>(n, (n * stride) as u64);
            let want = spectrum(&x);
            let span = (n - 1) * stride + 1;

            let mut src = vec![MARK; span + 2];
            for (i, v) in x.iter().enumerate() {
                src[i * stride] = *v;
            }
            let mut dst = vec![MARK; span + 2];
            p.forward_strided(&mut dst, &src, stride).unwrap();
            for (j, v) in dst.iter().enumerate() {
                if j % stride == 0 && j / stride < n {
                    let k = j / stride;
                    assert!(
                        (v.re - want[k].re).abs() < 1e-10 && (v.im - want[k].im).abs() < 1e-10,
                        "n={n} stride={stride} k={k}"
                    );
                } else {
                    assert_eq!(*v, MARK, "gap {j} touched, n={n} stride={stride}");
                }
            }

            p.inverse_strided_in_place(&mut dst, stride).unwrap();
            for (i, v) in x.iter().enumerate() {
                let got = dst[i * stride];
                assert!((got.re - v.re).abs() < 1e-12 && (got.im - v.im).abs() < 1e-12);
            }
            assert_eq!(dst[span], MARK);
        }
    }
}

#[test]
fn dedicated_and_generic_strided_paths_agree() {
    let n = 32;
    let stride = 3;
    let mut dedicated = plan(n, KernelStrategy::Dit, Some("dit-radix2"));
    let mut generic = plan(n, KernelStrategy::Stockham, None);
    assert!(dedicated.has_strided_kernel());
    assert!(!generic.has_strided_kernel());

    let data = common::random_signal::<f64>(n * stride, 4);
    let mut a = data.clone();
    let mut b = data.clone();
    dedicated.forward_strided_in_place(&mut a, stride).unwrap();
    generic.forward_strided_in_place(&mut b, stride).unwrap();
    assert!(common::max_diff(&a, &b) < 1e-12);
    dedicated.inverse_strided_in_place(&mut a, stride).unwrap();
    generic.inverse_strided_in_place(&mut b, stride).unwrap();
    assert!(common::max_diff(&a, &data) < 1e-12);
    assert!(common::max_diff(&b, &data) < 1e-12);
}

#[test]
fn batch_transforms_each_block() {
    let n = 24;
    let count = 5;
    let mut p = Plan64::new(n).unwrap();
    let src = common::random_signal::<f64>(n * count, 11);
    let mut dst = vec![Complex64::zero(); n * count];
    p.forward_batch(&mut dst, &src, count).unwrap();
    for b in 0..count {
        let want = spectrum(&src[b * n..(b + 1) * n]);
        assert!(common::max_err(&dst[b * n..(b + 1) * n], &want) < 1e-10, "block {b}");
    }
    p.inverse_batch_in_place(&mut dst, count).unwrap();
    assert!(common::max_diff(&dst, &src) < 1e-12);

    // zero transforms is a no-op even on an empty buffer
    p.forward_batch_in_place(&mut [], 0).unwrap();
}

#[test]
fn interleaved_channels_via_batch_strided() {
    let n = 16;
    let channels = 3;
    let mut p = Plan64::new(n).unwrap();
    let src = common::random_signal::<f64>(n * channels, 21);
    let mut dst = vec![Complex64::zero(); n * channels];
    // channel c, sample i lives at c + i*channels
    p.forward_batch_strided(&mut dst, &src, channels, channels, 1).unwrap();
    for c in 0..channels {
        let x: Vec<_> = (0..n).map(|i| src[c + i * channels]).collect();
        let got: Vec<_> = (0..n).map(|i| dst[c + i * channels]).collect();
        assert!(common::max_err(&got, &spectrum(&x)) < 1e-10, "channel {c}");
    }
    let mut back = vec![Complex64::zero(); n * channels];
    p.inverse_batch_strided(&mut back, &dst, channels, channels, 1).unwrap();
    assert!(common::max_diff(&back, &src) < 1e-12);
}

#[test]
fn configured_layout_from_options() {
    let n = 8;
    let opts = PlanOptions {
        batch: 2,
        stride: 2,
        ignore_wisdom: true,
        ..PlanOptions::default()
    };
    let mut p = Plan64::with_options(n, opts).unwrap();
    // default dist is N * stride
    let src = common::random_signal::<f64>(2 * n * 2, 5);
    let mut dst = vec![MARK; 2 * n * 2];
    p.forward_configured(&mut dst, &src).unwrap();
    for b in 0..2 {
        let x: Vec<_> = (0..n).map(|i| src[b * 2 * n + 2 * i]).collect();
        let got: Vec<_> = (0..n).map(|i| dst[b * 2 * n + 2 * i]).collect();
        assert!(common::max_err(&got, &spectrum(&x)) < 1e-10);
        for i in 0..n {
            assert_eq!(dst[b * 2 * n + 2 * i + 1], MARK);
        }
    }

    let mut contiguous = Plan64::with_options(
        n,
        PlanOptions {
            batch: 3,
            dist: 10,
            ..PlanOptions::default()
        },
    )
    .unwrap();
    let src = common::random_signal::<f64>(28, 6);
    let mut dst = vec![MARK; 28];
    contiguous.forward_configured(&mut dst, &src).unwrap();
    assert_eq!(dst[8], MARK);
    assert_eq!(dst[19], MARK);
    let mut back = vec![MARK; 28];
    contiguous.inverse_configured(&mut back, &dst).unwrap();
    for b in 0..3 {
        let r = b * 10..b * 10 + n;
        assert!(common::max_diff(&back[r.clone()], &src[r]) < 1e-12);
    }
}

#[test]
fn layout_errors_leave_buffers_untouched() {
    let n = 16;
    let mut p = Plan64::new(n).unwrap();
    let original = common::random_signal::<f64>(4 * n, 8);

    let mut data = original.clone();
    assert_eq!(p.forward_strided_in_place(&mut data, 0), Err(FftError::InvalidStride));
    assert_eq!(
        p.forward_strided_in_place(&mut data[..(n - 1) * 4], 4),
        Err(FftError::LengthMismatch)
    );
    assert_eq!(p.forward_batch_in_place(&mut data[..4 * n - 1], 4), Err(FftError::LengthMismatch));
    assert_eq!(p.forward_batch_strided(&mut [], &original, 1, 1, 1), Err(FftError::NilBuffer));
    assert_eq!(
        p.forward_batch_strided(&mut data.clone(), &original, 2, 1, 0),
        Err(FftError::InvalidStride)
    );
    assert_eq!(
        p.forward_strided_in_place(&mut data, usize::MAX),
        Err(FftError::InvalidStride)
    );
    assert_eq!(data, original);

    let mut q = Plan64::with_options(
        n,
        PlanOptions {
            batch: 2,
            dist: n - 1,
            ..PlanOptions::default()
        },
    )
    .unwrap();
    let mut dst = original.clone();
    assert_eq!(q.forward_configured(&mut dst, &original), Err(FftError::InvalidStride));
    assert_eq!(dst, original);
}

#[test]
fn overlapping_batches_are_rejected() {
    let n = 4;
    let mut p = Plan64::new(n).unwrap();
    let src = common::random_signal::<f64>(32, 13);

    // transform 1 starts at element 1, inside transform 0
    let mut dst = vec![MARK; 32];
    assert_eq!(
        p.forward_batch_strided(&mut dst, &src, 2, 1, 1),
        Err(FftError::InvalidStride)
    );
    // offsets 0, 2, 4 with stride 4: the third lands on element 1 of the first
    assert_eq!(
        p.forward_batch_strided(&mut dst, &src, 3, 4, 2),
        Err(FftError::InvalidStride)
    );
    assert!(dst.iter().all(|v| *v == MARK));

    // disjoint layouts still run
    p.forward_batch_strided(&mut dst, &src, 2, 4, 2).unwrap();
    p.forward_batch_strided(&mut dst, &src, 4, 4, 1).unwrap();
    p.forward_batch_strided(&mut dst, &src, 2, 2, 7).unwrap();
    p.forward_batch_strided(&mut dst, &src, 2, 1, n).unwrap();
    p.forward_batch_strided(&mut dst, &src, 1, 3, 1).unwrap();
}
