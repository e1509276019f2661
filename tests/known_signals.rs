// Test intent: closed-form spectra across every strategy and both precisions.
mod common;

use planfft::{Complex, Complex32, Complex64, Float, KernelStrategy, Plan, Plan64, PlanOptions};

fn plan<T: Float>(n: usize, strategy: KernelStrategy) -> Plan<T> {
    let opts = PlanOptions {
        strategy,
        ignore_wisdom: true,
        ..PlanOptions::default()
    };
    Plan::with_options(n, opts).expect("Invariant: plan construction should succeed")
}

#[test]
fn impulse_of_four_is_flat() {
    let mut p = Plan64::new(4).unwrap();
    let x = [
        Complex64::new(1.0, 0.0),
        Complex64::zero(),
        Complex64::zero(),
        Complex64::zero(),
    ];
    let mut y = [Complex64::zero(); 4];
    p.forward(&mut y, &x).unwrap();
    for c in y {
        assert!((c.re - 1.0).abs() < 1e-12 && c.im.abs() < 1e-12);
    }
}

#[test]
fn ones_of_eight() {
    let mut p = Plan64::new(8).unwrap();
    let x = [Complex64::new(1.0, 0.0); 8];
    let mut y = [Complex64::zero(); 8];
    p.forward(&mut y, &x).unwrap();
    assert!((y[0].re - 8.0).abs() < 1e-12 && y[0].im.abs() < 1e-12);
    for c in &y[1..] {
        assert!(c.norm() < 1e-12);
    }
}

fn constant_case<T: Float>(n: usize, strategy: KernelStrategy, tol: f64) {
    let c = Complex::new(T::from_f64(0.75), T::from_f64(-0.5));
    let mut p = plan::<T>(n, strategy);
    let x = vec![c; n];
    let mut y = vec![Complex::zero(); n];
    p.forward(&mut y, &x).unwrap();
    let scale = n as f64;
    assert!((y[0].re.to_f64() - 0.75 * scale).abs() < tol * scale, "n={n} {strategy}");
    assert!((y[0].im.to_f64() + 0.5 * scale).abs() < tol * scale, "n={n} {strategy}");
    for v in &y[1..] {
        assert!(v.norm().to_f64() < tol * scale, "n={n} {strategy} {}", p.kernel_name());
    }
}

#[test]
fn constant_input_concentrates_in_bin_zero() {
    let strategies = [
        KernelStrategy::Auto,
        KernelStrategy::Dit,
        KernelStrategy::Stockham,
        KernelStrategy::SixStep,
        KernelStrategy::EightStep,
        KernelStrategy::Bluestein,
    ];
    for n in [1usize, 2, 3, 5, 7, 12, 16, 60, 64, 97, 256] {
        for s in strategies {
            constant_case::<f64>(n, s, 1e-12);
            constant_case::<f32>(n, s, 1e-5);
        }
    }
}

#[test]
fn integer_bin_cosine_peaks_at_half_n() {
    for (n, k) in [(16usize, 3usize), (64, 5), (48, 7), (100, 13), (31, 4)] {
        let mut p = Plan64::new(n).unwrap();
        let x: Vec<_> = (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * (k * i) as f64 / n as f64;
                Complex64::new(t.cos(), 0.0)
            })
            .collect();
        let mut y = vec![Complex64::zero(); n];
        p.forward(&mut y, &x).unwrap();
        for (bin, v) in y.iter().enumerate() {
            let want = if bin == k || bin == n - k { n as f64 / 2.0 } else { 0.0 };
            assert!((v.norm() - want).abs() < 1e-9, "n={n} bin={bin} got={}", v.norm());
        }
    }
}

#[test]
fn single_precision_matches_oracle() {
    for n in [8usize, 20, 64, 81, 128, 101] {
        let x = common::random_signal::<f32>(n, n as u64);
        let want = common::direct_dft(&x);
        let mut p = planfft::Plan32::new(n).unwrap();
        let mut y = vec![Complex32::zero(); n];
        p.forward(&mut y, &x).unwrap();
        assert!(common::max_err(&y, &want) < common::tolerance::<f32>(n), "n={n}");
    }
}
