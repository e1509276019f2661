//! Shows the plan-construction records emitted with `verbose-logging`.
use std::sync::Arc;

use planfft::{BufferPool, Complex64, Plan64, Wisdom};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .init();

    let wisdom = Wisdom::global();
    if let Err(e) = wisdom.from_text("# tuned on this machine\n4096 f64 stockham\n") {
        eprintln!("wisdom: {e}");
    }

    let pool = Arc::new(BufferPool::new());
    for n in [64usize, 4096, 97] {
        let mut plan = Plan64::new_pooled(n, &pool).unwrap();
        let mut data = vec![Complex64::new(1.0, 0.0); n];
        plan.forward_in_place(&mut data).unwrap();
        println!("n={n} kernel={} X[0]={:.1}", plan.kernel_name(), data[0].re);
    }
}
