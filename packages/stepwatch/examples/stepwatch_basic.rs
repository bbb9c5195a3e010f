//! Instruments a toy iterative computation with named timers, a remaining-time estimate and a
//! throughput meter, then prints the timing report.
//!
//! Step logs are written to the folder named by `STEPWATCH_OUTPUT_FOLDER`, if set. Set
//! `RUST_LOG=stepwatch=debug` to see the library's own log events.

use std::hint::black_box;

use stepwatch::{Registry, wait};
use tracing::info;
use tracing_subscriber::EnvFilter;

const STEPS_PER_PHASE: u64 = 2_000_000;
const PROGRESS_LINES_PER_PHASE: u64 = 5;

#[expect(
    clippy::cast_precision_loss,
    reason = "step counts in this demo stay far below 2^52"
)]
fn as_progress(step: u64) -> f64 {
    step as f64
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Registry::builder().from_env().build();
    let total = registry.total();
    total.start();

    let eta = registry.eta(0.0, as_progress(3 * STEPS_PER_PHASE));
    let mut step_rate = registry.step_rate();

    let phases = [("cosine", f64::cos as fn(f64) -> f64), ("sine", f64::sin), ("cosine", f64::cos)];

    for (phase_index, (name, function)) in (0_u64..).zip(phases) {
        let timer = registry.timer(name);
        let first_step = phase_index * STEPS_PER_PHASE;

        timer.start();

        for t in 0..STEPS_PER_PHASE {
            let step = first_step + t;
            registry.set_step(step);

            black_box(function(black_box(as_progress(t))));

            if t % (STEPS_PER_PHASE / PROGRESS_LINES_PER_PHASE) == 0 {
                info!(
                    step,
                    eta = %eta.estimate(as_progress(step)),
                    steps_per_second = step_rate.steps_per_second(step),
                    "progress"
                );
            }
        }

        timer.stop();
    }

    {
        let _span = registry.timer("wait").span();
        wait(0.25);
    }

    registry.stop_all();

    let last_step = 3 * STEPS_PER_PHASE;
    info!(
        average_steps_per_second = step_rate.total_steps_per_second(last_step),
        "finished"
    );

    registry.report(last_step).print_to_stdout();
}
