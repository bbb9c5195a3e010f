//! Integration tests for `stepwatch` against the real platform.
//!
//! Timing assertions only use lower bounds, since the operating system may delay the test
//! thread by an arbitrary amount.

use std::fs;
use std::hint::black_box;
use std::time::{Duration, Instant};

use stepwatch::{Clock, ClockSource, EtaEstimate, Registry, TOTAL_TIMER_NAME, wait};

/// Keeps the processor busy for at least `duration` of wall time.
fn burn_processor(duration: Duration) -> u64 {
    let start = Instant::now();
    let mut accumulator = 0_u64;

    while start.elapsed() < duration {
        for i in 0..10_000_u64 {
            accumulator = accumulator.wrapping_mul(31).wrapping_add(i).rotate_left(3);
        }
        black_box(accumulator);
    }

    accumulator
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn waits_accumulate_across_cycles() {
    let registry = Registry::new();
    let timer = registry.timer("waiting");

    for _ in 0..3 {
        timer.start();
        wait(0.01);
        timer.stop();
    }

    assert_eq!(timer.start_count(), 3);
    assert!(timer.duration_seconds() >= 0.03, "{}", timer.duration_seconds());
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn double_start_measures_from_first_start() {
    let registry = Registry::new();
    let timer = registry.timer("double");

    timer.start();
    wait(0.02);
    timer.start();
    timer.stop();

    assert_eq!(timer.start_count(), 1);
    assert!(timer.duration_seconds() >= 0.02);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn process_cpu_timer_ignores_sleep() {
    let registry = Registry::builder()
        .clock_source(ClockSource::ProcessCpu)
        .build();
    let sleeping = registry.timer("sleeping");
    let working = registry.timer("working");

    sleeping.start();
    wait(0.2);
    sleeping.stop();

    working.start();
    black_box(burn_processor(Duration::from_millis(50)));
    working.stop();

    assert!(sleeping.duration_seconds() < 0.1, "{}", sleeping.duration_seconds());
    assert!(working.duration_seconds() > 0.0);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn report_after_stop_all() {
    let registry = Registry::new();
    registry.total().start();

    let solve = registry.timer("solve");
    solve.start();
    wait(0.01);
    registry.stop_all();

    let report = registry.report(1);
    let rows = report.rows();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].name(), TOTAL_TIMER_NAME);
    assert!((rows[1].percentage().unwrap() - 100.0).abs() < 1e-9);
    assert!(rows[0].percentage().unwrap() <= 100.0);

    let rendered = report.to_string();
    assert!(rendered.contains("Timing of different code aspects"));
    assert!(rendered.contains("Total (human readable)"));
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn step_logs_record_every_cycle() {
    let folder = tempfile::tempdir().unwrap();
    let registry = Registry::builder().output_folder(folder.path()).build();
    let output = registry.timer("field output");

    for step in 1..=3 {
        registry.set_step(step);
        let _span = output.span();
        wait(0.001);
    }

    let contents = fs::read_to_string(folder.path().join("Timing_field_output.csv")).unwrap();
    let lines: Vec<_> = contents.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("#    Step,"));
    assert!(lines[1].starts_with("       1, "));
    assert!(lines[3].starts_with("       3, "));

    for line in &lines[1..] {
        let duration: f64 = line.rsplit(", ").next().unwrap().parse().unwrap();
        assert!(duration >= 0.001, "{line}");
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn eta_extrapolates_from_real_time() {
    let registry = Registry::new();
    let eta = registry.eta(0.0, 2.0);

    assert_eq!(eta.estimate(0.0), EtaEstimate::Unavailable);

    registry.total().start();
    wait(0.01);

    let remaining = eta.estimate(1.0).remaining().unwrap();
    assert!(remaining.as_seconds() >= 0.01);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real file system.
fn disabled_registry_is_inert() {
    let folder = tempfile::tempdir().unwrap();
    let registry = Registry::builder()
        .enabled(false)
        .output_folder(folder.path().join("timings"))
        .build();

    let timer = registry.timer("anything");
    timer.start();
    timer.stop();

    assert_eq!(timer.duration(), Clock::ZERO);
    assert!(registry.report(1).is_empty());
    assert_eq!(registry.eta(0.0, 1.0).estimate(0.5).to_string(), "");
    assert!(!folder.path().join("timings").exists());
}
