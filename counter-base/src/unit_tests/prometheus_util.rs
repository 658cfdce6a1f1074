// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use prometheus::HistogramVec;

use super::{register_histogram_vec, MeasureLatency as _};

fn sample_count(histogram: &HistogramVec) -> u64 {
    histogram.with_label_values(&[]).get_sample_count()
}

#[test]
fn finished_measurement_is_recorded_once() {
    let histogram = register_histogram_vec(
        "finished_measurement_latency",
        "Latency of finished measurements",
        &[],
        None,
    )
    .expect("Histogram can be registered");

    let latency = histogram.measure_latency().finish();

    assert!(latency >= 0.0);
    assert_eq!(sample_count(&histogram), 1);
}

#[test]
fn dropped_measurement_is_recorded() {
    let histogram = register_histogram_vec(
        "dropped_measurement_latency",
        "Latency of dropped measurements",
        &[],
        Some(vec![1.0, 10.0]),
    )
    .expect("Histogram can be registered");

    drop(histogram.measure_latency());
    drop(histogram.measure_latency());

    assert_eq!(sample_count(&histogram), 2);
}

#[test]
fn names_are_registered_once() {
    register_histogram_vec("registered_twice_latency", "First", &[], None)
        .expect("Histogram can be registered");

    assert!(register_histogram_vec("registered_twice_latency", "Second", &[], None).is_err());
}
