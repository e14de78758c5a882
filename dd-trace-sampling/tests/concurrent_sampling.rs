// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use dd_trace_sampling::{
    GuaranteedThroughputProbabilisticSampler, PerOperationSampler, Sampler, SamplerType, TraceId,
};

#[test]
fn test_update_is_never_observed_half_applied() {
    let sampler = Arc::new(GuaranteedThroughputProbabilisticSampler::new(0.1, 1.0).unwrap());
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let sampler = sampler.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let mut trace_id = i as u64;
                while !stop.load(Ordering::Relaxed) {
                    let (probabilistic, lower_bound) = sampler.samplers();
                    // updates always move both parameters together
                    let expected_bound = if probabilistic.sampling_rate() == 0.1 {
                        1.0
                    } else {
                        2.0
                    };
                    assert_eq!(lower_bound.max_traces_per_second(), expected_bound);

                    let decision = sampler.is_sampled(TraceId::from(trace_id), "op");
                    if decision.tags.sampler_type == SamplerType::LowerBound {
                        let rate = decision.tags.param.as_f64().unwrap();
                        assert!(rate == 0.1 || rate == 0.2);
                    }
                    trace_id = trace_id.wrapping_add(4);
                }
            })
        })
        .collect();

    for i in 0..1000 {
        if i % 2 == 0 {
            assert!(sampler.update(0.2, 2.0));
        } else {
            assert!(sampler.update(0.1, 1.0));
        }
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_concurrent_operation_registration() {
    const THREADS: usize = 8;
    const MAX_OPERATIONS: usize = 10;

    let sampler = PerOperationSampler::with_defaults(MAX_OPERATIONS, 0.0, 0.001).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));
    let lower_bound_hits = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let sampler = sampler.clone();
            let barrier = barrier.clone();
            let lower_bound_hits = lower_bound_hits.clone();
            thread::spawn(move || {
                barrier.wait();
                for op in 0..2 * MAX_OPERATIONS {
                    let decision = sampler.is_sampled(TraceId::from(op as u64), &format!("op-{op}"));
                    if decision.sampled {
                        assert_eq!(decision.tags.sampler_type, SamplerType::LowerBound);
                        lower_bound_hits.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(sampler.operation_count(), MAX_OPERATIONS);
    // Each registered operation gives its initial credit once, the others are always dropped
    assert_eq!(lower_bound_hits.load(Ordering::Relaxed), MAX_OPERATIONS);
    for op in MAX_OPERATIONS..2 * MAX_OPERATIONS {
        assert!(sampler.operation_sampler(&format!("op-{op}")).is_none());
    }
}

#[test]
fn test_close_during_registration_leaves_no_sampler() {
    const THREADS: usize = 4;

    let sampler = PerOperationSampler::with_defaults(usize::MAX, 0.0, 1.0).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let sampler = sampler.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for op in 0..1000 {
                    sampler.is_sampled(TraceId::from(op as u64), &format!("op-{t}-{op}"));
                }
            })
        })
        .collect();

    barrier.wait();
    sampler.close();

    for worker in workers {
        worker.join().unwrap();
    }

    // Registrations either happened before the registry was drained, or saw it closed
    assert_eq!(sampler.operation_count(), 0);
}
