//! Benchmarks for pipeline construction and execution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use draftflow::prelude::*;

const SOURCE: &str = "source";
const SINK: &str = "sink";

fn copy_step(from: String, to: String) -> Arc<dyn Step> {
    Arc::new(FnStep::new("copy", move |inputs: StepInputs| {
        let from = from.clone();
        let to = to.clone();
        async move {
            let text = inputs.require_text(&from)?.to_string();
            Ok::<_, anyhow::Error>(StepOutput::value(to, text))
        }
    }))
}

fn count_step(width: usize) -> Arc<dyn Step> {
    Arc::new(FnStep::new("count", move |inputs: StepInputs| async move {
        let present = (0..width)
            .filter(|i| inputs.is_present(&format!("branch_{i}")))
            .count();
        Ok::<_, anyhow::Error>(StepOutput::value(SINK, present.to_string()))
    }))
}

/// One source fanned out to `width` branches joined by a single sink.
fn fan_out(width: usize) -> Result<Pipeline, ConfigurationError> {
    let branches = (0..width).map(|i| {
        let key = format!("branch_{i}");
        StepDescriptor::new(format!("copy_{i}"), copy_step(SOURCE.to_string(), key.clone()))
            .requires([SOURCE])
            .produces([key])
    });
    let sink = StepDescriptor::new("count", count_step(width))
        .optional((0..width).map(|i| format!("branch_{i}")))
        .produces([SINK]);

    PipelineBuilder::new("fan_out")
        .input(SOURCE)
        .steps(branches)
        .step(sink)
        .terminal(SINK)
        .build()
}

fn build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for width in [8, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| black_box(fan_out(width)));
        });
    }
    group.finish();
}

fn run_benchmark(c: &mut Criterion) {
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        return;
    };
    let mut group = c.benchmark_group("run");
    for width in [8, 64, 256] {
        let Ok(pipeline) = fan_out(width) else {
            continue;
        };
        let options = || RunOptions::new().with_config(RunnerConfig::new().with_events(false));
        group.bench_with_input(BenchmarkId::from_parameter(width), &pipeline, |b, pipeline| {
            b.iter(|| {
                runtime.block_on(async {
                    black_box(
                        pipeline
                            .run_with([(SOURCE, ContextValue::text("payload"))], options())
                            .await,
                    )
                })
            });
        });
    }
    group.finish();
}

criterion_group!(benches, build_benchmark, run_benchmark);
criterion_main!(benches);
