use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::Value;
use std::sync::Arc;
use tao_classifier::{
    parse_response, ClassDefinition, Classifier, GeneratorError, StorageConfig, TextGenerator,
};

/// Answers instantly so the benchmarks measure prompt building and parsing only.
struct InstantGenerator;

impl TextGenerator for InstantGenerator {
    fn generate(&self, _system: &str, _user: &str, _temperature: f32, _seed: i64) -> Result<String, GeneratorError> {
        Ok("Here you go:\n```json\n{\"predicted_class\": \"class_0\", \"probability\": 0.75}\n```".to_string())
    }
}

fn setup_benchmark_classifier(class_count: usize, storage: &tempfile::TempDir) -> Classifier {
    let mut builder = Classifier::builder()
        .with_generator(Arc::new(InstantGenerator))
        .with_storage(StorageConfig::new(storage.path()))
        .with_target_column("topic");

    for i in 0..class_count {
        builder = builder
            .add_class(
                ClassDefinition::new(format!("class_{}", i)).with_descriptions(vec![
                    "Mentions a specific product feature and its price.",
                    "Compares two alternatives before recommending one.",
                    "Uses informal language and short sentences.",
                ]),
            )
            .unwrap();
    }
    builder.build().unwrap()
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parsing");

    // Configure sampling
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("bare_json", |b| b.iter(|| {
        parse_response::<Value>(black_box(r#"{"predicted_class": "a", "probability": 0.5}"#)).unwrap()
    }));

    group.bench_function("fenced_with_prose", |b| b.iter(|| {
        parse_response::<Value>(black_box(
            "Based on the descriptions provided, the data point most closely matches the \
             second label. Here is my answer:\n```json\n{\n  \"predicted_class\": \"b\",\n  \
             \"probability\": 0.82\n}\n```\nThe probability reflects moderate overlap with the \
             first label as well."
        )).unwrap()
    }));

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaling");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let storage = tempfile::tempdir().unwrap();

    // Prompt size grows with the number of described classes
    let class_counts = [2, 5, 10, 20, 50];
    for &count in &class_counts {
        let classifier = setup_benchmark_classifier(count, &storage);

        group.bench_function(format!("classes_{}", count), |b| b.iter(|| {
            classifier.predict_text(black_box("Test text for scaling benchmark")).unwrap()
        }));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_scaling
);
criterion_main!(benches);
