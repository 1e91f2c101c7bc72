use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use credit_inference::cache::ModelCache;
use credit_inference::inference::{InferenceConfig, InferenceEngine};
use credit_inference::model::{Classifier, LogisticRegression, ModelArtifact};
use credit_inference::preprocessing::{FittedParameters, NominalVocabulary, NumericStats, Preprocessor};
use credit_inference::registry::ModelRegistry;
use credit_inference::schema::{sample_application, CreditRecord, FeatureSchema, CREDIT_MODEL_NAME};
use credit_inference::Result;
use std::sync::Arc;

fn parameters(schema: &FeatureSchema) -> FittedParameters {
    let numeric = schema
        .numeric_fields()
        .map(|f| NumericStats::new(f.name.clone(), 10.0, 4.0))
        .collect();
    let nominal = schema
        .nominal_fields()
        .map(|f| NominalVocabulary::new(f.name.clone(), (0..6).map(|i| format!("C{}", i))))
        .collect();
    FittedParameters::from_parts(schema, numeric, nominal)
}

fn records(n: usize) -> Vec<CreditRecord> {
    (0..n)
        .map(|i| {
            sample_application()
                .with("Duration in month", (6 + i % 60) as i64)
                .with("Purpose", format!("C{}", i % 7))
        })
        .collect()
}

struct StaticRegistry(ModelArtifact);

impl ModelRegistry for StaticRegistry {
    fn load(&self, _name: &str, _stage: &str) -> Result<ModelArtifact> {
        Ok(self.0.clone())
    }
}

fn bench_transform(c: &mut Criterion) {
    let schema = Arc::new(FeatureSchema::credit());
    let pre = Preprocessor::new(schema.clone(), &parameters(&schema)).unwrap();
    let record = sample_application();

    c.bench_function("transform_one", |b| {
        b.iter(|| pre.transform(black_box(&record)).unwrap())
    });

    let mut group = c.benchmark_group("transform_batch");
    for n in [100, 1000, 10000].iter() {
        let batch = records(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &batch, |b, batch| {
            b.iter(|| pre.transform_batch(black_box(batch)).unwrap())
        });
    }
    group.finish();
}

fn bench_predict_batch(c: &mut Criterion) {
    let schema = Arc::new(FeatureSchema::credit());
    let params = parameters(&schema);
    let artifact = ModelArtifact {
        name: CREDIT_MODEL_NAME.to_string(),
        stage: "production".to_string(),
        version: "bench".to_string(),
        description: None,
        classifier: Classifier::Logistic(LogisticRegression {
            weights: vec![0.1; params.n_features()],
            intercept: 0.0,
        }),
        parameters: params,
    };
    let cache = Arc::new(ModelCache::new(Arc::new(StaticRegistry(artifact)), schema));

    let mut group = c.benchmark_group("predict_batch");
    for parallel in [false, true] {
        let config = InferenceConfig::default().with_parallel_batch(parallel);
        let engine = InferenceEngine::new(config, Arc::clone(&cache)).unwrap();
        engine.warm_up();
        let batch = records(1000);
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_with_input(BenchmarkId::new(label, 1000), &batch, |b, batch| {
            b.iter(|| engine.predict_batch(black_box(batch)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transform, bench_predict_batch);
criterion_main!(benches);
