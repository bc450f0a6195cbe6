use actix_csp_demo::{
    CspConfig, CspPolicy, CspPolicyBuilder, HashAlgorithm, HashGenerator, NonceGenerator,
    NonceSource, Source, NONCE,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn complex_builder() -> CspPolicyBuilder {
    CspPolicyBuilder::new()
        .default_src([Source::Self_])
        .script_src([
            NONCE,
            Source::StrictDynamic,
            Source::Host("cdn.example.com".into()),
            Source::Host("*.googleapis.com".into()),
        ])
        .style_src([
            Source::Self_,
            Source::UnsafeInline,
            Source::Host("fonts.googleapis.com".into()),
        ])
        .img_src([
            Source::Self_,
            Source::Scheme("data".into()),
            Source::Host("*.example.com".into()),
        ])
        .connect_src([Source::Self_, Source::Host("api.example.com".into())])
        .font_src([Source::Self_, Source::Host("fonts.gstatic.com".into())])
        .object_src([Source::None])
        .directive("media-src", [Source::Self_])
        .frame_src([Source::None])
        .report_uri("/csp-report")
}

fn benchmark_policy_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_creation");

    group.bench_function("simple_policy", |b| {
        b.iter(|| {
            black_box(
                CspPolicyBuilder::new()
                    .default_src([Source::Self_])
                    .script_src([Source::Self_, Source::UnsafeInline])
                    .style_src([Source::Self_, Source::UnsafeInline])
                    .build()
                    .unwrap(),
            )
        })
    });

    group.bench_function("complex_policy", |b| {
        b.iter(|| black_box(complex_builder().build().unwrap()))
    });

    group.bench_function("policy_document", |b| {
        let json = r#"{
            "directives": {
                "script-src": [{"nonce": true}, "'strict-dynamic'", "https:"],
                "object-src": ["'none'"],
                "base-uri": ["'self'"]
            }
        }"#;
        b.iter(|| black_box(CspPolicy::from_json(black_box(json)).unwrap()))
    });

    group.finish();
}

fn benchmark_header_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("header_generation");

    let static_policy = CspPolicyBuilder::new()
        .default_src([Source::Self_])
        .script_src([Source::Self_, Source::UnsafeInline])
        .build()
        .unwrap();
    let nonce_policy = complex_builder().build().unwrap();
    let nonce = "rAnd0mN0nceV4lue+/AbCw==";

    group.bench_function("static_header", |b| {
        b.iter(|| black_box(static_policy.header_value(None).unwrap()))
    });

    group.bench_function("nonce_header", |b| {
        b.iter(|| black_box(nonce_policy.header_value(Some(black_box(nonce))).unwrap()))
    });

    group.bench_function("nonce_header_string", |b| {
        b.iter(|| black_box(nonce_policy.serialize(Some(black_box(nonce))).unwrap()))
    });

    group.finish();
}

fn benchmark_nonce_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("nonce_generation");

    let generator = NonceGenerator::default();
    let generator_32 = NonceGenerator::new(32).unwrap();

    group.bench_function("nonce_16", |b| b.iter(|| black_box(generator.generate())));

    group.bench_function("nonce_32", |b| {
        b.iter(|| black_box(generator_32.generate()))
    });

    group.finish();
}

fn benchmark_per_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("per_request");

    let config = CspConfig::new(complex_builder().build().unwrap());

    group.bench_function("nonce_and_header", |b| {
        b.iter(|| {
            let nonce = config.generate_nonce().unwrap();
            black_box(config.header_value(nonce.as_deref()).unwrap())
        })
    });

    group.finish();
}

fn benchmark_hash_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_generation");

    let script_content = b"console.log('Hello, World!');";
    let large_script = vec![b'x'; 10000];

    group.bench_function("sha256_small", |b| {
        b.iter(|| {
            black_box(HashGenerator::generate(
                HashAlgorithm::Sha256,
                black_box(script_content),
            ))
        })
    });

    group.bench_function("sha384_small", |b| {
        b.iter(|| {
            black_box(HashGenerator::generate(
                HashAlgorithm::Sha384,
                black_box(script_content),
            ))
        })
    });

    group.bench_function("sha256_large", |b| {
        b.iter(|| {
            black_box(HashGenerator::generate(
                HashAlgorithm::Sha256,
                black_box(&large_script),
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_policy_creation,
    benchmark_header_generation,
    benchmark_nonce_generation,
    benchmark_per_request,
    benchmark_hash_generation
);
criterion_main!(benches);
