use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use training_coach::models::ConversationContext;
use training_coach::services::classify;

fn benchmark_classify(c: &mut Criterion) {
    let check2 = ConversationContext::Check2 {
        session_id: "session-1".to_string(),
    };

    let mut group = c.benchmark_group("classify");

    group.bench_function("button_no_context", |b| {
        b.iter(|| classify(black_box("⏭️ Скип дня"), None))
    });

    // Falls through every matcher
    group.bench_function("unhandled_text", |b| {
        b.iter(|| classify(black_box("what should I eat after leg day?"), None))
    });

    group.bench_function("check2_free_text", |b| {
        b.iter(|| classify(black_box("  2100 ккал  "), Some(&check2)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_classify);
criterion_main!(benches);
