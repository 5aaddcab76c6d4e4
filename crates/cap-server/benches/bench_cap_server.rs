use axum::body::Body;
use axum::http::Request;
use cap_core::CapibaraConfig;
use cap_server::{app_with_state, state::AppState};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;
use tower::ServiceExt;

fn bench_http_health(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let state = AppState::from_config(&CapibaraConfig::default()).unwrap();
    c.bench_function("http_health_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                for _ in 0..1000 {
                    let app = app_with_state(state.clone());
                    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
                    let resp = app.oneshot(req).await.unwrap();
                    black_box(resp.status());
                }
            })
        })
    });
}

fn bench_http_classify(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let state = AppState::from_config(&CapibaraConfig::default()).unwrap();
    let prompts = [
        "Hola, ¿qué tal?",
        "Escribe una función en Python que ordene una lista",
        "Analiza la arquitectura del sistema y compara el rendimiento",
        "Traduce este párrafo al inglés",
    ];

    for (uri, name) in [("/api/v1/classify", "http_classify_keyword_100"), ("/api/v1/classify/tier", "http_classify_tier_100")] {
        c.bench_function(name, |b| {
            b.iter(|| {
                rt.block_on(async {
                    for i in 0..100 {
                        let app = app_with_state(state.clone());
                        let body = serde_json::json!({ "text": prompts[i % prompts.len()] });
                        let req = Request::builder()
                            .method("POST")
                            .uri(uri)
                            .header("content-type", "application/json")
                            .body(Body::from(serde_json::to_vec(&body).unwrap()))
                            .unwrap();
                        let resp = app.oneshot(req).await.unwrap();
                        black_box(resp.status());
                    }
                })
            })
        });
    }
}

criterion_group!(benches, bench_http_health, bench_http_classify);
criterion_main!(benches);
