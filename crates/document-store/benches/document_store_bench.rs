use criterion::{Criterion, criterion_group, criterion_main};
use document_store::{
    Direction, DocumentPath, DocumentStore, DocumentStoreExt, InMemoryDocumentStore, Query,
    WriteBatch,
};
use serde_json::json;

fn seeded_store(rt: &tokio::runtime::Runtime, products: usize) -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new();
    rt.block_on(async {
        for i in 0..products {
            store
                .set(
                    DocumentPath::new("products", format!("p-{i}")),
                    &json!({"farmer_id": format!("f-{}", i % 10), "stock": 1_000_000, "price": i}),
                )
                .await
                .unwrap();
        }
    });
    store
}

fn bench_single_set(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();

    c.bench_function("document_store/set_single", |b| {
        b.iter(|| {
            rt.block_on(async {
                let id = store.generate_id();
                store
                    .set(DocumentPath::new("notifications", id), &json!({"is_read": false}))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_checkout_shaped_batch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(&rt, 100);

    c.bench_function("document_store/checkout_batch_5_items", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut batch = WriteBatch::new()
                    .set(DocumentPath::new("orders", store.generate_id()), &json!({"total": 5}))
                    .unwrap();
                for i in 0..5 {
                    batch = batch
                        .increment_with_floor(
                            DocumentPath::new("products", format!("p-{i}")),
                            "stock",
                            -1,
                            0,
                        )
                        .delete(DocumentPath::new("users/u-1/cart", format!("p-{i}")));
                }
                store.commit(batch).await.unwrap();
            });
        });
    });
}

fn bench_filtered_query(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(&rt, 1_000);
    let query = Query::collection("products")
        .where_eq("farmer_id", "f-3")
        .order_by("price", Direction::Descending);

    c.bench_function("document_store/query_1000_filtered", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.query(&query).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_single_set,
    bench_checkout_shaped_batch,
    bench_filtered_query
);
criterion_main!(benches);
