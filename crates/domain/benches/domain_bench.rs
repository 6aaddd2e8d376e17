use common::UserId;
use criterion::{Criterion, criterion_group, criterion_main};
use document_store::InMemoryDocumentStore;
use domain::{
    CartService, CatalogFilter, Category, Checkout, CheckoutService, GeoPoint, Product,
    ProductService, Rupiah,
};

fn bench_checkout(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let products = ProductService::new(store.clone());
    let cart = CartService::new(store.clone());
    let checkout = CheckoutService::new(store.clone());
    let uid = UserId::new("bench-user");

    let listed: Vec<Product> = rt.block_on(async {
        let mut listed = Vec::new();
        for i in 0..3 {
            let p = Product::new(
                "bench-farmer",
                format!("Produk {i}"),
                Rupiah::new(5_000),
                i64::MAX / 2,
                Category::SayurDaun,
            );
            listed.push(products.add_product(p).await.unwrap());
        }
        listed
    });

    c.bench_function("domain/checkout_3_items", |b| {
        b.iter(|| {
            rt.block_on(async {
                for p in &listed {
                    cart.add_to_cart(&uid, p, 1).await.unwrap();
                }
                let items = cart.cart_items(&uid).await.unwrap();
                checkout
                    .checkout(Checkout {
                        user_id: uid.clone(),
                        email: "bench@example.com".to_string(),
                        address: String::new(),
                        items,
                    })
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_catalog_sort(c: &mut Criterion) {
    let buyer = GeoPoint::new(-7.7956, 110.3695);
    let products: Vec<Product> = (0..1_000)
        .map(|i| {
            Product::new(
                "f-1",
                format!("Sayur {i}"),
                Rupiah::new(1_000),
                10,
                Category::SayurDaun,
            )
            .with_location(GeoPoint::new(-6.0 - (i as f64) * 0.001, 106.0 + (i as f64) * 0.002))
        })
        .collect();
    let filter = CatalogFilter::new().search("sayur 1").near(buyer);

    c.bench_function("domain/catalog_filter_and_sort_1000", |b| {
        b.iter(|| filter.apply(products.clone()));
    });
}

criterion_group!(benches, bench_checkout, bench_catalog_sort);
criterion_main!(benches);
