//! Throughput of the in-memory sell path and the joined stock listing.

use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use vitrine_catalog::{NewProduct, UnitOfMeasure};
use vitrine_core::{Quantity, StockEntryId};
use vitrine_infra::{InMemoryLedgerStore, LedgerEngine, seed_default_colors};
use vitrine_ledger::SellRequest;

async fn seeded_engine(initial: f64) -> (LedgerEngine<Arc<InMemoryLedgerStore>>, StockEntryId) {
    let engine = LedgerEngine::new(Arc::new(InMemoryLedgerStore::new()));
    let colors = seed_default_colors(engine.store()).await.unwrap();
    let product = engine
        .create_product(NewProduct {
            code: None,
            name: "Clear glass 8mm".to_string(),
            description: None,
            category: None,
            thickness: Some(8.0),
            unit: UnitOfMeasure::SquareMeter,
        })
        .await
        .unwrap();
    let entry = engine
        .receive_stock(product.id, colors[0].id, Quantity::new(initial).unwrap())
        .await
        .unwrap();
    (engine, entry.id)
}

fn bench_sell(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    // Enough stock that the bench never runs dry.
    let (engine, entry_id) = rt.block_on(seeded_engine(1e12));

    c.bench_function("in_memory_sell", |b| {
        b.iter(|| {
            rt.block_on(engine.sell(SellRequest::new(entry_id, 1.0, "bench")))
                .unwrap()
        })
    });
}

fn bench_list_stock(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (engine, _) = rt.block_on(seeded_engine(100.0));

    c.bench_function("in_memory_list_stock", |b| {
        b.iter(|| rt.block_on(engine.list_stock()).unwrap())
    });
}

criterion_group!(benches, bench_sell, bench_list_stock);
criterion_main!(benches);
