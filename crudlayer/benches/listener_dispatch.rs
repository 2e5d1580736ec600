//! Listener dispatch and in-memory service benchmarks
//!
//! ```bash
//! cargo bench -p crudlayer --bench listener_dispatch
//! ```
//!
//! HTML reports are generated in `target/criterion/report/index.html`.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crudlayer::{
    CrudAction, CrudService, EntityCrudService, Identifiable, InMemoryRepository, Joinpoint,
    ListenerContext, Pageable,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Event {
    id: Option<u64>,
    name: Option<String>,
}

impl Identifiable for Event {
    type Id = u64;

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

#[derive(Debug)]
struct Unrelated;

fn listeners(count: usize, hits: &Arc<AtomicU64>) -> ListenerContext {
    let mut listeners = ListenerContext::new();
    for i in 0..count {
        let hits = Arc::clone(hits);
        let joinpoint = if i % 2 == 0 {
            Joinpoint::Before
        } else {
            Joinpoint::After
        };
        listeners.on::<Event, _>(joinpoint, &CrudAction::WRITES, move |_, _| {
            hits.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        listeners.on::<Unrelated, _>(joinpoint, &CrudAction::ALL, |_, _| Ok(()));
    }
    listeners
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Listener dispatch");
    let event = Event {
        id: Some(1),
        name: Some("bench".to_string()),
    };

    for count in [1, 10, 100] {
        let hits = Arc::new(AtomicU64::new(0));
        let listeners = listeners(count, &hits);
        group.bench_with_input(BenchmarkId::new("before_update", count), &count, |b, _| {
            b.iter(|| listeners.before_update(black_box(&event)));
        });
        group.bench_with_input(BenchmarkId::new("no_match", count), &count, |b, _| {
            b.iter(|| listeners.after_read(black_box(&event)));
        });
    }

    group.finish();
}

fn bench_service(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let mut group = c.benchmark_group("In-memory service");

    for size in [100_u64, 1_000] {
        let hits = Arc::new(AtomicU64::new(0));
        let service = EntityCrudService::new(Arc::new(InMemoryRepository::<Event>::sequential()))
            .with_listeners(Arc::new(listeners(10, &hits)));
        runtime.block_on(async {
            for i in 0..size {
                service
                    .create(Event {
                        id: None,
                        name: Some(format!("event {i}")),
                    })
                    .await
                    .expect("Failed to seed event");
            }
        });

        group.bench_with_input(BenchmarkId::new("get_page", size), &size, |b, _| {
            b.iter(|| {
                runtime
                    .block_on(service.get_page(black_box(Pageable::of(3, 20))))
                    .expect("Failed to read page")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_service);
criterion_main!(benches);
