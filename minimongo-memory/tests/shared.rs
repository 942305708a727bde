use minimongo_core::{backend::Database, filter, shared::SharedDatabase};
use minimongo_macros::Record;
use minimongo_memory::MemoryDb;
use serde::{Deserialize, Serialize};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
struct Counter {
    task: u32,
    hits: u64,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_through_shared_handle() {
    let shared = SharedDatabase::new(MemoryDb::new());

    let handles = (0..16u32)
        .map(|task| {
            let mut db = shared.clone();
            tokio::spawn(async move { db.insert("counters", Counter { task, hits: 0 }).await })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(shared.read().await.collection_len("counters"), Some(16));
}

#[tokio::test]
async fn test_clones_share_state() {
    let mut writer = SharedDatabase::new(MemoryDb::new());
    let reader = writer.clone();

    writer.insert("counters", Counter { task: 7, hits: 1 }).await.unwrap();
    writer
        .update("counters", Counter { task: 7, hits: 2 }, &filter! { "task" => 7u32 })
        .await
        .unwrap();

    let mut found: Option<Counter> = None;
    reader
        .find_one("counters", &mut found, Some(&filter! { "task" => 7 }), None)
        .await
        .unwrap();

    assert_eq!(found, Some(Counter { task: 7, hits: 2 }));
}

#[tokio::test]
async fn test_write_guard_exposes_backend() {
    let shared = SharedDatabase::new(MemoryDb::new());
    shared
        .write()
        .await
        .insert("counters", Counter { task: 1, hits: 0 })
        .await
        .unwrap();

    let mut all: Vec<Counter> = Vec::new();
    shared.find_all("counters", &mut all, None, None).await.unwrap();

    assert_eq!(all.len(), 1);
}
