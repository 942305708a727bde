use minimongo::{
    memory::{MemoryDb, PaginationOrder},
    prelude::*,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[record(crate = "minimongo::minimongo_core")]
struct User {
    name: String,
    age: i32,
    #[record(skip)]
    password: String,
}

fn user(name: &str, age: i32) -> User {
    User {
        name: name.to_string(),
        age,
        password: String::new(),
    }
}

async fn find_names<D: Database>(db: &D, options: &Options) -> DatabaseResult<Vec<String>> {
    let mut users: Vec<User> = Vec::new();
    db.find_all("users", &mut users, None, Some(options)).await?;

    Ok(users.into_iter().map(|user| user.name).collect())
}

#[tokio::test]
async fn test_generic_code_runs_against_memory_backend() {
    let mut db = MemoryDb::builder()
        .pagination_order(PaginationOrder::SortFirst)
        .build()
        .await
        .unwrap();

    for (name, age) in [("carol", 41), ("alice", 30), ("bob", 25)] {
        db.insert("users", user(name, age)).await.unwrap();
    }

    let youngest_first = find_names(&db, &Options::new().sort("Age", 1)).await.unwrap();
    assert_eq!(youngest_first, vec!["bob", "alice", "carol"]);

    db.update("users", user("bob", 26), &filter! { "NAME" => "bob" })
        .await
        .unwrap();
    let oldest = find_names(&db, &Options::new().sort("age", -1).limit(1)).await.unwrap();
    assert_eq!(oldest, vec!["carol"]);
}

#[tokio::test]
async fn test_skipped_fields_are_not_addressable() {
    let mut db = SharedDatabase::new(MemoryDb::new());
    db.insert("users", User { password: "hunter2".into(), ..user("alice", 30) })
        .await
        .unwrap();

    let mut found: Option<User> = None;
    let result = db
        .find_one("users", &mut found, Some(&filter! { "password" => "hunter2" }), None)
        .await;

    assert!(matches!(result, Err(DatabaseError::NoDocumentsFound(_))));
    assert!(User::field_table().resolve("password").is_none());
}
