//! 설정 기반 다이얼렉트 생성과 전체 순회 예제
//!
//! 실행: RUST_LOG=gridmap=debug cargo run --example bulk_scan --features logging

use gridmap_core::config::properties;
use gridmap_core::datastore::DialectFactory;
use gridmap_core::persister::EntityPersister;
use gridmap_core::{DialectConfig, Entity, GridResult};

#[derive(Entity, Debug)]
#[gridmap(table = "users")]
struct User {
    #[gridmap(id)]
    id: i64,
    name: String,
    email: Option<String>,
}

fn main() -> GridResult<()> {
    gridmap_core::logging::init();

    let dir = std::env::temp_dir().join("gridmap-bulk-scan");
    let config = DialectConfig::new()
        .with(properties::DATASTORE_PROVIDER, "sled")
        .with(properties::SLED_PATH, dir.to_string_lossy());
    let dialect = DialectFactory::create(&config)?;
    println!("=== gridmap 예제 ({} 다이얼렉트) ===\n", dialect.name());

    let persister = EntityPersister::of::<User>(dialect.as_ref());
    for (id, name) in [(1, "Alice"), (2, "Bob"), (3, "Charlie")] {
        let user = User {
            id,
            name: name.to_string(),
            email: None,
        };
        // 재실행 시 이미 존재하는 키는 갱신
        if persister.find::<User>(&user.entity_key()?)?.is_some() {
            persister.update_entity(&user)?;
        } else {
            persister.insert_entity(&user)?;
        }
    }

    println!("users 테이블 전체 순회:");
    let mut users = Vec::new();
    dialect.for_each_tuple(
        &mut |t: &gridmap_core::model::Tuple| users.push(User::from_tuple(t)),
        &[persister.metadata().as_ref()],
    )?;
    for user in users {
        println!("  {:?}", user?);
    }

    let orphaned = gridmap_core::model::EntityKeyMetadata::new("audit", ["id"]);
    let mut calls = 0;
    dialect.for_each_tuple(&mut |_: &gridmap_core::model::Tuple| calls += 1, &[&orphaned])?;
    println!("\n저장된 튜플이 없는 타입: {calls}건");

    Ok(())
}
