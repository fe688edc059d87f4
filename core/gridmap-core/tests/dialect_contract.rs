// 번들 다이얼렉트 계약 테스트: in-memory와 sled가 같은 동작을 보이는지 확인

use gridmap_core::GridDialect;
use gridmap_core::config::properties;
use gridmap_core::datastore::{DialectFactory, InMemoryDialect, SledDialect};
use gridmap_core::dialect::{DuplicateInsertPreventionStrategy, LockMode, NextValueRequest};
use gridmap_core::error::{GridError, GridResult};
use gridmap_core::model::{
    AssociationKey, AssociationKeyMetadata, EntityKey, EntityKeyMetadata, Tuple, Value,
};
use gridmap_core::DialectConfig;
use std::sync::Arc;
use tempfile::tempdir;

fn dialects() -> Vec<Box<dyn GridDialect>> {
    vec![
        Box::new(InMemoryDialect::new()),
        Box::new(SledDialect::open_temporary().unwrap()),
    ]
}

fn users() -> Arc<EntityKeyMetadata> {
    Arc::new(EntityKeyMetadata::new("users", ["id"]))
}

fn orders() -> Arc<EntityKeyMetadata> {
    Arc::new(EntityKeyMetadata::new("orders", ["tenant", "number"]))
}

fn insert_user(dialect: &dyn GridDialect, id: i64, name: &str) -> GridResult<()> {
    let key = EntityKey::new(users(), [Value::Int(id)])?;
    let mut tuple = dialect.create_tuple(&key)?;
    tuple.put("name", name);
    dialect.insert_or_update_tuple(&key, &tuple)
}

fn scan(dialect: &dyn GridDialect, metadata: &[&EntityKeyMetadata]) -> GridResult<Vec<Tuple>> {
    let mut seen = Vec::new();
    dialect.for_each_tuple(&mut |t: &Tuple| seen.push(t.clone()), metadata)?;
    Ok(seen)
}

#[test]
fn test_for_each_tuple_visits_every_stored_tuple() -> GridResult<()> {
    for dialect in dialects() {
        insert_user(dialect.as_ref(), 1, "x")?;
        insert_user(dialect.as_ref(), 2, "y")?;

        let users = users();
        let seen = scan(dialect.as_ref(), &[users.as_ref()])?;
        assert_eq!(seen.len(), 2, "dialect {}", dialect.name());

        let mut names: Vec<&str> = seen
            .iter()
            .map(|t| t.get("name").unwrap().as_str().unwrap())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["x", "y"]);
    }
    Ok(())
}

#[test]
fn test_for_each_tuple_without_metadata_never_calls_consumer() -> GridResult<()> {
    for dialect in dialects() {
        insert_user(dialect.as_ref(), 1, "x")?;
        assert!(scan(dialect.as_ref(), &[])?.is_empty());
    }
    Ok(())
}

#[test]
fn test_for_each_tuple_unions_requested_types() -> GridResult<()> {
    for dialect in dialects() {
        insert_user(dialect.as_ref(), 1, "x")?;
        let order = EntityKey::new(orders(), [Value::from("acme"), Value::Int(100)])?;
        let tuple = dialect.create_tuple(&order)?;
        dialect.insert_or_update_tuple(&order, &tuple)?;

        let users = users();
        let orders = orders();
        let never_written = EntityKeyMetadata::new("audit", ["id"]);

        assert_eq!(scan(dialect.as_ref(), &[users.as_ref()])?.len(), 1);
        assert_eq!(scan(dialect.as_ref(), &[orders.as_ref()])?.len(), 1);
        assert!(scan(dialect.as_ref(), &[&never_written])?.is_empty());
        assert_eq!(
            scan(
                dialect.as_ref(),
                &[users.as_ref(), orders.as_ref(), &never_written]
            )?
            .len(),
            2
        );
    }
    Ok(())
}

#[test]
fn test_removed_tuples_are_not_scanned() -> GridResult<()> {
    for dialect in dialects() {
        insert_user(dialect.as_ref(), 1, "x")?;
        insert_user(dialect.as_ref(), 2, "y")?;
        dialect.remove_tuple(&EntityKey::new(users(), [Value::Int(1)])?)?;

        let users = users();
        let seen = scan(dialect.as_ref(), &[users.as_ref()])?;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("id"), Some(&Value::Int(2)));
    }
    Ok(())
}

#[test]
fn test_native_duplicate_prevention() -> GridResult<()> {
    for dialect in dialects() {
        assert_eq!(
            dialect.get_duplicate_insert_prevention_strategy(&users()),
            DuplicateInsertPreventionStrategy::Native
        );
        insert_user(dialect.as_ref(), 1, "x")?;
        let err = insert_user(dialect.as_ref(), 1, "y").unwrap_err();
        assert!(matches!(err, GridError::DuplicateKey { .. }));

        let key = EntityKey::new(users(), [Value::Int(1)])?;
        let stored = dialect.get_tuple(&key)?.unwrap();
        assert_eq!(stored.get("name"), Some(&Value::from("x")));
    }
    Ok(())
}

#[test]
fn test_update_keeps_untouched_columns() -> GridResult<()> {
    for dialect in dialects() {
        let key = EntityKey::new(users(), [Value::Int(1)])?;
        let mut tuple = dialect.create_tuple(&key)?;
        tuple.put("name", "alice");
        tuple.put("city", "oslo");
        dialect.insert_or_update_tuple(&key, &tuple)?;

        let mut loaded = dialect.get_tuple(&key)?.unwrap();
        loaded.remove("city");
        loaded.put("name", "bob");
        dialect.insert_or_update_tuple(&key, &loaded)?;

        let reloaded = dialect.get_tuple(&key)?.unwrap();
        assert_eq!(reloaded.get("name"), Some(&Value::from("bob")));
        assert!(!reloaded.contains("city"));
        assert_eq!(reloaded.get("id"), Some(&Value::Int(1)));
    }
    Ok(())
}

#[test]
fn test_sequences() -> GridResult<()> {
    for dialect in dialects() {
        assert!(dialect.supports_sequences());
        let hibernate = NextValueRequest::new("hibernate_sequence", 1, 1);
        let orders = NextValueRequest::new("order_seq", 50, 100);

        assert_eq!(dialect.next_value(&hibernate)?, 1);
        assert_eq!(dialect.next_value(&orders)?, 100);
        assert_eq!(dialect.next_value(&hibernate)?, 2);
        assert_eq!(dialect.next_value(&orders)?, 150);
    }
    Ok(())
}

#[test]
fn test_sequence_overflow_is_an_error() -> GridResult<()> {
    for dialect in dialects() {
        let request = NextValueRequest::new("s", 1, i64::MAX);
        let err = dialect.next_value(&request).unwrap_err();
        assert!(
            matches!(err, GridError::Backend(_)),
            "dialect {}: {err}",
            dialect.name()
        );
    }
    Ok(())
}

#[test]
fn test_signed_zero_keys_are_one_row() -> GridResult<()> {
    let readings = Arc::new(EntityKeyMetadata::new("readings", ["offset"]));
    for dialect in dialects() {
        let positive = EntityKey::new(readings.clone(), [Value::Float(0.0)])?;
        let negative = EntityKey::new(readings.clone(), [Value::Float(-0.0)])?;
        assert_eq!(positive, negative);

        dialect.insert_or_update_tuple(&positive, &dialect.create_tuple(&positive)?)?;
        let err = dialect
            .insert_or_update_tuple(&negative, &dialect.create_tuple(&negative)?)
            .unwrap_err();
        assert!(
            matches!(err, GridError::DuplicateKey { .. }),
            "dialect {}: {err}",
            dialect.name()
        );
        assert!(dialect.get_tuple(&negative)?.is_some());
    }
    Ok(())
}

#[test]
fn test_locking_is_unsupported() -> GridResult<()> {
    for dialect in dialects() {
        let key = EntityKey::new(users(), [Value::Int(1)])?;
        let strategy = dialect.get_locking_strategy(&users(), LockMode::PessimisticRead);
        let err = strategy.lock(&key, None, None).unwrap_err();
        assert!(err.to_string().contains("PESSIMISTIC_READ"), "{err}");
    }
    Ok(())
}

#[test]
fn test_association_lifecycle() -> GridResult<()> {
    let meta = Arc::new(
        AssociationKeyMetadata::new("user_roles", ["user_id"], ["user_id", "role"])
            .with_collection_role("User.roles"),
    );

    for dialect in dialects() {
        let owner = EntityKey::new(users(), [Value::Int(1)])?;
        let key = AssociationKey::new(meta.clone(), [Value::Int(1)])?.with_owner(owner);
        assert!(dialect.get_association(&key)?.is_none());
        assert!(!dialect.is_stored_in_entity_structure(&meta));

        let mut association = dialect.create_association(&key)?;
        for role in ["admin", "editor"] {
            let row_key = meta.row_key([Value::Int(1), Value::from(role)])?;
            let row: Tuple = [("user_id", Value::Int(1)), ("role", Value::from(role))]
                .into_iter()
                .collect();
            association.put(row_key, row);
        }
        dialect.insert_or_update_association(&key, &association)?;

        let mut loaded = dialect.get_association(&key)?.unwrap();
        assert_eq!(loaded.len(), 2);
        let editor = meta.row_key([Value::Int(1), Value::from("editor")])?;
        assert_eq!(
            loaded.get(&editor).and_then(|row| row.get("role")),
            Some(&Value::from("editor"))
        );

        loaded.remove(&editor);
        dialect.insert_or_update_association(&key, &loaded)?;
        assert_eq!(dialect.get_association(&key)?.unwrap().len(), 1);

        dialect.remove_association(&key)?;
        assert!(dialect.get_association(&key)?.is_none());
    }
    Ok(())
}

#[test]
fn test_sled_persists_across_reopen() -> GridResult<()> {
    let dir = tempdir()?;
    {
        let dialect = SledDialect::open(dir.path())?;
        insert_user(&dialect, 1, "alice")?;
        insert_user(&dialect, 2, "bob")?;
        dialect.flush()?;
    }

    let dialect = SledDialect::open(dir.path())?;
    assert_eq!(dialect.count("users")?, 2);
    let key = EntityKey::new(users(), [Value::Int(2)])?;
    assert_eq!(
        dialect.get_tuple(&key)?.unwrap().get("name"),
        Some(&Value::from("bob"))
    );
    Ok(())
}

#[test]
fn test_factory_builds_configured_dialect() -> GridResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("grid");
    let config = DialectConfig::new()
        .with(properties::DATASTORE_PROVIDER, "sled")
        .with(properties::SLED_PATH, path.to_string_lossy());

    let dialect = DialectFactory::create(&config)?;
    assert_eq!(dialect.name(), "sled");
    insert_user(dialect.as_ref(), 1, "alice")?;

    let users = users();
    assert_eq!(scan(dialect.as_ref(), &[users.as_ref()])?.len(), 1);

    let memory = DialectFactory::create(&DialectConfig::new())?;
    assert_eq!(memory.name(), "memory");
    Ok(())
}
