//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn master_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("master").await.unwrap();

    tenantgate_db::run_master_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(
        info_str.contains("tenant_connection"),
        "missing tenant_connection table"
    );
    assert!(info_str.contains("master_user"), "missing master_user table");
    assert!(info_str.contains("http_session"), "missing http_session table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn master_migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("master").await.unwrap();

    tenantgate_db::run_master_migrations(&db).await.unwrap();
    tenantgate_db::run_master_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn tenant_migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("tenants").use_db("acme").await.unwrap();

    tenantgate_db::run_tenant_migrations(&db).await.unwrap();
    tenantgate_db::run_tenant_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn unique_index_prevents_duplicate_identifiers() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("master").await.unwrap();

    tenantgate_db::run_master_migrations(&db).await.unwrap();

    db.query(
        "CREATE tenant_connection SET \
         subdomain_identifier = 'acme', \
         connection_descriptor = 'endpoint=mem:// ns=tenants db=acme'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let result = db
        .query(
            "CREATE tenant_connection SET \
             subdomain_identifier = 'acme', \
             connection_descriptor = 'endpoint=mem:// ns=tenants db=acme2'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate identifier should be rejected");
}

#[tokio::test]
async fn empty_descriptor_is_rejected_by_schema() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("master").await.unwrap();

    tenantgate_db::run_master_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE tenant_connection SET \
             subdomain_identifier = 'acme', \
             connection_descriptor = '   '",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "blank descriptor should be rejected");
}
