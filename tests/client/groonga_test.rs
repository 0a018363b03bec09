//! Tests against a real groonga installation.
//!
//! Run with `cargo test --test groonga_test -- --ignored`. The executable is
//! found through `GROONGA_PATH` (a prefix holding `bin/groonga`) or `PATH`.

use groonga_stdio::config::Settings;
use groonga_stdio::{ClientError, GroongaClient};
use serde_json::json;
use tempfile::TempDir;

fn client() -> (TempDir, GroongaClient) {
    let dir = tempfile::tempdir().unwrap();
    let options = Settings::default().client_options().unwrap();
    let client = GroongaClient::spawn(dir.path().join("test.db"), options);
    (dir, client)
}

#[tokio::test]
#[ignore = "requires groonga"]
async fn test_status() {
    let (_dir, client) = client();
    let status = client.command("status").await.unwrap();
    assert!(status.as_json().unwrap().is_object());
}

#[tokio::test]
#[ignore = "requires groonga"]
async fn test_table_create_without_name() {
    let (_dir, client) = client();
    let err = client.command("table_create").await.unwrap_err();
    match err {
        ClientError::Protocol(e) => {
            assert!(e.return_code < 0);
            assert!(!e.message.is_empty());
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires groonga"]
async fn test_load_command_version_3() {
    let (_dir, client) = client();
    let created = client.command("table_create Memos TABLE_NO_KEY").await.unwrap();
    assert_eq!(created.into_json(), Some(json!(true)));
    client
        .command("column_create Memos value COLUMN_SCALAR Int32")
        .await
        .unwrap();

    let loaded = client
        .command_with(
            "load --table Memos --command_version 3",
            [("values", json!([{"value": 1}, {"value": 2}]))],
        )
        .await
        .unwrap();
    assert_eq!(loaded.into_json(), Some(json!({"n_loaded_records": 2})));
}

#[tokio::test]
#[ignore = "requires groonga"]
async fn test_dump() {
    let (_dir, client) = client();
    client
        .command("table_create People TABLE_HASH_KEY ShortText")
        .await
        .unwrap();
    let dump = client.command("dump").await.unwrap();
    assert_eq!(
        dump.as_text().map(str::trim),
        Some("table_create People TABLE_HASH_KEY ShortText")
    );
}

#[tokio::test]
#[ignore = "requires groonga"]
async fn test_msgpack_output() {
    let (_dir, client) = client();
    client.command("table_create Memos TABLE_NO_KEY").await.unwrap();
    let response = client
        .command("select Memos --output_type msgpack")
        .await
        .unwrap();
    assert!(response.as_bytes().is_some_and(|b| !b.is_empty()));
}
