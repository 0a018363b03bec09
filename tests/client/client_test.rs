//! End-to-end client tests against a scripted stand-in for groonga.
#![cfg(unix)]

use futures::future::join_all;
use groonga_stdio::config::Settings;
use groonga_stdio::{ClientError, ClientOptions, Command, GroongaClient, Response};
use serde_json::json;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Answers like groonga does: one envelope per command line, no
/// terminator. Records its arguments and any load payload next to itself.
const FAKE_GROONGA: &str = r#"#!/bin/sh
dir=$(dirname "$0")
printf '%s\n' "$@" > "$dir/args"
while IFS= read -r line; do
  case "$line" in
    *msgpack*) printf '\222\001\002' ;;
    status*) printf '[[0,1.0,0.001],{"version":"fake"}]' ;;
    "table_create") printf '[[-22,1.0,0.0,"[table][create] should not create anonymous table"],false]' ;;
    table_create*|column_create*) printf '[[0,1.0,0.0],true]' ;;
    load*)
      IFS= read -r values
      printf '%s\n' "$values" > "$dir/loaded"
      printf '[[0,1.0,0.0],2]' ;;
    dump*) printf 'table_create People TABLE_HASH_KEY ShortText\ncolumn_create People age COLUMN_SCALAR Int32\n' ;;
    "select --table "*) printf '[[0,1.0,0.0],"%s"]' "${line#select --table }" ;;
    quit*) printf '[[0,1.0,0.0],true]'; exit 0 ;;
    *) printf '[[-22,1.0,0.0,"unknown command"],false]' ;;
  esac
done
"#;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("groonga");
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn fake_client(options: ClientOptions) -> (TempDir, GroongaClient) {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), FAKE_GROONGA);
    let client = GroongaClient::spawn(
        dir.path().join("db").join("test.db"),
        options.with_groonga_path(script),
    );
    (dir, client)
}

async fn wait_until_dead(client: &GroongaClient) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while client.is_alive() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("groonga did not exit");
}

#[tokio::test]
async fn test_status_returns_body() {
    let (_dir, client) = fake_client(ClientOptions::default());
    assert!(client.is_alive());
    assert!(client.pid().is_some());

    let response = client.command("status").await.unwrap();
    assert_eq!(response, Response::Json(json!({"version": "fake"})));
}

#[tokio::test]
async fn test_table_create_and_column_create() {
    let (_dir, client) = fake_client(ClientOptions::default());
    let table = client.command("table_create People TABLE_HASH_KEY ShortText");
    let column = client.command("column_create People age COLUMN_SCALAR Int32");
    assert_eq!(table.await.unwrap(), Response::Json(json!(true)));
    assert_eq!(column.await.unwrap(), Response::Json(json!(true)));
}

#[tokio::test]
async fn test_error_envelope() {
    let (_dir, client) = fake_client(ClientOptions::default());
    let err = client.command("table_create").await.unwrap_err();
    assert_eq!(err.return_code(), Some(-22));
    match &err {
        ClientError::Protocol(e) => {
            assert_eq!(e.message, "[table][create] should not create anonymous table");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert_eq!(err.response().unwrap()[1], json!(false));

    // The client keeps working after a failed command.
    assert!(client.command("status").await.is_ok());
}

#[tokio::test]
async fn test_load_sends_values_on_second_line() {
    let (dir, client) = fake_client(ClientOptions::default());
    let response = client
        .command_with(
            "load --table People",
            [("values", json!([{"value": 1}, {"value": 2}]))],
        )
        .await
        .unwrap();
    assert_eq!(response, Response::Json(json!(2)));

    let loaded = fs::read_to_string(dir.path().join("loaded")).unwrap();
    assert_eq!(loaded, "[{\"value\":1},{\"value\":2}]\n");
}

#[tokio::test]
async fn test_dump_is_text() {
    let (_dir, client) = fake_client(ClientOptions::default());
    let response = client.command("dump").await.unwrap();
    assert_eq!(
        response.as_text(),
        Some(
            "table_create People TABLE_HASH_KEY ShortText\n\
             column_create People age COLUMN_SCALAR Int32\n"
        )
    );
}

#[tokio::test]
async fn test_msgpack_is_passed_through() {
    let (_dir, client) = fake_client(ClientOptions::default());
    let response = client
        .command("select People --output_type msgpack")
        .await
        .unwrap();
    assert!(response.is_binary());
    assert_eq!(response.as_bytes(), Some(&[0x92_u8, 0x01, 0x02][..]));
}

#[tokio::test]
async fn test_results_follow_submission_order() {
    let (_dir, client) = fake_client(ClientOptions::default());
    let other = client.clone();

    let pending = vec![
        client.command("select Alpha"),
        other.command("select Beta"),
        client.send(Command::new("select").with_argument("table", "Gamma")),
    ];
    assert_eq!(client.pending(), 3);

    let results: Vec<_> = join_all(pending)
        .await
        .into_iter()
        .map(|r| r.unwrap().into_json().unwrap())
        .collect();
    assert_eq!(results, vec![json!("Alpha"), json!("Beta"), json!("Gamma")]);
    assert_eq!(client.pending(), 0);
}

#[tokio::test]
async fn test_create_flag_for_missing_database() {
    let (dir, client) = fake_client(ClientOptions::default());
    client.command("status").await.unwrap();

    let db = dir.path().join("db").join("test.db");
    let args = fs::read_to_string(dir.path().join("args")).unwrap();
    assert_eq!(args, format!("-n\n{}\n", db.display()));
}

#[tokio::test]
async fn test_open_only_never_creates() {
    let (dir, client) = fake_client(ClientOptions::default().with_open_only(true));
    client.command("status").await.unwrap();

    let db = dir.path().join("db").join("test.db");
    let args = fs::read_to_string(dir.path().join("args")).unwrap();
    assert_eq!(args, format!("{}\n", db.display()));
}

#[tokio::test]
async fn test_existing_database_is_opened() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), FAKE_GROONGA);
    let db = dir.path().join("existing.db");
    fs::write(&db, b"").unwrap();

    let client = GroongaClient::spawn(&db, ClientOptions::default().with_groonga_path(script));
    client.command("status").await.unwrap();

    let args = fs::read_to_string(dir.path().join("args")).unwrap();
    assert_eq!(args, format!("{}\n", db.display()));
}

#[tokio::test]
async fn test_commands_after_exit_fail() {
    let (_dir, client) = fake_client(ClientOptions::default());
    assert_eq!(client.command("quit").await.unwrap(), Response::Json(json!(true)));

    wait_until_dead(&client).await;
    assert!(client.last_error().is_none());
    assert!(matches!(
        client.command("status").await,
        Err(ClientError::AlreadyEnded)
    ));
}

#[tokio::test]
async fn test_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), FAKE_GROONGA);
    let config = dir.path().join("groonga-stdio.toml");
    fs::write(
        &config,
        format!(
            "[client]\ngroonga_path = \"{}\"\nread_interval = \"500ms\"\ntimeout = \"1m\"\n",
            script.display()
        ),
    )
    .unwrap();

    let settings = Settings::from_file(&config).unwrap();
    let client = GroongaClient::from_settings(dir.path().join("test.db"), &settings).unwrap();
    assert_eq!(client.options().read_interval(), Duration::from_millis(500));
    assert_eq!(client.options().effective_timeout(), Duration::from_secs(60));

    let response = client.command("status").await.unwrap();
    assert_eq!(response, Response::Json(json!({"version": "fake"})));
}
