//! Process lifecycle: spawn failures, crashes and termination.
#![cfg(unix)]

use groonga_stdio::{ClientError, ClientOptions, GroongaClient};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("groonga");
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
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
async fn test_invalid_groonga_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("!!!groonga!!!");
    let client = GroongaClient::spawn(
        dir.path().join("test.db"),
        ClientOptions::default().with_groonga_path(&missing),
    );

    assert!(!client.is_alive());
    assert_eq!(client.pid(), None);
    match client.last_error() {
        Some(ClientError::SpawnFailed { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected spawn failure, got {other:?}"),
    }

    let err = client.command("status").await.unwrap_err();
    assert!(matches!(err, ClientError::AlreadyEnded));
    assert_eq!(err.to_string(), "groonga already ended");
}

#[tokio::test]
async fn test_exit_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "#!/bin/sh\necho 'cannot open database' >&2\nexit 3\n",
    );
    let client = GroongaClient::spawn(
        dir.path().join("test.db"),
        ClientOptions::default().with_groonga_path(script),
    );

    wait_until_dead(&client).await;
    let err = client.last_error().expect("exit should be recorded");
    match &err {
        ClientError::ProcessExited { code, diagnostic } => {
            assert_eq!(*code, Some(3));
            assert_eq!(diagnostic.as_deref(), Some("cannot open database"));
        }
        other => panic!("expected process exit, got {other:?}"),
    }
    assert_eq!(err.to_string(), "[exit code: 3] cannot open database");
    assert!(err.is_process_gone());

    assert!(matches!(
        client.command("status").await,
        Err(ClientError::AlreadyEnded)
    ));
}

#[tokio::test]
async fn test_clean_exit_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "#!/bin/sh\nexit 0\n");
    let client = GroongaClient::spawn(
        dir.path().join("test.db"),
        ClientOptions::default().with_groonga_path(script),
    );

    wait_until_dead(&client).await;
    assert!(client.last_error().is_none());
}

#[tokio::test]
async fn test_terminate() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "#!/bin/sh\nexec cat > /dev/null\n");
    let client = GroongaClient::spawn(
        dir.path().join("test.db"),
        ClientOptions::default().with_groonga_path(script),
    );
    assert!(client.is_alive());

    assert!(client.terminate());
    assert!(!client.is_alive());
    assert!(!client.terminate());

    // A requested kill is not an error.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(client.last_error().is_none());
    assert!(matches!(
        client.command("status").await,
        Err(ClientError::AlreadyEnded)
    ));
}
