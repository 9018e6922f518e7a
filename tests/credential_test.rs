mod common;

use common::*;
use tempfile::TempDir;
use txttoytmusic::{
    error::CredentialError,
    management::{
        CredentialStore,
        credential::{CaptureFlow, CaptureState},
    },
    ytmusic::auth,
};

#[tokio::test]
async fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("headers_auth.json"));

    assert!(matches!(
        store.load().await,
        Err(CredentialError::Missing { .. })
    ));
}

#[tokio::test]
async fn test_load_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "headers_auth.json", "{ not json");
    let store = CredentialStore::new(path);

    assert!(matches!(
        store.load().await,
        Err(CredentialError::Invalid { .. })
    ));
}

#[tokio::test]
async fn test_load_rejects_headers_without_sapisid() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "headers_auth.json",
        r#"{"cookie": "PREF=f6=8", "user-agent": "x"}"#,
    );
    let store = CredentialStore::new(path);

    match store.load().await {
        Err(CredentialError::Invalid { reason, .. }) => assert!(reason.contains("SAPISID")),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_load_normalizes_header_names() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "headers_auth.json",
        r#"{"Cookie": "SAPISID=abc", "X-Goog-AuthUser": "2"}"#,
    );
    let credential = CredentialStore::new(path).load().await.unwrap();

    assert_eq!(credential.header("x-goog-authuser"), Some("2"));
    assert_eq!(credential.cookie("SAPISID"), Some("abc"));
}

#[tokio::test]
async fn test_persist_then_load_keeps_headers() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "seed.json", &credential_json(GOOD_SAPISID));
    let credential = CredentialStore::new(path).load().await.unwrap();

    let target = CredentialStore::new(dir.path().join("nested/dir/headers_auth.json"));
    target.persist(&credential).await.unwrap();

    assert_eq!(target.load().await.unwrap(), credential);
}

#[tokio::test]
async fn test_acquire_uses_valid_stored_credential_without_prompting() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "headers_auth.json", &credential_json(GOOD_SAPISID));
    let state = FakeState::new();
    let mut console = console("");

    let result = CredentialStore::new(path)
        .acquire(&FakeConnector::new(&state), true, false, &mut console)
        .await;

    assert!(result.is_ok());
    assert_eq!(state.probes.get(), 1);
    assert!(console.into_output().is_empty());
}

#[tokio::test]
async fn test_acquire_declined_setup_aborts() {
    let dir = TempDir::new().unwrap();
    let state = FakeState::new();

    let result = CredentialStore::new(dir.path().join("headers_auth.json"))
        .acquire(&FakeConnector::new(&state), true, false, &mut console("n\n"))
        .await;

    assert!(matches!(result, Err(CredentialError::CaptureAborted(_))));
}

#[tokio::test]
async fn test_capture_recovers_after_bad_paste_and_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("headers_auth.json");
    let state = FakeState::new();

    // accept the default "y", then an unusable paste, then good headers
    let input = format!(
        "\ncookie: PREF=1\nuser-agent: x\n\n{}",
        raw_headers(GOOD_SAPISID)
    );
    let mut console = console(&input);
    let store = CredentialStore::new(&path);

    let (credential, _) = store
        .acquire(&FakeConnector::new(&state), true, false, &mut console)
        .await
        .unwrap();

    assert_eq!(credential.cookie("SAPISID"), Some(GOOD_SAPISID));
    assert_eq!(store.load().await.unwrap(), credential);

    let output = String::from_utf8(console.into_output()).unwrap();
    assert!(output.contains("Attempt 1/3"));
    assert!(output.contains("Attempt 2/3"));
    assert!(output.contains("created successfully"));
}

#[tokio::test]
async fn test_capture_gives_up_after_bounded_attempts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("headers_auth.json");
    let state = FakeState::new();

    let rejected = raw_headers("bad");
    let input = format!("y\n{0}{0}{0}{0}", rejected);
    let store = CredentialStore::new(&path);

    let result = store
        .acquire(&FakeConnector::new(&state), true, false, &mut console(&input))
        .await;

    match result {
        Err(CredentialError::CaptureAborted(reason)) => assert!(reason.contains("3 attempts")),
        other => panic!("unexpected: {:?}", other.map(|(c, _)| c)),
    }
    assert_eq!(state.probes.get(), 3);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_capture_state_transitions() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("headers_auth.json"));
    let state = FakeState::new();
    let connector = FakeConnector::new(&state);
    let flow = CaptureFlow::new(&store, &connector, 3);
    let mut console = console(&raw_headers(GOOD_SAPISID));

    let awaiting = flow.initial_state();
    assert!(matches!(awaiting, CaptureState::AwaitingInput { attempt: 1 }));

    let validating = flow.advance(awaiting, &mut console).await.unwrap();
    assert!(matches!(
        validating,
        CaptureState::Validating { attempt: 1, .. }
    ));

    let persisted = flow.advance(validating, &mut console).await.unwrap();
    assert!(matches!(persisted, CaptureState::Persisted { .. }));
    assert!(persisted.is_terminal());
    assert!(store.path().exists());

    let unchanged = flow.advance(persisted, &mut console).await.unwrap();
    assert!(matches!(unchanged, CaptureState::Persisted { .. }));
}

#[tokio::test]
async fn test_capture_aborts_on_empty_input() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("headers_auth.json"));
    let state = FakeState::new();
    let connector = FakeConnector::new(&state);
    let flow = CaptureFlow::new(&store, &connector, 3);

    let next = flow
        .advance(flow.initial_state(), &mut console(""))
        .await
        .unwrap();

    match next {
        CaptureState::Aborted { reason } => assert_eq!(reason, "no headers entered"),
        _ => panic!("expected aborted state"),
    }
}

#[tokio::test]
async fn test_non_interactive_acquire_never_prompts() {
    let dir = TempDir::new().unwrap();
    let state = FakeState::new();
    let mut console = console("y\n");

    let result = CredentialStore::new(dir.path().join("headers_auth.json"))
        .acquire(&FakeConnector::new(&state), false, false, &mut console)
        .await;

    assert!(matches!(result, Err(CredentialError::Missing { .. })));
    assert!(console.into_output().is_empty());
}

#[tokio::test]
async fn test_broken_output_after_rejected_probe_aborts() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("headers_auth.json"));
    let state = FakeState::new();
    let connector = FakeConnector::new(&state);
    let flow = CaptureFlow::new(&store, &connector, 3);
    let credential = auth::parse_raw_headers(&raw_headers("bad")).unwrap();

    let result = flow
        .advance(
            CaptureState::Validating {
                attempt: 1,
                credential,
            },
            &mut failing_console("", "rejected these headers"),
        )
        .await;

    assert!(matches!(result, Err(CredentialError::CaptureAborted(_))));
    assert_eq!(state.probes.get(), 1);
}

#[tokio::test]
async fn test_broken_output_after_unusable_paste_ends_capture() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join("headers_auth.json"));
    let state = FakeState::new();
    let connector = FakeConnector::new(&state);
    let flow = CaptureFlow::new(&store, &connector, 3);

    let next = flow
        .advance(
            flow.initial_state(),
            &mut failing_console("cookie: PREF=1\n\n", "Could not use"),
        )
        .await
        .unwrap();

    assert!(matches!(next, CaptureState::Aborted { .. }));
}
