use crate::Credential;
use crate::credential::MACAROON_METADATA_KEY;

const SECRET: &str = "0201036c6e6402f801030a10";

/// **VALUE**: Verifies that Debug and Display never print the secret.
///
/// **WHY THIS MATTERS**: The dispatcher logs failed calls with their context. A credential
/// leaking into `{:?}` output would put an admin macaroon into the log file.
///
/// **BUG THIS CATCHES**: Would catch a `#[derive(Debug)]` replacing the manual impl.
#[test]
fn given_credential_when_formatted_then_secret_is_redacted() {
    // GIVEN: A macaroon credential
    let credential = Credential::macaroon(SECRET.to_string());

    // WHEN: Formatting with Debug and Display
    let debug = format!("{credential:?}");
    let display = format!("{credential}");

    // THEN: Neither contains the secret, both name the key
    assert!(!debug.contains(SECRET), "Debug leaked secret: {debug}");
    assert!(!display.contains(SECRET), "Display leaked secret: {display}");
    assert!(debug.contains(MACAROON_METADATA_KEY));
    assert!(display.contains(MACAROON_METADATA_KEY));
}

/// **VALUE**: Verifies that serializing a credential fails instead of emitting the secret.
///
/// **BUG THIS CATCHES**: Would catch a derived `Serialize` that writes the secret into
/// a config file or IPC payload.
#[test]
fn given_credential_when_serialized_then_returns_error() {
    // GIVEN: A credential
    let credential = Credential::new("authorization", SECRET.to_string());

    // WHEN: Serializing it to JSON
    let result = serde_json::to_string(&credential);

    // THEN: Serialization is refused
    let err = result.expect_err("Credential must not serialize");
    assert!(err.to_string().contains("cannot be serialized"));
}

/// **VALUE**: Verifies the accessors hand back exactly what was stored.
#[test]
fn given_credential_when_accessed_then_returns_key_and_secret() {
    // GIVEN: A credential under a custom key
    let credential = Credential::new("x-node-token", SECRET.to_string());

    // THEN: Key, secret and length round out the API
    assert_eq!(credential.key(), "x-node-token");
    assert_eq!(credential.secret(), SECRET);
    assert_eq!(credential.len(), SECRET.len());
    assert!(!credential.is_empty());
}
