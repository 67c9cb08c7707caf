//! Behavioural properties of the envelope round trip.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use credvault::{encryption_version, CredentialCipher, CredentialError, KeyRing};
use serde_json::Value;

const STRONG_V1: &str = "kP9#vX2$mQ7!tR4&wZ8*yB3@nH6^jL5%";
const STRONG_V2: &str = "Gf4)Ud8(Ks1_Ya0+Ce7=Xi2~Wo9-Tn3<";

fn cipher() -> CredentialCipher {
    CredentialCipher::new(
        KeyRing::new(1)
            .with_secret(1, STRONG_V1)
            .with_secret(2, STRONG_V2),
    )
}

fn to_json(envelope: &str) -> Value {
    serde_json::from_slice(&STANDARD.decode(envelope).unwrap()).unwrap()
}

fn from_json(json: &Value) -> String {
    STANDARD.encode(serde_json::to_vec(json).unwrap())
}

/// Flip the low bit of the first byte of a hex field.
fn flip_hex_field(envelope: &str, field: &str) -> String {
    let mut json = to_json(envelope);
    let mut bytes = hex::decode(json[field].as_str().unwrap()).unwrap();
    bytes[0] ^= 0x01;
    json[field] = Value::String(hex::encode(bytes));
    from_json(&json)
}

#[tokio::test]
async fn round_trips_assorted_inputs_under_each_version() {
    let c = cipher();
    let long = "x".repeat(10_000);
    let inputs = ["sk-abc", "a", "  padded  ", "🔑 ключ 鍵 مفتاح", long.as_str()];
    for version in [1, 2] {
        for input in inputs {
            let envelope = c.encrypt_with_version(input, version).await.unwrap();
            assert_eq!(encryption_version(&envelope), Some(version));
            assert_eq!(c.decrypt(&envelope).await.unwrap(), input);
        }
    }
}

#[tokio::test]
async fn wire_fields_have_expected_shape() {
    let envelope = cipher().encrypt("sk-shape").await.unwrap();
    let json = to_json(&envelope);
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 5);
    assert_eq!(json["version"], 1);
    for field in ["iv", "salt", "tag"] {
        let hex = json[field].as_str().unwrap();
        assert_eq!(hex.len(), 32, "{field}");
        assert!(hex.bytes().all(|b| b.is_ascii_hexdigit()));
    }
    assert_eq!(json["encrypted"].as_str().unwrap().len(), "sk-shape".len() * 2);
}

#[tokio::test]
async fn repeated_encryption_is_non_deterministic() {
    let c = cipher();
    let a = c.encrypt("same input").await.unwrap();
    let b = c.encrypt("same input").await.unwrap();
    assert_ne!(a, b);

    let (ja, jb) = (to_json(&a), to_json(&b));
    assert_ne!(ja["iv"], jb["iv"]);
    assert_ne!(ja["salt"], jb["salt"]);

    assert_eq!(c.decrypt(&a).await.unwrap(), "same input");
    assert_eq!(c.decrypt(&b).await.unwrap(), "same input");
}

#[tokio::test]
async fn tampering_is_detected() {
    let c = cipher();
    let envelope = c.encrypt("sk-do-not-touch").await.unwrap();
    for field in ["tag", "encrypted", "iv", "salt"] {
        let tampered = flip_hex_field(&envelope, field);
        assert!(
            matches!(c.decrypt(&tampered).await, Err(CredentialError::Decryption)),
            "tampered {field} was not rejected"
        );
    }
}

#[tokio::test]
async fn malformed_input_is_invalid_format() {
    let c = cipher();
    assert!(matches!(
        c.decrypt("not-base64-or-json").await,
        Err(CredentialError::InvalidFormat(_))
    ));
    assert!(matches!(c.decrypt("").await, Err(CredentialError::InvalidFormat(_))));

    let envelope = c.encrypt("sk-abc").await.unwrap();
    let mut json = to_json(&envelope);
    json.as_object_mut().unwrap().remove("tag");
    assert!(matches!(
        c.decrypt(&from_json(&json)).await,
        Err(CredentialError::InvalidFormat(_))
    ));
}

#[tokio::test]
async fn rotation_preserves_plaintext() {
    let c = cipher();
    let original = c.encrypt_with_version("sk-rotate", 1).await.unwrap();
    let rotated = c.rotate(&original, 2).await.unwrap();
    assert_eq!(encryption_version(&rotated), Some(2));
    assert_eq!(c.decrypt(&rotated).await.unwrap(), "sk-rotate");
    // The original stays readable; nothing was mutated in place.
    assert_eq!(c.decrypt(&original).await.unwrap(), "sk-rotate");
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let c = cipher();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let c = c.clone();
            tokio::spawn(async move {
                let plaintext = format!("sk-concurrent-{i}");
                let envelope = c.encrypt(&plaintext).await.unwrap();
                (plaintext, c.decrypt(&envelope).await.unwrap())
            })
        })
        .collect();
    for handle in handles {
        let (expected, actual) = handle.await.unwrap();
        assert_eq!(expected, actual);
    }
}
