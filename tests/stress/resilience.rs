//! Resilience tests: corrupted files, wrong passphrases, tampered data.

use ledger_identity::crypto::Secp256k1KeyPair;
use ledger_identity::error::IdentityError;
use ledger_identity::identity::{Address, KeyType, Purpose};
use ledger_identity::ledger::{Call, Ledger};
use ledger_identity::storage::{
    load_ledger, load_signer, read_signer_address, save_ledger, save_signer, Home,
};

const OWNER: Address = Address([0x01; 20]);

fn busy_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    let id = ledger.deploy_identity(OWNER).unwrap();
    for i in 0..5u8 {
        ledger
            .transact(
                OWNER,
                id,
                Call::AddKey {
                    key: Secp256k1KeyPair::generate().key_id(),
                    purpose: if i % 2 == 0 { Purpose::Action } else { Purpose::Claim },
                    key_type: KeyType::Ecdsa,
                },
            )
            .unwrap();
    }
    ledger.fund(&OWNER, 1_000).unwrap();
    ledger.transfer(OWNER, id, 250).unwrap();
    ledger
}

// === Ledger File ===

#[test]
fn resilience_corrupted_ledger_file_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ledger.json");
    save_ledger(&busy_ledger(), &path).unwrap();

    {
        let mut data = std::fs::read(&path).unwrap();
        for item in data.iter_mut().take(50).skip(40) {
            *item ^= 0xFF;
        }
        std::fs::write(&path, data).unwrap();
    }

    assert!(matches!(
        load_ledger(&path),
        Err(IdentityError::InvalidFileFormat(_))
    ));
}

#[test]
fn resilience_truncated_ledger_file_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ledger.json");
    save_ledger(&busy_ledger(), &path).unwrap();

    let data = std::fs::read(&path).unwrap();
    std::fs::write(&path, &data[..data.len() / 2]).unwrap();
    assert!(load_ledger(&path).is_err(), "truncated ledger should fail to load");
}

#[test]
fn resilience_empty_ledger_file_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ledger.json");
    std::fs::write(&path, b"").unwrap();
    assert!(load_ledger(&path).is_err(), "empty file is not an empty ledger");
}

#[test]
fn resilience_unknown_ledger_version_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ledger.json");
    save_ledger(&busy_ledger(), &path).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    json["version"] = serde_json::json!(99);
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    assert!(matches!(
        load_ledger(&path),
        Err(IdentityError::InvalidFileFormat(_))
    ));
}

#[test]
fn resilience_ledger_roundtrip_preserves_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("dir").join("ledger.json");
    let mut ledger = busy_ledger();

    for round in 0..20 {
        save_ledger(&ledger, &path).unwrap();
        let loaded = load_ledger(&path).unwrap();
        assert_eq!(loaded.state(), ledger.state(), "state differs after round {round}");
        assert_eq!(loaded.events(), ledger.events(), "events differ after round {round}");

        // Keep transacting on the reloaded ledger.
        ledger = loaded;
        ledger.transfer(OWNER, Address([0x02; 20]), 1).unwrap();
    }
    assert_eq!(ledger.balance(&Address([0x02; 20])), 20);
}

// === Signer File ===

#[test]
fn resilience_wrong_passphrase_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("alice.key");
    save_signer(&Secp256k1KeyPair::generate(), &path, "correct_password").unwrap();

    let result = load_signer(&path, "wrong_password");
    assert!(
        matches!(result, Err(IdentityError::InvalidPassphrase)),
        "wrong passphrase should fail"
    );
}

#[test]
fn resilience_tampered_ciphertext_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("alice.key");
    save_signer(&Secp256k1KeyPair::generate(), &path, "pass").unwrap();

    let mut json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let other = {
        let scratch = tmp.path().join("other.key");
        save_signer(&Secp256k1KeyPair::generate(), &scratch, "pass").unwrap();
        let other: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&scratch).unwrap()).unwrap();
        other["encrypted_key"].clone()
    };
    json["encrypted_key"] = other;
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    assert!(load_signer(&path, "pass").is_err(), "swapped ciphertext must not open");
}

#[test]
fn resilience_signer_address_mismatch_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("alice.key");
    let key_pair = Secp256k1KeyPair::generate();
    save_signer(&key_pair, &path, "pass").unwrap();

    let mut json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    json["address"] = serde_json::json!(Address([0x42; 20]).to_string());
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    assert_eq!(read_signer_address(&path).unwrap(), Address([0x42; 20]));
    assert!(matches!(
        load_signer(&path, "pass"),
        Err(IdentityError::InvalidFileFormat(_))
    ));
}

#[test]
fn resilience_random_bytes_not_a_signer_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("random.key");
    let random_data: Vec<u8> = (0..1024).map(|i| (i * 17 + 31) as u8).collect();
    std::fs::write(&path, &random_data).unwrap();

    assert!(load_signer(&path, "pass").is_err());
    assert!(read_signer_address(&path).is_err());
}

#[test]
fn resilience_nonexistent_signer_file() {
    let tmp = tempfile::tempdir().unwrap();
    let result = load_signer(&tmp.path().join("missing.key"), "pass");
    assert!(matches!(result, Err(IdentityError::Io(_))));
}

#[test]
fn resilience_home_lists_only_key_files() {
    let tmp = tempfile::tempdir().unwrap();
    let home = Home::new(tmp.path());
    for name in ["zed", "alice"] {
        save_signer(&Secp256k1KeyPair::generate(), &home.signer_path(name), "pass").unwrap();
    }
    std::fs::write(home.signers_dir().join("notes.txt"), b"ignore me").unwrap();
    assert_eq!(home.signer_names().unwrap(), vec!["alice", "zed"]);
}
