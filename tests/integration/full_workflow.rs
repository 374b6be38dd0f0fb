//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Deploy an issuer identity and give it a claim signer key
//! 2. Deploy the trust registries and the identity directory
//! 3. Deploy user identities
//! 4. Issuer signs claims off-ledger; users add them to their identities
//! 5. Registration fails until the issuer and topic are trusted
//! 6. Users register through their own identities

use ledger_identity::claim::{scheme, ClaimHolder, ClaimId, ClaimRequest};
use ledger_identity::crypto::signing::sign_claim;
use ledger_identity::crypto::Secp256k1KeyPair;
use ledger_identity::error::IdentityError;
use ledger_identity::identity::{Address, KeyType, Purpose};
use ledger_identity::ledger::{Call, CallOutput, Event, Ledger};

const KYC: u64 = 1;

fn add_claim_call(
    signer: &Secp256k1KeyPair,
    issuer: Address,
    subject: Address,
    text: &str,
) -> Call {
    Call::AddClaim(ClaimRequest {
        topic: KYC,
        scheme: scheme::ECDSA,
        issuer,
        signature: sign_claim(signer, &subject, KYC, text.as_bytes()).expect("signing"),
        data: text.as_bytes().to_vec(),
        uri: "https://decentralized-twitter.example".to_string(),
    })
}

#[test]
fn full_workflow_claim_to_registration() {
    let mut ledger = Ledger::new();
    let issuer_eoa = Secp256k1KeyPair::generate().address();
    let services_eoa = Secp256k1KeyPair::generate().address();
    let user1_eoa = Secp256k1KeyPair::generate().address();
    let user2_eoa = Secp256k1KeyPair::generate().address();
    let claim_signer = Secp256k1KeyPair::generate();

    // ── Step 1: Issuer identity with a claim signer key ─────────────────
    let issuer = ledger.deploy_identity(issuer_eoa).expect("deploy issuer");
    ledger
        .transact(
            issuer_eoa,
            issuer,
            Call::AddKey {
                key: claim_signer.key_id(),
                purpose: Purpose::Claim,
                key_type: KeyType::Ecdsa,
            },
        )
        .expect("issuer adds signer key");
    assert!(ledger
        .identity(&issuer)
        .unwrap()
        .keys()
        .get_keys_by_purpose(Purpose::Claim)
        .contains(&claim_signer.key_id()));

    // ── Step 2: Registries and directory ────────────────────────────────
    let trusted_issuers = ledger
        .deploy_trusted_issuer_registry(services_eoa)
        .expect("deploy issuer registry");
    let claim_types = ledger
        .deploy_claim_type_registry(services_eoa)
        .expect("deploy claim type registry");
    let directory = ledger
        .deploy_identity_directory(services_eoa, trusted_issuers, claim_types)
        .expect("deploy directory");

    // ── Step 3: User identities ─────────────────────────────────────────
    let user1 = ledger.deploy_identity(user1_eoa).expect("deploy user1");
    let user2 = ledger.deploy_identity(user2_eoa).expect("deploy user2");
    assert_ne!(user1, user2);

    // ── Step 4: Claims signed by the issuer, added by the users ─────────
    let text1 = "This is Claim for User 1, signed by Twitter";
    let output = ledger
        .transact(user1_eoa, user1, add_claim_call(&claim_signer, issuer, user1, text1))
        .expect("user1 adds claim");
    let expected_id = ClaimId::derive(&issuer, KYC);
    assert_eq!(output, CallOutput::Claim(expected_id));

    let stored = ledger
        .identity(&user1)
        .unwrap()
        .get_claim(&expected_id)
        .expect("claim stored")
        .clone();
    assert_eq!(stored.topic, KYC);
    assert_eq!(stored.scheme, scheme::ECDSA);
    assert_eq!(stored.issuer, issuer);
    assert_eq!(stored.data, text1.as_bytes());
    assert_eq!(stored.uri, "https://decentralized-twitter.example");
    assert_eq!(
        ledger.identity(&user1).unwrap().get_claim_ids_by_topic(KYC),
        vec![expected_id]
    );

    ledger
        .transact(
            user2_eoa,
            user2,
            add_claim_call(
                &claim_signer,
                issuer,
                user2,
                "This is Claim for User 2, signed by Twitter",
            ),
        )
        .expect("user2 adds claim");

    // ── Step 5: Registration is gated on trust ──────────────────────────
    let register_user1 = Call::RegisterIdentity {
        id: 0,
        identity: user1,
    };
    let err = ledger
        .transact(user1_eoa, directory, register_user1.clone())
        .unwrap_err();
    assert!(matches!(err, IdentityError::UntrustedClaim { .. }));
    assert_eq!(ledger.directory(&directory).unwrap().identity(0), None);

    let verification = ledger.is_verified(&directory, &user1).unwrap();
    assert!(!verification.is_verified);
    assert_eq!(verification.rejections.len(), 1);

    ledger
        .transact(
            services_eoa,
            trusted_issuers,
            Call::AddTrustedIssuer {
                issuer,
                topics: vec![KYC],
            },
        )
        .expect("trust issuer");
    ledger
        .transact(services_eoa, claim_types, Call::AddClaimType { topic: KYC })
        .expect("add claim type");
    assert!(ledger.is_verified(&directory, &user1).unwrap().is_verified);

    // ── Step 6: Register through the identities themselves ──────────────
    let output = ledger
        .transact(
            user1_eoa,
            user1,
            Call::Execute {
                target: directory,
                value: 0,
                data: register_user1.encode().unwrap(),
            },
        )
        .expect("user1 registers via execute");
    assert_eq!(output, CallOutput::Execution(0));
    assert_eq!(ledger.directory(&directory).unwrap().identity(0), Some(user1));

    let register_user2 = Call::RegisterIdentity {
        id: 1,
        identity: user2,
    };
    ledger
        .transact(
            user2_eoa,
            user2,
            Call::Execute {
                target: directory,
                value: 0,
                data: register_user2.encode().unwrap(),
            },
        )
        .expect("user2 registers via execute");
    assert_eq!(ledger.directory(&directory).unwrap().identity(1), Some(user2));

    // Second registration of an occupied id fails and keeps the first mapping.
    let err = ledger
        .transact(
            user2_eoa,
            directory,
            Call::RegisterIdentity {
                id: 0,
                identity: user2,
            },
        )
        .unwrap_err();
    assert!(matches!(err, IdentityError::DuplicateRegistration(_)));
    assert_eq!(ledger.directory(&directory).unwrap().identity(0), Some(user1));

    // The event log tells the whole story.
    let registered: Vec<_> = ledger
        .events()
        .iter()
        .filter_map(|r| match &r.event {
            Event::IdentityRegistered { id, identity } => Some((*id, *identity)),
            _ => None,
        })
        .collect();
    assert_eq!(registered, vec![(0, user1), (1, user2)]);
}

#[test]
fn scenario_a_claim_signed_by_issuer_claim_key() {
    let mut ledger = Ledger::new();
    let issuer_eoa = Address([0x11; 20]);
    let user_eoa = Address([0x22; 20]);
    let signer = Secp256k1KeyPair::generate();

    let issuer = ledger.deploy_identity(issuer_eoa).unwrap();
    ledger
        .transact(
            issuer_eoa,
            issuer,
            Call::AddKey {
                key: signer.key_id(),
                purpose: Purpose::Claim,
                key_type: KeyType::Ecdsa,
            },
        )
        .unwrap();
    let user = ledger.deploy_identity(user_eoa).unwrap();

    ledger
        .transact(user_eoa, user, add_claim_call(&signer, issuer, user, "kyc ok"))
        .unwrap();
    let claim = ledger
        .identity(&user)
        .unwrap()
        .get_claim(&ClaimId::derive(&issuer, KYC))
        .cloned()
        .expect("claim present");
    assert_eq!(claim.data, b"kyc ok");
    assert_eq!(claim.issuer, issuer);
}

#[test]
fn scenario_b_registration_after_trust() {
    let mut ledger = Ledger::new();
    let issuer_eoa = Address([0x11; 20]);
    let services = Address([0x33; 20]);
    let user_eoa = Address([0x22; 20]);
    let signer = Secp256k1KeyPair::generate();

    let issuer = ledger.deploy_identity(issuer_eoa).unwrap();
    ledger
        .transact(
            issuer_eoa,
            issuer,
            Call::AddKey {
                key: signer.key_id(),
                purpose: Purpose::Claim,
                key_type: KeyType::Ecdsa,
            },
        )
        .unwrap();
    let trusted = ledger.deploy_trusted_issuer_registry(services).unwrap();
    let types = ledger.deploy_claim_type_registry(services).unwrap();
    let directory = ledger
        .deploy_identity_directory(services, trusted, types)
        .unwrap();
    let user = ledger.deploy_identity(user_eoa).unwrap();
    ledger
        .transact(user_eoa, user, add_claim_call(&signer, issuer, user, "kyc ok"))
        .unwrap();

    let register = Call::RegisterIdentity {
        id: 0,
        identity: user,
    };
    assert!(matches!(
        ledger.transact(user_eoa, directory, register.clone()),
        Err(IdentityError::UntrustedClaim { .. })
    ));

    // Trusting the issuer alone is not enough: the topic must be recognized.
    ledger
        .transact(
            services,
            trusted,
            Call::AddTrustedIssuer {
                issuer,
                topics: vec![KYC],
            },
        )
        .unwrap();
    assert!(matches!(
        ledger.transact(user_eoa, directory, register.clone()),
        Err(IdentityError::UntrustedClaim { .. })
    ));

    ledger
        .transact(services, types, Call::AddClaimType { topic: KYC })
        .unwrap();
    ledger.transact(user_eoa, directory, register).unwrap();
    assert_eq!(ledger.directory(&directory).unwrap().identity(0), Some(user));
}
