//! Stress test: heavy add / replace / remove traffic on one claim store.

use ledger_identity::claim::{scheme, ClaimHolder, ClaimId, ClaimRequest};
use ledger_identity::crypto::signing::sign_claim;
use ledger_identity::crypto::Secp256k1KeyPair;
use ledger_identity::identity::{Address, KeyType, Purpose};
use ledger_identity::ledger::{Call, CallOutput, Event, Ledger};

const TOPICS: u64 = 10;

fn self_claim(subject: Address, topic: u64, round: usize) -> Call {
    Call::AddClaim(ClaimRequest {
        topic,
        scheme: scheme::ECDSA,
        issuer: subject,
        signature: Vec::new(),
        data: format!("round {round}").into_bytes(),
        uri: format!("https://claims.example/{topic}/{round}"),
    })
}

#[test]
fn stress_1000_claim_upserts_keep_one_claim_per_topic() {
    let owner = Address([0x01; 20]);
    let mut ledger = Ledger::new();
    let subject = ledger.deploy_identity(owner).unwrap();

    for round in 0..1000 {
        let topic = round as u64 % TOPICS;
        let output = ledger
            .transact(owner, subject, self_claim(subject, topic, round))
            .unwrap();
        assert_eq!(output, CallOutput::Claim(ClaimId::derive(&subject, topic)));
    }

    let identity = ledger.identity(&subject).unwrap();
    assert_eq!(identity.claim_store().len(), TOPICS as usize);
    for topic in 0..TOPICS {
        let ids = identity.get_claim_ids_by_topic(topic);
        assert_eq!(ids, vec![ClaimId::derive(&subject, topic)]);
        let claim = identity.get_claim(&ids[0]).unwrap();
        // The last write for each topic wins.
        let last_round = 990 + topic as usize;
        assert_eq!(claim.data, format!("round {last_round}").into_bytes());
    }

    let (added, changed) = ledger.events().iter().fold((0, 0), |(a, c), r| match r.event {
        Event::ClaimAdded { .. } => (a + 1, c),
        Event::ClaimChanged { .. } => (a, c + 1),
        _ => (a, c),
    });
    assert_eq!(added, TOPICS as usize);
    assert_eq!(changed, 1000 - TOPICS as usize);
}

#[test]
fn stress_add_remove_cycles_leave_indexes_clean() {
    let owner = Address([0x01; 20]);
    let mut ledger = Ledger::new();
    let subject = ledger.deploy_identity(owner).unwrap();

    for round in 0..200 {
        let topic = round as u64 % TOPICS;
        ledger
            .transact(owner, subject, self_claim(subject, topic, round))
            .unwrap();
        ledger
            .transact(
                owner,
                subject,
                Call::RemoveClaim {
                    claim_id: ClaimId::derive(&subject, topic),
                },
            )
            .unwrap();
    }

    let identity = ledger.identity(&subject).unwrap();
    assert!(identity.claim_store().is_empty());
    assert!(identity.claims().is_empty());
    for topic in 0..TOPICS {
        assert!(identity.get_claim_ids_by_topic(topic).is_empty());
    }

    // Removing again is an error and commits nothing.
    let before = ledger.events().len();
    assert!(ledger
        .transact(
            owner,
            subject,
            Call::RemoveClaim {
                claim_id: ClaimId::derive(&subject, 0),
            },
        )
        .is_err());
    assert_eq!(ledger.events().len(), before);
}

#[test]
fn stress_many_issuers_share_a_topic() {
    let owner = Address([0x01; 20]);
    let mut ledger = Ledger::new();
    let subject = ledger.deploy_identity(owner).unwrap();
    let topic = 7;

    let mut expected = Vec::new();
    for i in 0..25u8 {
        let issuer_eoa = Address([0x80 + i; 20]);
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
        let data = vec![i; 8];
        ledger
            .transact(
                owner,
                subject,
                Call::AddClaim(ClaimRequest {
                    topic,
                    scheme: scheme::ECDSA,
                    issuer,
                    signature: sign_claim(&signer, &subject, topic, &data).unwrap(),
                    data,
                    uri: String::new(),
                }),
            )
            .unwrap();
        expected.push(ClaimId::derive(&issuer, topic));
    }

    let identity = ledger.identity(&subject).unwrap();
    assert_eq!(identity.get_claim_ids_by_topic(topic), expected);

    // Drop every other issuer's claim; insertion order of the rest holds.
    for id in expected.iter().step_by(2) {
        ledger
            .transact(owner, subject, Call::RemoveClaim { claim_id: *id })
            .unwrap();
    }
    let remaining: Vec<ClaimId> = expected.iter().skip(1).step_by(2).copied().collect();
    assert_eq!(
        ledger.identity(&subject).unwrap().get_claim_ids_by_topic(topic),
        remaining
    );
}
