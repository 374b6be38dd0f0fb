//! Integration test: delegated invocation through an identity's `execute`.

use ledger_identity::claim::{scheme, ClaimRequest};
use ledger_identity::crypto::hash::key_id;
use ledger_identity::crypto::signing::sign_claim;
use ledger_identity::crypto::Secp256k1KeyPair;
use ledger_identity::error::IdentityError;
use ledger_identity::identity::{Address, ExecutionStatus, KeyType, Purpose};
use ledger_identity::ledger::{Call, CallOutput, Ledger, MAX_CALL_DEPTH};

const KYC: u64 = 1;

/// A ledger with a trusted issuer, both registries, a directory and two
/// users holding valid KYC claims.
struct Setup {
    ledger: Ledger,
    directory: Address,
    user1_eoa: Address,
    user1: Address,
    user2_eoa: Address,
    user2: Address,
}

fn setup() -> Setup {
    let mut ledger = Ledger::new();
    let issuer_eoa = Address([0x10; 20]);
    let services = Address([0x20; 20]);
    let user1_eoa = Address([0x31; 20]);
    let user2_eoa = Address([0x32; 20]);
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
    ledger
        .transact(services, types, Call::AddClaimType { topic: KYC })
        .unwrap();

    let mut users = Vec::new();
    for eoa in [user1_eoa, user2_eoa] {
        let user = ledger.deploy_identity(eoa).unwrap();
        let data = b"kyc passed".to_vec();
        ledger
            .transact(
                eoa,
                user,
                Call::AddClaim(ClaimRequest {
                    topic: KYC,
                    scheme: scheme::ECDSA,
                    issuer,
                    signature: sign_claim(&signer, &user, KYC, &data).unwrap(),
                    data,
                    uri: String::new(),
                }),
            )
            .unwrap();
        users.push(user);
    }

    Setup {
        ledger,
        directory,
        user1_eoa,
        user1: users[0],
        user2_eoa,
        user2: users[1],
    }
}

fn execute(target: Address, value: u128, call: &Call) -> Call {
    Call::Execute {
        target,
        value,
        data: call.encode().unwrap(),
    }
}

#[test]
fn scenario_c_forwarded_registration_matches_direct_call() {
    // Delegated: U1 forwards registerIdentity(1, U2) through its identity.
    let mut delegated = setup();
    let register_u2 = Call::RegisterIdentity {
        id: 1,
        identity: delegated.user2,
    };
    let output = delegated
        .ledger
        .transact(
            delegated.user1_eoa,
            delegated.user1,
            execute(delegated.directory, 0, &register_u2),
        )
        .expect("delegated registration");
    assert_eq!(output, CallOutput::Execution(0));

    // Direct: U2's account calls the directory itself.
    let mut direct = setup();
    let register_u2_direct = Call::RegisterIdentity {
        id: 1,
        identity: direct.user2,
    };
    direct
        .ledger
        .transact(direct.user2_eoa, direct.directory, register_u2_direct)
        .expect("direct registration");

    let delegated_dir = delegated.ledger.directory(&delegated.directory).unwrap();
    let direct_dir = direct.ledger.directory(&direct.directory).unwrap();
    assert_eq!(delegated_dir.identity(1), Some(delegated.user2));
    assert_eq!(direct_dir.identity(1), Some(direct.user2));
    assert_eq!(delegated_dir.len(), direct_dir.len());

    let execution = delegated
        .ledger
        .identity(&delegated.user1)
        .unwrap()
        .executions()
        .get(0)
        .cloned()
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Executed);
    assert_eq!(execution.target, delegated.directory);
    assert_eq!(execution.data, register_u2.encode().unwrap());

    let names: Vec<&str> = delegated
        .ledger
        .events()
        .iter()
        .rev()
        .take(4)
        .map(|r| r.event.name())
        .collect();
    assert_eq!(
        names,
        vec!["Executed", "IdentityRegistered", "Approved", "ExecutionRequested"]
    );
}

#[test]
fn failed_downstream_call_aborts_everything() {
    let mut s = setup();
    s.ledger
        .transact(
            s.user2_eoa,
            s.directory,
            Call::RegisterIdentity {
                id: 7,
                identity: s.user2,
            },
        )
        .unwrap();
    let events_before = s.ledger.events().len();

    let err = s
        .ledger
        .transact(
            s.user1_eoa,
            s.user1,
            execute(
                s.directory,
                0,
                &Call::RegisterIdentity {
                    id: 7,
                    identity: s.user1,
                },
            ),
        )
        .unwrap_err();
    assert!(matches!(err, IdentityError::DuplicateRegistration(_)));
    assert_eq!(s.ledger.events().len(), events_before);
    assert!(s.ledger.identity(&s.user1).unwrap().executions().is_empty());
}

#[test]
fn execute_requires_action_or_management() {
    let mut s = setup();
    let register = Call::RegisterIdentity {
        id: 0,
        identity: s.user1,
    };

    let stranger = Address([0x99; 20]);
    let err = s
        .ledger
        .transact(stranger, s.user1, execute(s.directory, 0, &register))
        .unwrap_err();
    assert!(matches!(err, IdentityError::Unauthorized(_)));

    // A CLAIM key alone may not execute.
    let claimer = Address([0x98; 20]);
    s.ledger
        .transact(
            s.user1_eoa,
            s.user1,
            Call::AddKey {
                key: key_id(&claimer),
                purpose: Purpose::Claim,
                key_type: KeyType::Ecdsa,
            },
        )
        .unwrap();
    assert!(matches!(
        s.ledger
            .transact(claimer, s.user1, execute(s.directory, 0, &register)),
        Err(IdentityError::Unauthorized(_))
    ));

    // An ACTION key may execute against other contracts...
    let actor = Address([0x97; 20]);
    s.ledger
        .transact(
            s.user1_eoa,
            s.user1,
            Call::AddKey {
                key: key_id(&actor),
                purpose: Purpose::Action,
                key_type: KeyType::Ecdsa,
            },
        )
        .unwrap();
    s.ledger
        .transact(actor, s.user1, execute(s.directory, 0, &register))
        .unwrap();
    assert_eq!(s.ledger.directory(&s.directory).unwrap().identity(0), Some(s.user1));

    // ...but not against the identity itself.
    let add_key = Call::AddKey {
        key: key_id(&actor),
        purpose: Purpose::Management,
        key_type: KeyType::Ecdsa,
    };
    assert!(matches!(
        s.ledger.transact(actor, s.user1, execute(s.user1, 0, &add_key)),
        Err(IdentityError::Unauthorized(_))
    ));
}

#[test]
fn management_key_can_execute_on_own_identity() {
    let mut s = setup();
    let new_manager = Address([0x55; 20]);
    let add_key = Call::AddKey {
        key: key_id(&new_manager),
        purpose: Purpose::Management,
        key_type: KeyType::Ecdsa,
    };
    s.ledger
        .transact(s.user1_eoa, s.user1, execute(s.user1, 0, &add_key))
        .unwrap();
    let identity = s.ledger.identity(&s.user1).unwrap();
    assert_eq!(identity.keys().get_keys_by_purpose(Purpose::Management).len(), 2);
    assert_eq!(
        identity.executions().get(0).unwrap().status,
        ExecutionStatus::Executed
    );
}

#[test]
fn value_travels_with_execution() {
    let mut s = setup();
    let payee = Address([0x77; 20]);
    s.ledger.fund(&s.user1_eoa, 100).unwrap();

    s.ledger
        .transact_with_value(
            s.user1_eoa,
            s.user1,
            50,
            Call::Execute {
                target: payee,
                value: 20,
                data: Vec::new(),
            },
        )
        .unwrap();
    assert_eq!(s.ledger.balance(&s.user1_eoa), 50);
    assert_eq!(s.ledger.balance(&s.user1), 30);
    assert_eq!(s.ledger.balance(&payee), 20);

    // Overspending aborts the whole transaction, including the inbound value.
    let err = s
        .ledger
        .transact_with_value(
            s.user1_eoa,
            s.user1,
            10,
            Call::Execute {
                target: payee,
                value: 1_000,
                data: Vec::new(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, IdentityError::CallFailed(_)));
    assert_eq!(s.ledger.balance(&s.user1_eoa), 50);
    assert_eq!(s.ledger.balance(&s.user1), 30);
}

#[test]
fn approve_has_nothing_pending() {
    let mut s = setup();
    s.ledger
        .transact(
            s.user1_eoa,
            s.user1,
            execute(
                s.directory,
                0,
                &Call::RegisterIdentity {
                    id: 0,
                    identity: s.user1,
                },
            ),
        )
        .unwrap();

    assert!(matches!(
        s.ledger.transact(
            s.user1_eoa,
            s.user1,
            Call::Approve {
                execution_id: 0,
                approve: true
            }
        ),
        Err(IdentityError::ExecutionFinalized(0))
    ));
    assert!(matches!(
        s.ledger.transact(
            s.user1_eoa,
            s.user1,
            Call::Approve {
                execution_id: 42,
                approve: true
            }
        ),
        Err(IdentityError::NotFound(_))
    ));
}

#[test]
fn nesting_is_bounded() {
    let mut s = setup();
    let marker = Address([0x66; 20]);
    let inner = Call::AddKey {
        key: key_id(&marker),
        purpose: Purpose::Action,
        key_type: KeyType::Ecdsa,
    };
    let user1 = s.user1;
    let wrap = |levels: usize| {
        let mut call = inner.clone();
        for _ in 0..levels {
            call = execute(user1, 0, &call);
        }
        call
    };

    let too_deep = wrap(MAX_CALL_DEPTH + 1);
    assert!(matches!(
        s.ledger.transact(s.user1_eoa, s.user1, too_deep),
        Err(IdentityError::CallDepthExceeded(_))
    ));

    let deepest = wrap(MAX_CALL_DEPTH);
    s.ledger.transact(s.user1_eoa, s.user1, deepest).unwrap();
    assert!(s
        .ledger
        .identity(&s.user1)
        .unwrap()
        .keys()
        .get_key(&key_id(&marker))
        .is_some());
}

#[test]
fn reentry_into_executing_identity_fails() {
    let mut s = setup();

    // user1 may act on user2's identity.
    s.ledger
        .transact(
            s.user2_eoa,
            s.user2,
            Call::AddKey {
                key: key_id(&s.user1),
                purpose: Purpose::Action,
                key_type: KeyType::Ecdsa,
            },
        )
        .unwrap();

    // user1 → user2.execute → user1.addKey would re-enter user1.
    let back_into_user1 = execute(
        s.user1,
        0,
        &Call::AddKey {
            key: key_id(&Address([0x44; 20])),
            purpose: Purpose::Claim,
            key_type: KeyType::Ecdsa,
        },
    );
    let err = s
        .ledger
        .transact(s.user1_eoa, s.user1, execute(s.user2, 0, &back_into_user1))
        .unwrap_err();
    assert!(matches!(err, IdentityError::CallFailed(_)));
}
