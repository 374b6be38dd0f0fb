//! ledger-identity CLI: the `lid` command.
//!
//! Drives a local ledger snapshot: manage signer keys, deploy identities and
//! registries, attach claims, and register identities in a directory.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use ledger_identity::claim::{scheme, ClaimHolder, ClaimId, ClaimRequest};
use ledger_identity::crypto::hash::key_id;
use ledger_identity::crypto::signing::sign_claim;
use ledger_identity::crypto::Secp256k1KeyPair;
use ledger_identity::hexbytes::{parse_bytes, to_prefixed};
use ledger_identity::identity::{Address, KeyId, KeyType, Purpose};
use ledger_identity::ledger::{Call, CallOutput, EventRecord, Ledger};
use ledger_identity::storage::{
    load_ledger, load_signer, read_signer_address, save_ledger, save_signer, Home,
};
use ledger_identity::time::format_micros;

const HOME_ENV: &str = "LEDGER_IDENTITY_HOME";
const PASSPHRASE_ENV: &str = "LID_PASSPHRASE";

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| anyhow!("HOME not set; pass --home"))?;
    Ok(PathBuf::from(home).join(".ledger-identity"))
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

/// Read a passphrase from `LID_PASSPHRASE`, or from stdin after a prompt.
fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV) {
        return Ok(passphrase);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

// ── Formatting helpers ────────────────────────────────────────────────────────

fn print_event(record: &EventRecord, verbose: bool) {
    println!(
        "  #{:<5} {}  {}  {}",
        record.sequence,
        format_micros(record.timestamp),
        record.contract,
        record.event.name()
    );
    if verbose {
        if let Ok(detail) = serde_json::to_string(&record.event) {
            println!("         {detail}");
        }
    }
}

/// A key given either as the address holding it or as a raw key id.
fn parse_key(s: &str) -> Result<KeyId> {
    if let Ok(address) = s.parse::<Address>() {
        return Ok(key_id(&address));
    }
    s.parse::<KeyId>()
        .map_err(|e| anyhow!("invalid key '{s}' (expected an address or a 32-byte key id): {e}"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// ledger-identity CLI: self-sovereign identities, claims and trust
/// registries on a local ledger.
#[derive(Parser, Debug)]
#[command(
    name = "lid",
    about = "ledger-identity CLI",
    version,
    long_about = "lid: ledger-identity CLI\n\nDeploy identity contracts, manage their keys and claims,\nand register verified identities in a directory."
)]
struct Cli {
    /// Home directory (default: $LEDGER_IDENTITY_HOME or ~/.ledger-identity)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Signer used as the transaction caller (default: default)
    #[arg(long, global = true, default_value = "default")]
    signer: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage signer keys
    Signer {
        #[command(subcommand)]
        subcommand: SignerCommands,
    },

    /// Credit value to an address
    Fund {
        address: Address,
        amount: u128,
    },

    /// Deploy and manage identity contracts
    Identity {
        #[command(subcommand)]
        subcommand: IdentityCommands,
    },

    /// Sign and manage claims
    Claim {
        #[command(subcommand)]
        subcommand: ClaimCommands,
    },

    /// Manage claim type and trusted issuer registries
    Registry {
        #[command(subcommand)]
        subcommand: RegistryCommands,
    },

    /// Manage an identity directory
    Directory {
        #[command(subcommand)]
        subcommand: DirectoryCommands,
    },

    /// Invoke a target through an identity
    Execute {
        /// Identity that performs the invocation
        identity: Address,

        /// Target contract or account
        target: Address,

        /// Value to send along
        #[arg(long, default_value_t = 0)]
        value: u128,

        /// Register SUBJECT under this id in the target directory
        #[arg(long)]
        register: Option<u64>,

        /// Identity to register (default: the executing identity)
        #[arg(long, requires = "register")]
        subject: Option<Address>,
    },

    /// Show the event log
    Events {
        /// Only events with sequence >= N
        #[arg(long, default_value_t = 0)]
        since: u64,

        /// Only events emitted by this contract
        #[arg(long)]
        contract: Option<Address>,
    },
}

#[derive(Subcommand, Debug)]
enum SignerCommands {
    /// Create the signer named by --signer
    New,
    /// List stored signers
    List,
    /// Show the signer's address, key id and balance
    Show,
}

#[derive(Subcommand, Debug)]
enum IdentityCommands {
    /// Deploy an identity managed by the signer
    Deploy,
    /// Display an identity
    Show { identity: Address },
    /// Grant a purpose to a key
    AddKey {
        identity: Address,
        /// Address or key id
        key: String,
        /// management, action, claim or encryption
        #[arg(long)]
        purpose: Purpose,
        /// ecdsa or rsa
        #[arg(long, default_value = "ecdsa")]
        key_type: KeyType,
    },
    /// Revoke a purpose from a key
    RemoveKey {
        identity: Address,
        /// Address or key id
        key: String,
        #[arg(long)]
        purpose: Purpose,
    },
    /// List an identity's keys
    Keys {
        identity: Address,
        #[arg(long)]
        purpose: Option<Purpose>,
    },
}

#[derive(Subcommand, Debug)]
enum ClaimCommands {
    /// Sign a claim about SUBJECT with the signer's key (off-ledger)
    Sign {
        #[arg(long)]
        subject: Address,
        #[arg(long)]
        topic: u64,
        /// Claim data (UTF-8)
        #[arg(long)]
        data: String,
    },
    /// Add a claim to an identity
    Add {
        identity: Address,
        #[arg(long)]
        topic: u64,
        /// Issuer identity (default: the identity itself)
        #[arg(long)]
        issuer: Option<Address>,
        /// Hex signature from `claim sign`
        #[arg(long, default_value = "")]
        signature: String,
        /// Claim data (UTF-8)
        #[arg(long)]
        data: String,
        #[arg(long, default_value = "")]
        uri: String,
        #[arg(long, default_value_t = scheme::ECDSA)]
        scheme: u64,
    },
    /// Remove a claim from an identity
    Remove { identity: Address, claim_id: ClaimId },
    /// List an identity's claims
    List {
        identity: Address,
        #[arg(long)]
        topic: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum RegistryCommands {
    /// Deploy a claim type registry owned by the signer
    DeployTypes,
    /// Deploy a trusted issuer registry owned by the signer
    DeployIssuers,
    /// Accept a claim topic
    AddType { registry: Address, topic: u64 },
    /// Stop accepting a claim topic
    RemoveType { registry: Address, topic: u64 },
    /// List accepted claim topics
    Types { registry: Address },
    /// Trust an issuer for some topics
    Trust {
        registry: Address,
        issuer: Address,
        #[arg(long, value_delimiter = ',', required = true)]
        topics: Vec<u64>,
    },
    /// Stop trusting an issuer
    Untrust { registry: Address, issuer: Address },
    /// Replace an issuer's trusted topics
    UpdateTopics {
        registry: Address,
        issuer: Address,
        #[arg(long, value_delimiter = ',', required = true)]
        topics: Vec<u64>,
    },
    /// List trusted issuers
    Issuers { registry: Address },
}

#[derive(Subcommand, Debug)]
enum DirectoryCommands {
    /// Deploy a directory owned by the signer
    Deploy {
        /// Trusted issuer registry
        #[arg(long)]
        issuers: Address,
        /// Claim type registry
        #[arg(long)]
        types: Address,
    },
    /// Register an identity under an id
    Register {
        directory: Address,
        id: u64,
        identity: Address,
    },
    /// Point an id at a different identity
    Update {
        directory: Address,
        id: u64,
        identity: Address,
    },
    /// Delete an id
    Delete { directory: Address, id: u64 },
    /// Look up by id or identity; list all entries without either
    Lookup {
        directory: Address,
        #[arg(long, conflicts_with = "identity")]
        id: Option<u64>,
        #[arg(long)]
        identity: Option<Address>,
    },
    /// Evaluate the verification predicate for an identity
    Verify { directory: Address, identity: Address },
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Resolved global options.
struct Session {
    home: Home,
    signer: String,
    verbose: bool,
}

impl Session {
    fn ledger(&self) -> Result<Ledger> {
        let path = self.home.ledger_path();
        load_ledger(&path).with_context(|| format!("failed to load ledger {}", path.display()))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let path = self.home.ledger_path();
        save_ledger(ledger, &path).with_context(|| format!("failed to save ledger {}", path.display()))
    }

    fn signer_path(&self) -> Result<PathBuf> {
        let path = self.home.signer_path(&self.signer);
        if !path.exists() {
            return Err(anyhow!(
                "signer '{}' not found (expected at {}); run `lid signer new`",
                self.signer,
                path.display()
            ));
        }
        Ok(path)
    }

    fn unlock(&self) -> Result<Secp256k1KeyPair> {
        let path = self.signer_path()?;
        let passphrase = read_passphrase(&format!("Passphrase for signer '{}': ", self.signer))?;
        load_signer(&path, &passphrase).context("failed to unlock signer")
    }

    /// Unlock the signer, run `f` on the ledger with the signer as caller,
    /// and save the ledger if `f` succeeds.
    fn commit<T>(
        &self,
        f: impl FnOnce(&mut Ledger, Address) -> ledger_identity::Result<T>,
    ) -> Result<T> {
        let caller = self.unlock()?.address();
        log::debug!("transacting as {caller}");
        let mut ledger = self.ledger()?;
        let first = ledger.events().len() as u64;
        let value = f(&mut ledger, caller)?;
        self.save(&ledger)?;
        if self.verbose {
            for record in ledger.events_since(first) {
                print_event(record, true);
            }
        }
        Ok(value)
    }

    fn transact(&self, target: Address, call: Call) -> Result<CallOutput> {
        let name = call.name();
        self.commit(|ledger, caller| ledger.transact(caller, target, call))
            .with_context(|| format!("{name} on {target} failed"))
    }
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.home {
        Some(dir) => dir,
        None => default_home()?,
    };
    log::debug!("home {}, signer '{}'", root.display(), cli.signer);
    let s = Session {
        home: Home::new(root),
        signer: cli.signer,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Signer { subcommand } => match subcommand {
            SignerCommands::New => cmd_signer_new(&s),
            SignerCommands::List => cmd_signer_list(&s),
            SignerCommands::Show => cmd_signer_show(&s),
        },
        Commands::Fund { address, amount } => cmd_fund(&s, address, amount),
        Commands::Identity { subcommand } => match subcommand {
            IdentityCommands::Deploy => cmd_identity_deploy(&s),
            IdentityCommands::Show { identity } => cmd_identity_show(&s, identity),
            IdentityCommands::AddKey {
                identity,
                key,
                purpose,
                key_type,
            } => cmd_identity_add_key(&s, identity, &key, purpose, key_type),
            IdentityCommands::RemoveKey {
                identity,
                key,
                purpose,
            } => cmd_identity_remove_key(&s, identity, &key, purpose),
            IdentityCommands::Keys { identity, purpose } => cmd_identity_keys(&s, identity, purpose),
        },
        Commands::Claim { subcommand } => match subcommand {
            ClaimCommands::Sign {
                subject,
                topic,
                data,
            } => cmd_claim_sign(&s, subject, topic, &data),
            ClaimCommands::Add {
                identity,
                topic,
                issuer,
                signature,
                data,
                uri,
                scheme,
            } => cmd_claim_add(
                &s,
                identity,
                ClaimRequest {
                    topic,
                    scheme,
                    issuer: issuer.unwrap_or(identity),
                    signature: parse_bytes(&signature).context("invalid --signature")?,
                    data: data.into_bytes(),
                    uri,
                },
            ),
            ClaimCommands::Remove { identity, claim_id } => cmd_claim_remove(&s, identity, claim_id),
            ClaimCommands::List { identity, topic } => cmd_claim_list(&s, identity, topic),
        },
        Commands::Registry { subcommand } => match subcommand {
            RegistryCommands::DeployTypes => cmd_registry_deploy(&s, false),
            RegistryCommands::DeployIssuers => cmd_registry_deploy(&s, true),
            RegistryCommands::AddType { registry, topic } => {
                cmd_registry_call(&s, registry, Call::AddClaimType { topic })
            }
            RegistryCommands::RemoveType { registry, topic } => {
                cmd_registry_call(&s, registry, Call::RemoveClaimType { topic })
            }
            RegistryCommands::Types { registry } => cmd_registry_types(&s, registry),
            RegistryCommands::Trust {
                registry,
                issuer,
                topics,
            } => cmd_registry_call(&s, registry, Call::AddTrustedIssuer { issuer, topics }),
            RegistryCommands::Untrust { registry, issuer } => {
                cmd_registry_call(&s, registry, Call::RemoveTrustedIssuer { issuer })
            }
            RegistryCommands::UpdateTopics {
                registry,
                issuer,
                topics,
            } => cmd_registry_call(&s, registry, Call::UpdateIssuerClaimTopics { issuer, topics }),
            RegistryCommands::Issuers { registry } => cmd_registry_issuers(&s, registry),
        },
        Commands::Directory { subcommand } => match subcommand {
            DirectoryCommands::Deploy { issuers, types } => cmd_directory_deploy(&s, issuers, types),
            DirectoryCommands::Register {
                directory,
                id,
                identity,
            } => cmd_directory_call(&s, directory, Call::RegisterIdentity { id, identity }),
            DirectoryCommands::Update {
                directory,
                id,
                identity,
            } => cmd_directory_call(&s, directory, Call::UpdateIdentity { id, identity }),
            DirectoryCommands::Delete { directory, id } => {
                cmd_directory_call(&s, directory, Call::DeleteIdentity { id })
            }
            DirectoryCommands::Lookup {
                directory,
                id,
                identity,
            } => cmd_directory_lookup(&s, directory, id, identity),
            DirectoryCommands::Verify {
                directory,
                identity,
            } => cmd_directory_verify(&s, directory, identity),
        },
        Commands::Execute {
            identity,
            target,
            value,
            register,
            subject,
        } => cmd_execute(&s, identity, target, value, register, subject),
        Commands::Events { since, contract } => cmd_events(&s, since, contract),
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `lid signer new`
fn cmd_signer_new(s: &Session) -> Result<()> {
    let path = s.home.signer_path(&s.signer);
    if path.exists() {
        return Err(anyhow!(
            "signer '{}' already exists at {}",
            s.signer,
            path.display()
        ));
    }

    let passphrase = read_passphrase("Enter passphrase for new signer: ")?;
    if passphrase.is_empty() {
        return Err(anyhow!("passphrase cannot be empty"));
    }
    if std::env::var(PASSPHRASE_ENV).is_err() {
        let confirm = read_passphrase("Confirm passphrase: ")?;
        if passphrase != confirm {
            return Err(anyhow!("passphrases do not match"));
        }
    }

    let key_pair = Secp256k1KeyPair::generate();
    save_signer(&key_pair, &path, &passphrase).context("failed to save signer")?;

    println!("Created signer '{}'", s.signer);
    println!("  Address: {}", key_pair.address());
    println!("  File:    {}", path.display());
    if s.verbose {
        println!("  Key id:  {}", key_pair.key_id());
    }
    Ok(())
}

/// `lid signer list`
fn cmd_signer_list(s: &Session) -> Result<()> {
    let names = s.home.signer_names().context("failed to list signers")?;
    if names.is_empty() {
        println!("No signers found in {}", s.home.signers_dir().display());
        return Ok(());
    }
    println!("Signers ({}):", names.len());
    for name in names {
        match read_signer_address(&s.home.signer_path(&name)) {
            Ok(address) => println!("  {name:<16} {address}"),
            Err(e) => println!("  {name:<16} (unreadable: {e})"),
        }
    }
    Ok(())
}

/// `lid signer show`
fn cmd_signer_show(s: &Session) -> Result<()> {
    let address = read_signer_address(&s.signer_path()?).context("failed to read signer")?;
    let ledger = s.ledger()?;
    println!("Signer: {}", s.signer);
    println!("  Address: {address}");
    println!("  Key id:  {}", key_id(&address));
    println!("  Balance: {}", ledger.balance(&address));
    Ok(())
}

/// `lid fund ADDRESS AMOUNT`
fn cmd_fund(s: &Session, address: Address, amount: u128) -> Result<()> {
    let mut ledger = s.ledger()?;
    ledger.fund(&address, amount)?;
    s.save(&ledger)?;
    println!("Funded {address} with {amount}");
    println!("  Balance: {}", ledger.balance(&address));
    Ok(())
}

/// `lid identity deploy`
fn cmd_identity_deploy(s: &Session) -> Result<()> {
    let address = s
        .commit(|ledger, caller| ledger.deploy_identity(caller))
        .context("failed to deploy identity")?;
    println!("Deployed identity");
    println!("  Address: {address}");
    Ok(())
}

/// `lid identity show ADDRESS`
fn cmd_identity_show(s: &Session, address: Address) -> Result<()> {
    let ledger = s.ledger()?;
    let identity = ledger
        .identity(&address)
        .ok_or_else(|| anyhow!("no identity at {address}"))?;

    println!("Identity: {address}");
    println!("  Deployer:   {}", identity.deployer);
    println!("  Created:    {}", format_micros(identity.created_at));
    println!("  Balance:    {}", ledger.balance(&address));
    println!("  Keys:       {}", identity.keys().len());
    println!("  Claims:     {}", identity.claim_store().len());
    println!("  Executions: {}", identity.executions().len());
    if s.verbose {
        for execution in identity.executions().executions() {
            println!(
                "    [{}] {:?} → {} value {} by {}",
                execution.id,
                execution.status,
                execution.target,
                execution.value,
                execution.requested_by
            );
        }
    }
    Ok(())
}

/// `lid identity add-key IDENTITY KEY --purpose P`
fn cmd_identity_add_key(
    s: &Session,
    identity: Address,
    key: &str,
    purpose: Purpose,
    key_type: KeyType,
) -> Result<()> {
    let key = parse_key(key)?;
    s.transact(
        identity,
        Call::AddKey {
            key,
            purpose,
            key_type,
        },
    )?;
    println!("Added {purpose} key {key} to {identity}");
    Ok(())
}

/// `lid identity remove-key IDENTITY KEY --purpose P`
fn cmd_identity_remove_key(s: &Session, identity: Address, key: &str, purpose: Purpose) -> Result<()> {
    let key = parse_key(key)?;
    s.transact(identity, Call::RemoveKey { key, purpose })?;
    println!("Removed {purpose} from key {key} on {identity}");
    Ok(())
}

/// `lid identity keys IDENTITY [--purpose P]`
fn cmd_identity_keys(s: &Session, address: Address, purpose: Option<Purpose>) -> Result<()> {
    let ledger = s.ledger()?;
    let identity = ledger
        .identity(&address)
        .ok_or_else(|| anyhow!("no identity at {address}"))?;

    let keys: Vec<_> = identity
        .keys()
        .keys()
        .filter(|k| purpose.map_or(true, |p| k.has_purpose(p)))
        .collect();
    if keys.is_empty() {
        println!("No keys.");
        return Ok(());
    }
    println!("Keys of {address} ({}):", keys.len());
    for key in keys {
        let purposes: Vec<&str> = key.purposes.iter().map(|p| p.as_str()).collect();
        println!("  {}  {:<6} {}", key.id, key.key_type, purposes.join(","));
    }
    Ok(())
}

/// `lid claim sign --subject S --topic T --data D`
fn cmd_claim_sign(s: &Session, subject: Address, topic: u64, data: &str) -> Result<()> {
    let key_pair = s.unlock()?;
    let signature = sign_claim(&key_pair, &subject, topic, data.as_bytes())?;
    println!("Signed claim");
    println!("  Signer:    {}", key_pair.address());
    println!("  Subject:   {subject}");
    println!("  Topic:     {topic}");
    println!("  Signature: {}", to_prefixed(&signature));
    Ok(())
}

/// `lid claim add IDENTITY --topic T --issuer I --signature SIG --data D`
fn cmd_claim_add(s: &Session, identity: Address, request: ClaimRequest) -> Result<()> {
    let topic = request.topic;
    let issuer = request.issuer;
    let output = s.transact(identity, Call::AddClaim(request))?;
    let claim_id = match output {
        CallOutput::Claim(id) => id,
        _ => ClaimId::derive(&issuer, topic),
    };
    println!("Added claim to {identity}");
    println!("  Claim id: {claim_id}");
    println!("  Topic:    {topic}");
    println!("  Issuer:   {issuer}");
    Ok(())
}

/// `lid claim remove IDENTITY CLAIM_ID`
fn cmd_claim_remove(s: &Session, identity: Address, claim_id: ClaimId) -> Result<()> {
    s.transact(identity, Call::RemoveClaim { claim_id })?;
    println!("Removed claim {claim_id} from {identity}");
    Ok(())
}

/// `lid claim list IDENTITY [--topic T]`
fn cmd_claim_list(s: &Session, address: Address, topic: Option<u64>) -> Result<()> {
    let ledger = s.ledger()?;
    let identity = ledger
        .identity(&address)
        .ok_or_else(|| anyhow!("no identity at {address}"))?;

    let claims: Vec<_> = match topic {
        Some(t) => identity
            .get_claim_ids_by_topic(t)
            .iter()
            .filter_map(|id| identity.get_claim(id))
            .collect(),
        None => identity.claims(),
    };
    if claims.is_empty() {
        println!("No claims.");
        return Ok(());
    }
    println!("Claims of {address} ({}):", claims.len());
    for claim in claims {
        println!("  {}", claim.id);
        println!("    Topic:  {}  Scheme: {}", claim.topic, claim.scheme);
        println!("    Issuer: {}", claim.issuer);
        println!("    Data:   {}", String::from_utf8_lossy(&claim.data));
        if !claim.uri.is_empty() {
            println!("    URI:    {}", claim.uri);
        }
        if s.verbose {
            println!("    Added:  {}", format_micros(claim.added_at));
            println!("    Sig:    {}", to_prefixed(&claim.signature));
        }
    }
    Ok(())
}

/// `lid registry deploy-types` / `lid registry deploy-issuers`
fn cmd_registry_deploy(s: &Session, issuers: bool) -> Result<()> {
    let (label, address) = if issuers {
        (
            "trusted issuer registry",
            s.commit(|ledger, caller| ledger.deploy_trusted_issuer_registry(caller)),
        )
    } else {
        (
            "claim type registry",
            s.commit(|ledger, caller| ledger.deploy_claim_type_registry(caller)),
        )
    };
    let address = address.with_context(|| format!("failed to deploy {label}"))?;
    println!("Deployed {label}");
    println!("  Address: {address}");
    Ok(())
}

/// Registry mutations: add-type, remove-type, trust, untrust, update-topics.
fn cmd_registry_call(s: &Session, registry: Address, call: Call) -> Result<()> {
    let name = call.name();
    s.transact(registry, call)?;
    println!("{name} applied to {registry}");
    Ok(())
}

/// `lid registry types REGISTRY`
fn cmd_registry_types(s: &Session, address: Address) -> Result<()> {
    let ledger = s.ledger()?;
    let registry = ledger
        .claim_types(&address)
        .ok_or_else(|| anyhow!("no claim type registry at {address}"))?;
    let topics: Vec<String> = registry
        .list_claim_types()
        .iter()
        .map(u64::to_string)
        .collect();
    println!("Claim types of {address}: [{}]", topics.join(", "));
    Ok(())
}

/// `lid registry issuers REGISTRY`
fn cmd_registry_issuers(s: &Session, address: Address) -> Result<()> {
    let ledger = s.ledger()?;
    let registry = ledger
        .trusted_issuers(&address)
        .ok_or_else(|| anyhow!("no trusted issuer registry at {address}"))?;
    if registry.entries().is_empty() {
        println!("No trusted issuers.");
        return Ok(());
    }
    println!("Trusted issuers of {address} ({}):", registry.entries().len());
    for entry in registry.entries() {
        let topics: Vec<String> = entry.topics.iter().map(u64::to_string).collect();
        println!("  {}  topics [{}]", entry.issuer, topics.join(", "));
    }
    Ok(())
}

/// `lid directory deploy --issuers R --types R`
fn cmd_directory_deploy(s: &Session, issuers: Address, types: Address) -> Result<()> {
    let address = s
        .commit(|ledger, caller| ledger.deploy_identity_directory(caller, issuers, types))
        .context("failed to deploy identity directory")?;
    println!("Deployed identity directory");
    println!("  Address: {address}");
    Ok(())
}

/// Directory mutations: register, update, delete.
fn cmd_directory_call(s: &Session, directory: Address, call: Call) -> Result<()> {
    let summary = match &call {
        Call::RegisterIdentity { id, identity } => format!("Registered {identity} as {id}"),
        Call::UpdateIdentity { id, identity } => format!("Updated {id} to {identity}"),
        Call::DeleteIdentity { id } => format!("Deleted {id}"),
        other => other.name().to_string(),
    };
    s.transact(directory, call)?;
    println!("{summary} in {directory}");
    Ok(())
}

/// `lid directory lookup DIRECTORY [--id N | --identity A]`
fn cmd_directory_lookup(
    s: &Session,
    address: Address,
    id: Option<u64>,
    identity: Option<Address>,
) -> Result<()> {
    let ledger = s.ledger()?;
    let directory = ledger
        .directory(&address)
        .ok_or_else(|| anyhow!("no identity directory at {address}"))?;

    match (id, identity) {
        (Some(id), _) => {
            let identity = directory
                .identity(id)
                .ok_or_else(|| anyhow!("id {id} is not registered"))?;
            println!("{id} → {identity}");
        }
        (None, Some(identity)) => {
            let id = directory
                .id_of(&identity)
                .ok_or_else(|| anyhow!("{identity} is not registered"))?;
            println!("{id} → {identity}");
        }
        (None, None) => {
            if directory.is_empty() {
                println!("No registered identities.");
                return Ok(());
            }
            println!("Registered identities ({}):", directory.len());
            for (id, identity) in directory.entries() {
                println!("  {id:<8} {identity}");
            }
        }
    }
    Ok(())
}

/// `lid directory verify DIRECTORY IDENTITY`
fn cmd_directory_verify(s: &Session, directory: Address, identity: Address) -> Result<()> {
    let ledger = s.ledger()?;
    let report = ledger.is_verified(&directory, &identity)?;

    println!("Verification of {identity}");
    println!("  Claims checked: {}", report.claims_checked);
    println!("  Qualifying:     {}", report.qualifying.len());
    for rejection in &report.rejections {
        println!("  Rejected:       {rejection}");
    }
    println!("  Verified:       {}", if report.is_verified { "yes" } else { "no" });
    if s.verbose {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// `lid execute IDENTITY TARGET [--value V] [--register ID [--subject S]]`
fn cmd_execute(
    s: &Session,
    identity: Address,
    target: Address,
    value: u128,
    register: Option<u64>,
    subject: Option<Address>,
) -> Result<()> {
    let data = match register {
        Some(id) => Call::RegisterIdentity {
            id,
            identity: subject.unwrap_or(identity),
        }
        .encode()?,
        None => Vec::new(),
    };
    let output = s.transact(
        identity,
        Call::Execute {
            target,
            value,
            data,
        },
    )?;
    println!("Executed through {identity}");
    if let CallOutput::Execution(id) = output {
        println!("  Execution: {id}");
    }
    println!("  Target:    {target}");
    if value > 0 {
        println!("  Value:     {value}");
    }
    Ok(())
}

/// `lid events [--since N] [--contract A]`
fn cmd_events(s: &Session, since: u64, contract: Option<Address>) -> Result<()> {
    let ledger = s.ledger()?;
    let events: Vec<_> = ledger
        .events_since(since)
        .iter()
        .filter(|r| contract.map_or(true, |c| r.contract == c))
        .collect();
    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }
    println!("Events ({}):", events.len());
    for record in events {
        print_event(record, s.verbose);
    }
    Ok(())
}
