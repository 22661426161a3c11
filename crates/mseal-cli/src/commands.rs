use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;

use mseal_core::{RegistrationService, Verification, VerificationService, VerifyError};
use mseal_crypto::ContentHasher;
use mseal_ledger::{FileLedger, Ledger};
use mseal_server::{SealServer, ServerConfig};
use mseal_store::{ContentStore, FsContentStore};
use mseal_types::{MediaType, RecordId};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Hash(args) => cmd_hash(args),
        Command::Register(args) => cmd_register(&cli.data_root, args).await,
        Command::Verify(args) => cmd_verify(&cli.data_root, args).await,
        Command::Audit(_) => cmd_audit(&cli.data_root),
        Command::Serve(args) => cmd_serve(&cli.data_root, args).await,
    }
}

struct Backends {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn Ledger>,
}

fn open_backends(data_root: &Path) -> anyhow::Result<Backends> {
    let store = FsContentStore::open(data_root.join("blobs"))
        .with_context(|| format!("cannot open blob store under {}", data_root.display()))?;
    let ledger = FileLedger::open(data_root.join("ledger.seg"))
        .with_context(|| format!("cannot open ledger under {}", data_root.display()))?;
    Ok(Backends {
        store: Arc::new(store),
        ledger: Arc::new(ledger),
    })
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read file {}", path.display()))
}

fn size_mb(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

fn format_timestamp(secs: u64) -> String {
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{secs}"))
}

fn cmd_hash(args: HashArgs) -> anyhow::Result<()> {
    let data = read_file(&args.file)?;
    let digest = ContentHasher::digest(&data);
    println!("{} ({})", args.file.display().to_string().bold(), size_mb(data.len()));
    println!("  sha256: {}", digest.to_hex().cyan());
    Ok(())
}

async fn cmd_register(data_root: &Path, args: RegisterArgs) -> anyhow::Result<()> {
    let data = read_file(&args.file)?;
    let backends = open_backends(data_root)?;
    let registrar =
        RegistrationService::new(Arc::clone(&backends.store), Arc::clone(&backends.ledger))
            .with_media_type(MediaType::new(args.media_type));

    println!(
        "Registering {} ({})",
        args.file.display().to_string().bold(),
        size_mb(data.len())
    );
    let registration = registrar.register(&data).await?;
    println!("{} Record registered", "✓".green().bold());
    println!("  Record id:   {}", registration.id.to_string().yellow());
    println!("  Digest:      {}", registration.digest.to_hex().cyan());
    println!("  Transaction: {}", registration.transaction.to_hex().dimmed());
    println!("  Stored at:   {}", registration.location);

    if !args.no_verify {
        let verifier = VerificationService::new(backends.store, backends.ledger);
        let verification = verifier.verify(&registration.id).await?;
        print_verdict(&verification);
    }
    Ok(())
}

async fn cmd_verify(data_root: &Path, args: VerifyArgs) -> anyhow::Result<()> {
    let id = RecordId::parse(&args.id)?;
    let backends = open_backends(data_root)?;
    let verifier = VerificationService::new(backends.store, backends.ledger);

    let result = match &args.file {
        Some(path) => {
            let data = read_file(path)?;
            println!(
                "Verifying local file {} ({}) against record {}",
                path.display().to_string().bold(),
                size_mb(data.len()),
                id.to_string().yellow()
            );
            verifier.verify_local(&id, &data).await
        }
        None => {
            println!("Verifying stored copy of record {}", id.to_string().yellow());
            verifier.verify(&id).await
        }
    };

    match result {
        Ok(verification) => {
            println!("  Current digest: {}", verification.current_digest.to_hex().cyan());
            println!("  Stored digest:  {}", verification.stored_digest.to_hex().cyan());
            println!(
                "  Registered at:  {}",
                format_timestamp(verification.registered_at)
            );
            print_verdict(&verification);
            if verification.tampered() {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(err @ (VerifyError::ContentNotFound(_) | VerifyError::RecordNotFound(_))) => {
            println!("{} {err}", "✗".red().bold());
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

fn print_verdict(verification: &Verification) {
    if verification.valid {
        println!(
            "{} Record is {} — content matches the sealed digest",
            "✓".green().bold(),
            "AUTHENTIC".green().bold()
        );
    } else {
        println!(
            "{} Record is {} — content does not match the sealed digest",
            "✗".red().bold(),
            "TAMPERED".red().bold()
        );
    }
}

fn cmd_audit(data_root: &Path) -> anyhow::Result<()> {
    let ledger = FileLedger::open(data_root.join("ledger.seg"))?;
    let verified = ledger.validate()?;
    println!(
        "{} Ledger chain intact: {} entr{} verified",
        "✓".green().bold(),
        verified.to_string().bold(),
        if verified == 1 { "y" } else { "ies" }
    );
    Ok(())
}

async fn cmd_serve(data_root: &Path, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig {
            data_root: data_root.to_path_buf(),
            ..ServerConfig::default()
        },
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    let server = SealServer::new(config)?;
    server.serve().await?;
    Ok(())
}
