use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mseal",
    about = "MediaSeal — tamper-evident integrity registry for media files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the blob store and the ledger segment
    #[arg(short, long, global = true, default_value = "./mseal-data")]
    pub data_root: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the content digest of a file
    Hash(HashArgs),
    /// Register a file: store a copy and seal its digest in the ledger
    Register(RegisterArgs),
    /// Verify a registered record against the ledger
    Verify(VerifyArgs),
    /// Check the ledger's hash chain end to end
    Audit(AuditArgs),
    /// Start the MediaSeal server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct HashArgs {
    /// Path to the file to hash
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Path to the file to register
    pub file: PathBuf,
    /// Content type to tag the stored blob with
    #[arg(long, default_value = "video/mp4")]
    pub media_type: String,
    /// Skip the post-registration verification pass
    #[arg(long)]
    pub no_verify: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Record id returned at registration time
    pub id: String,
    /// Verify a local file instead of the stored copy
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct AuditArgs {}

#[derive(Args)]
pub struct ServeArgs {
    /// Path to a TOML config file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(short, long)]
    pub bind: Option<String>,
}
