//! confsync CLI
//!
//! Dry-runs configuration synchronization against a platform snapshot. The
//! snapshot seeds an in-process platform; the synchronizer reaches it either
//! locally or through the remote adapter over a loopback transport, and the
//! resulting store contents are printed.
//!
//! # Commands
//!
//! - `init` - Pull platform-wide and tenant configuration
//! - `tenants` - Pull every tenant's configuration
//! - `autologin` - Pull one tenant's autologin file
//! - `update` - Push one tenant file to the platform

mod commands;
mod snapshot;

use clap::{Parser, Subcommand, ValueEnum};
use commands::sync::{self, Action};
use confsync_core::{AccessMode, TenantId};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Configuration synchronizer tools.
#[derive(Parser)]
#[command(name = "confsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the platform snapshot (JSON)
    #[arg(global = true, short, long)]
    platform: Option<PathBuf>,

    /// Path to the client settings (JSON)
    #[arg(global = true, short, long)]
    settings: Option<PathBuf>,

    /// Access mode, overriding the settings file
    #[arg(global = true, short, long)]
    mode: Option<ModeArg>,

    /// Output format (text, json)
    #[arg(global = true, short, long, default_value = "text")]
    format: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Local,
    Remote,
}

impl From<ModeArg> for AccessMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => AccessMode::Local,
            ModeArg::Remote => AccessMode::Remote,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Pull platform-wide and tenant configuration
    Init,

    /// Pull every tenant's configuration
    Tenants,

    /// Pull one tenant's autologin file
    Autologin {
        /// Tenant id
        #[arg(short, long)]
        tenant: u64,
    },

    /// Push one tenant file to the platform
    Update {
        /// Tenant id
        #[arg(short, long)]
        tenant: u64,

        /// File name on the platform
        #[arg(long)]
        file: String,

        /// Local file holding the new content
        #[arg(long)]
        content: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let action = match cli.command {
        Commands::Init => Action::Initialize,
        Commands::Tenants => Action::RetrieveTenants,
        Commands::Autologin { tenant } => Action::RetrieveAutologin(TenantId::new(tenant)),
        Commands::Update {
            tenant,
            file,
            content,
        } => Action::Update {
            tenant_id: TenantId::new(tenant),
            file_name: file,
            content,
        },
        Commands::Version => {
            println!("confsync CLI v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    let platform = cli.platform.ok_or("Platform snapshot path required")?;
    sync::run(
        &platform,
        cli.settings.as_deref(),
        cli.mode.map(AccessMode::from),
        action,
        &cli.format,
    )
}
