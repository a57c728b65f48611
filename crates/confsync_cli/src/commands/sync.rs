//! Runs one synchronizer operation against a snapshot platform.

use super::report::StoreReport;
use crate::snapshot::PlatformSnapshot;
use confsync_core::{
    AccessMode, ClientSettings, ConfigurationSynchronizer, HttpPlatform, LoopbackClient,
    MemoryStore, PlatformApi, PlatformLogin, SyncConfig, SyncResult, TenantId,
};
use confsync_platform::{AdminPlatform, LocalLoginMechanism};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Base URL the remote adapter uses for the in-process platform.
const LOOPBACK_URL: &str = "loopback://platform";

/// A synchronizer operation.
#[derive(Debug, Clone)]
pub enum Action {
    /// Pull platform-wide and tenant configuration.
    Initialize,
    /// Pull every tenant's configuration.
    RetrieveTenants,
    /// Pull one tenant's autologin file.
    RetrieveAutologin(TenantId),
    /// Push one file of one tenant.
    Update {
        /// Tenant.
        tenant_id: TenantId,
        /// File name on the platform.
        file_name: String,
        /// Local file holding the new content.
        content: PathBuf,
    },
}

/// Runs the sync command.
pub fn run(
    snapshot: &Path,
    settings: Option<&Path>,
    mode: Option<AccessMode>,
    action: Action,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let platform = Arc::new(PlatformSnapshot::load(snapshot)?.into_platform());

    let mut config = match settings {
        Some(path) => SyncConfig::from_settings(&ClientSettings::load(path)?),
        None => SyncConfig::default(),
    };
    if let Some(mode) = mode {
        config = config.with_access_mode(mode);
    }
    info!(mode = %config.access_mode, "synchronizing against snapshot platform");

    let store = Arc::new(MemoryStore::new());
    let local_login = Arc::new(LocalLoginMechanism::new(Arc::clone(&platform)));
    match config.access_mode {
        AccessMode::Local => {
            let synchronizer = ConfigurationSynchronizer::with_shared(
                config,
                Arc::clone(&platform),
                Arc::clone(&store),
            )
            .with_local_login(local_login);
            execute(&synchronizer, action)?;
        }
        AccessMode::Remote => {
            let client = LoopbackClient::new(Arc::clone(&platform));
            let remote = Arc::new(HttpPlatform::new(LOOPBACK_URL, client));
            let synchronizer =
                ConfigurationSynchronizer::with_shared(config, remote, Arc::clone(&store))
                    .with_local_login(local_login);
            execute(&synchronizer, action)?;
        }
    }

    let open = platform.active_sessions();
    if open > 0 {
        return Err(format!("{} platform session(s) left open", open).into());
    }
    StoreReport::from_store(&store).print(format)
}

fn execute<P>(
    synchronizer: &ConfigurationSynchronizer<P, MemoryStore>,
    action: Action,
) -> Result<(), Box<dyn std::error::Error>>
where
    P: PlatformLogin + PlatformApi,
{
    let result: SyncResult<()> = match action {
        Action::Initialize => synchronizer.initialize_platform_configuration(),
        Action::RetrieveTenants => synchronizer.retrieve_tenants_configuration(),
        Action::RetrieveAutologin(tenant_id) => {
            synchronizer.retrieve_autologin_configuration(tenant_id)
        }
        Action::Update {
            tenant_id,
            file_name,
            content,
        } => {
            let content = std::fs::read(&content)
                .map_err(|e| format!("cannot read {:?}: {}", content, e))?;
            synchronizer.update_configuration_file(tenant_id, &file_name, content)?;
            println!("updated {} of tenant {}", file_name, tenant_id);
            Ok(())
        }
    };
    Ok(result?)
}
