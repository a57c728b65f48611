//! Rendering of what an operation wrote to the store.

use confsync_core::{MemoryStore, StoreWrite, TenantId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A stored file.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// File name.
    pub name: String,
    /// Content size in bytes.
    pub size: usize,
    /// Content, if it is valid UTF-8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Everything an operation wrote to the store.
#[derive(Debug, Default, Serialize)]
pub struct StoreReport {
    /// Platform-wide files.
    pub platform: Vec<FileEntry>,
    /// Tenant files by tenant id.
    pub tenants: BTreeMap<u64, Vec<FileEntry>>,
}

impl StoreReport {
    /// Collects the files written to `store`.
    pub fn from_store(store: &MemoryStore) -> Self {
        let mut report = StoreReport {
            platform: entries(store.platform_configuration()),
            tenants: BTreeMap::new(),
        };

        let tenant_ids: BTreeSet<TenantId> = store
            .writes()
            .into_iter()
            .filter_map(|write| match write {
                StoreWrite::Tenant(tenant_id, _) | StoreWrite::TenantFile(tenant_id, _) => {
                    Some(tenant_id)
                }
                StoreWrite::Platform(_) => None,
            })
            .collect();
        for tenant_id in tenant_ids {
            if let Some(files) = store.tenant_configuration(tenant_id) {
                report.tenants.insert(tenant_id.as_u64(), entries(files));
            }
        }
        report
    }

    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.platform.is_empty() && self.tenants.is_empty()
    }

    /// Prints the report in the given format (text, json).
    pub fn print(&self, format: &str) -> Result<(), Box<dyn std::error::Error>> {
        match format {
            "json" => println!("{}", serde_json::to_string_pretty(self)?),
            "text" => print!("{}", self.to_text()),
            other => return Err(format!("unknown output format: {}", other).into()),
        }
        Ok(())
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        if self.is_empty() {
            out.push_str("nothing stored\n");
            return out;
        }
        if !self.platform.is_empty() {
            out.push_str("platform:\n");
            for file in &self.platform {
                out.push_str(&format!("  {} ({} bytes)\n", file.name, file.size));
            }
        }
        for (tenant_id, files) in &self.tenants {
            out.push_str(&format!("tenant {}:\n", tenant_id));
            for file in files {
                out.push_str(&format!("  {} ({} bytes)\n", file.name, file.size));
            }
        }
        out
    }
}

fn entries(files: BTreeMap<String, Vec<u8>>) -> Vec<FileEntry> {
    files
        .into_iter()
        .map(|(name, content)| FileEntry {
            name,
            size: content.len(),
            content: String::from_utf8(content).ok(),
        })
        .collect()
}
