//! Hardware catalog - the static machine and accelerator data behind the form.
//!
//! The catalog is injected into the resolver rather than read from globals so
//! callers (and tests) can substitute their own data.
//!
//! **File Locations** (checked in order by [`Catalog::load`]):
//! 1. `HARDWARE_CATALOG` environment variable
//! 2. `.cto/hardware-catalog.json` in current directory
//! 3. `hardware-catalog.json` in current directory
//! 4. `~/.cto/hardware-catalog.json`
//!
//! Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as JSON.

mod builtin;
mod lookup;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{HardwareError, HardwareResult};
use crate::types::{
    AcceleratorTypeInfo, MachineType, MachineTypeFamily, ACCELERATOR_COUNTS_1_2_4_8,
};

pub use lookup::{gpu_count_options, gpu_type_options};

/// Machine type prefix of the general-purpose family that supports GPUs.
pub const N1_MACHINE_PREFIX: &str = "n1-";

/// Environment variable naming a catalog file.
pub const CATALOG_ENV_VAR: &str = "HARDWARE_CATALOG";

/// Machine types, accelerator types and GPU rules offered by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Machine type families in display order.
    pub machine_types: Vec<MachineTypeFamily>,

    /// Accelerator types offered when no zone availability is known.
    pub accelerator_types: Vec<AcceleratorTypeInfo>,

    /// Machine types whose name starts with this prefix can attach GPUs.
    #[serde(default = "default_gpu_capable_prefix")]
    pub gpu_capable_prefix: String,

    /// GPU counts offered before an accelerator narrows them.
    #[serde(default = "default_gpu_counts")]
    pub gpu_counts: Vec<u32>,
}

fn default_gpu_capable_prefix() -> String {
    N1_MACHINE_PREFIX.to_string()
}

fn default_gpu_counts() -> Vec<u32> {
    ACCELERATOR_COUNTS_1_2_4_8.to_vec()
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in Compute Engine catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            machine_types: builtin::machine_types(),
            accelerator_types: builtin::accelerator_types(),
            gpu_capable_prefix: default_gpu_capable_prefix(),
            gpu_counts: default_gpu_counts(),
        }
    }

    /// Load the catalog from standard locations.
    ///
    /// Returns the built-in catalog if no file is found. A file named by
    /// `HARDWARE_CATALOG` that fails to load is an error rather than being
    /// silently skipped.
    ///
    /// # Errors
    /// Returns an error if the file named by `HARDWARE_CATALOG` cannot be
    /// read, parsed, or validated.
    pub async fn load() -> HardwareResult<Self> {
        if let Ok(path) = std::env::var(CATALOG_ENV_VAR) {
            let catalog = Self::load_from_path(Path::new(&path)).await?;
            tracing::info!("Loaded hardware catalog from {}={}", CATALOG_ENV_VAR, path);
            return Ok(catalog);
        }

        let locations: Vec<PathBuf> = vec![
            PathBuf::from(".cto/hardware-catalog.json"),
            PathBuf::from("hardware-catalog.json"),
            std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".cto/hardware-catalog.json"))
                .unwrap_or_default(),
        ];

        for path in locations.iter().filter(|path| path.is_file()) {
            let loaded = Self::load_from_path(path).await.inspect_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable hardware catalog");
            });
            if let Ok(catalog) = loaded {
                tracing::info!("Loaded hardware catalog from {}", path.display());
                return Ok(catalog);
            }
        }

        tracing::info!("No hardware catalog found, using built-in catalog");
        Ok(Self::builtin())
    }

    /// Load and validate a catalog from a specific path.
    ///
    /// # Errors
    /// Returns [`HardwareError::FileRead`] if the file cannot be read,
    /// [`HardwareError::Parse`] if it is not a valid catalog, and
    /// [`HardwareError::EmptyCatalog`] if it fails [`Catalog::validate`].
    pub async fn load_from_path(path: &Path) -> HardwareResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| HardwareError::FileRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let catalog: Self = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| HardwareError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| HardwareError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        };

        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that every list the form draws a default from is non-empty.
    ///
    /// # Errors
    /// Returns [`HardwareError::EmptyCatalog`] naming the first empty list.
    pub fn validate(&self) -> HardwareResult<()> {
        if self.machine_types.is_empty() {
            return Err(HardwareError::EmptyCatalog(
                "no machine type families".to_string(),
            ));
        }
        if let Some(family) = self
            .machine_types
            .iter()
            .find(|family| family.configurations.is_empty())
        {
            return Err(HardwareError::EmptyCatalog(format!(
                "machine type family '{}' has no configurations",
                family.base
            )));
        }
        if self.accelerator_types.is_empty() {
            return Err(HardwareError::EmptyCatalog(
                "no accelerator types".to_string(),
            ));
        }
        if self.gpu_counts.is_empty() {
            return Err(HardwareError::EmptyCatalog("no GPU counts".to_string()));
        }
        Ok(())
    }

    /// The first machine type of the first family.
    ///
    /// An empty catalog yields a nameless machine type; [`Catalog::validate`]
    /// rejects such catalogs on load.
    #[must_use]
    pub fn default_machine_type(&self) -> MachineType {
        self.machine_types
            .iter()
            .flat_map(|family| family.configurations.iter())
            .next()
            .cloned()
            .unwrap_or_else(|| MachineType::new("", ""))
    }

    /// Look up a machine type by name.
    #[must_use]
    pub fn find_machine_type(&self, name: &str) -> Option<&MachineType> {
        self.machine_types
            .iter()
            .flat_map(|family| family.configurations.iter())
            .find(|machine| machine.name == name)
    }

    /// Whether a machine type name belongs to the GPU-capable family.
    #[must_use]
    pub fn is_gpu_capable(&self, machine_type: &str) -> bool {
        machine_type.starts_with(&self.gpu_capable_prefix)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
