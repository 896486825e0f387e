//! Existing instance hardware profile and its mapping into the form's shape.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::catalog::Catalog;
use crate::error::{HardwareError, HardwareResult};
use crate::types::{AcceleratorType, AcceleratorTypeInfo, HardwareConfiguration, MachineType};

/// Compute instance the notebook runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Instance name.
    pub name: String,
    /// Zone the instance runs in.
    #[serde(default)]
    pub zone: String,
    /// Current machine type.
    pub machine_type: MachineType,
    /// CPU platform, e.g. "Intel Haswell".
    #[serde(default)]
    pub cpu_platform: String,
}

/// GPUs currently attached to the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedGpu {
    /// Accelerator type identifier.
    #[serde(default, rename = "type")]
    pub gpu_type: AcceleratorType,
    /// Number of cards attached.
    #[serde(default)]
    pub count: u32,
}

/// Hardware profile of an existing instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    /// The instance itself.
    pub instance: Instance,
    /// Attached GPUs, if any.
    #[serde(default)]
    pub gpu: AttachedGpu,
    /// Accelerator types available in the instance's zone.
    #[serde(default)]
    pub accelerator_types: Vec<AcceleratorTypeInfo>,
}

impl Details {
    /// Load a profile from a JSON file.
    ///
    /// # Errors
    /// Returns [`HardwareError::FileRead`] if the file cannot be read and
    /// [`HardwareError::Parse`] if it is not a valid profile.
    pub async fn load_from_path(path: &Path) -> HardwareResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| HardwareError::FileRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&content).map_err(|e| HardwareError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Whether the profile has at least one GPU attached.
    #[must_use]
    pub fn has_gpu(&self) -> bool {
        self.gpu.count > 0 && !self.gpu.gpu_type.is_none()
    }

    /// Map the profile into the form's configuration.
    ///
    /// The machine type is taken from the catalog when it knows the name, so
    /// the form shows the catalog's description. Unknown machine types are
    /// passed through as-is.
    #[must_use]
    pub fn to_hardware_configuration(&self, catalog: &Catalog) -> HardwareConfiguration {
        let machine_type = catalog
            .find_machine_type(&self.instance.machine_type.name)
            .cloned()
            .unwrap_or_else(|| self.instance.machine_type.clone());

        if !self.has_gpu() {
            return HardwareConfiguration::without_gpu(machine_type);
        }

        HardwareConfiguration {
            machine_type,
            attach_gpu: true,
            gpu_type: self.gpu.gpu_type.clone(),
            gpu_count: self.gpu.count.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NO_ACCELERATOR;

    fn details_json() -> &'static str {
        r#"{
            "instance": {
                "name": "notebook-1",
                "zone": "us-central1-a",
                "machineType": {"name": "n1-standard-4", "description": "n1-standard-4"},
                "cpuPlatform": "Intel Haswell"
            },
            "gpu": {"type": "nvidia-tesla-t4", "count": 2},
            "acceleratorTypes": [
                {"name": "nvidia-tesla-t4", "description": "NVIDIA Tesla T4", "maximumCardsPerInstance": 4}
            ]
        }"#
    }

    #[test]
    fn test_deserialize_details() {
        let details: Details = serde_json::from_str(details_json()).unwrap();
        assert_eq!(details.instance.cpu_platform, "Intel Haswell");
        assert_eq!(details.gpu.gpu_type.as_str(), "nvidia-tesla-t4");
        assert_eq!(details.accelerator_types.len(), 1);
        assert!(details.has_gpu());
    }

    #[test]
    fn test_missing_gpu_defaults_to_none() {
        let json = r#"{"instance": {"name": "nb", "machineType": {"name": "e2-standard-2", "description": ""}}}"#;
        let details: Details = serde_json::from_str(json).unwrap();
        assert_eq!(details.gpu.gpu_type.as_str(), NO_ACCELERATOR);
        assert!(!details.has_gpu());
    }

    #[test]
    fn test_maps_profile_with_gpu() {
        let details: Details = serde_json::from_str(details_json()).unwrap();
        let config = details.to_hardware_configuration(&Catalog::builtin());
        assert!(config.attach_gpu);
        assert_eq!(config.gpu_type.as_str(), "nvidia-tesla-t4");
        assert_eq!(config.gpu_count, "2");
        // Description comes from the catalog.
        assert_eq!(config.machine_type.description, "4 vCPUs, 15 GB RAM");
    }

    #[test]
    fn test_maps_profile_without_gpu() {
        let mut details: Details = serde_json::from_str(details_json()).unwrap();
        details.gpu.count = 0;
        let config = details.to_hardware_configuration(&Catalog::builtin());
        assert!(!config.attach_gpu);
        assert!(config.gpu_type.is_none());
        assert_eq!(config.gpu_count, "");
    }

    #[test]
    fn test_unknown_machine_type_passes_through() {
        let mut details: Details = serde_json::from_str(details_json()).unwrap();
        details.instance.machine_type = MachineType::new("a2-highgpu-1g", "A2 high-GPU");
        let config = details.to_hardware_configuration(&Catalog::builtin());
        assert_eq!(config.machine_type.name, "a2-highgpu-1g");
        assert_eq!(config.machine_type.description, "A2 high-GPU");
    }
}
