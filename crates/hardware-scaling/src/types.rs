//! Hardware configuration model shared by the catalog, resolver and form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel accelerator identifier meaning "no GPU selected".
pub const NO_ACCELERATOR: &str = "NO_ACCELERATOR";

/// Canonical GPU counts offered when nothing narrows the choice.
pub const ACCELERATOR_COUNTS_1_2_4_8: [u32; 4] = [1, 2, 4, 8];

/// A single entry in a choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Text shown to the user.
    pub label: String,
    /// Value committed to the configuration.
    pub value: String,
}

impl SelectOption {
    /// Create an option from a label and value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Value of the first option in a list, or an empty string for an empty list.
///
/// The first option is the default selection whenever a list is recomputed.
#[must_use]
pub fn first_value(options: &[SelectOption]) -> String {
    options
        .first()
        .map(|option| option.value.clone())
        .unwrap_or_default()
}

/// Build the GPU count options for a list of counts.
#[must_use]
pub fn count_options(counts: &[u32]) -> Vec<SelectOption> {
    counts
        .iter()
        .map(|count| SelectOption::new(count.to_string(), count.to_string()))
        .collect()
}

/// A VM size, e.g. `n1-standard-4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineType {
    /// Machine type identifier.
    pub name: String,
    /// Human-readable shape, e.g. "4 vCPUs, 15 GB RAM".
    pub description: String,
}

impl MachineType {
    /// Create a machine type.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Option shown in the machine type selector.
    #[must_use]
    pub fn to_option(&self) -> SelectOption {
        SelectOption::new(self.description.clone(), self.name.clone())
    }
}

impl From<&SelectOption> for MachineType {
    fn from(option: &SelectOption) -> Self {
        Self::new(option.value.clone(), option.label.clone())
    }
}

/// Machine types grouped under a family heading (e.g. "N1 standard").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineTypeFamily {
    /// Family heading.
    pub base: String,
    /// Machine types in display order.
    pub configurations: Vec<MachineType>,
}

/// Identifier of a GPU kind, or [`NO_ACCELERATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceleratorType(String);

impl AcceleratorType {
    /// Create an accelerator identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The "no GPU selected" sentinel.
    #[must_use]
    pub fn none() -> Self {
        Self(NO_ACCELERATOR.to_string())
    }

    /// Whether this is the sentinel.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0 == NO_ACCELERATOR
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AcceleratorType {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for AcceleratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AcceleratorType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An accelerator kind together with its attachment limits.
///
/// Used both for the static catalog and for the accelerator types available
/// in an instance's zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceleratorTypeInfo {
    /// Accelerator identifier, e.g. `nvidia-tesla-t4`.
    pub name: String,
    /// Display name, e.g. "NVIDIA Tesla T4".
    pub description: String,
    /// Smallest number of cards that can be attached.
    #[serde(default = "default_minimum_cards")]
    pub minimum_cards_per_instance: u32,
    /// Largest number of cards that can be attached.
    pub maximum_cards_per_instance: u32,
    /// CPU platforms this accelerator cannot be paired with.
    #[serde(default)]
    pub unsupported_cpu_platforms: Vec<String>,
}

fn default_minimum_cards() -> u32 {
    1
}

impl AcceleratorTypeInfo {
    /// Create an accelerator entry accepting `1..=maximum` cards on any platform.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        maximum_cards_per_instance: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            minimum_cards_per_instance: default_minimum_cards(),
            maximum_cards_per_instance,
            unsupported_cpu_platforms: Vec::new(),
        }
    }

    /// Set the minimum card count.
    #[must_use]
    pub fn with_minimum(mut self, minimum: u32) -> Self {
        self.minimum_cards_per_instance = minimum;
        self
    }

    /// Mark a CPU platform as incompatible.
    #[must_use]
    pub fn unsupported_on(mut self, cpu_platform: impl Into<String>) -> Self {
        self.unsupported_cpu_platforms.push(cpu_platform.into());
        self
    }

    /// Option shown in the GPU type selector.
    #[must_use]
    pub fn to_option(&self) -> SelectOption {
        SelectOption::new(self.description.clone(), self.name.clone())
    }

    /// Whether `count` cards fall within this accelerator's limits.
    #[must_use]
    pub fn accepts_count(&self, count: u32) -> bool {
        (self.minimum_cards_per_instance..=self.maximum_cards_per_instance).contains(&count)
    }
}

/// The machine and GPU selection edited by the form.
///
/// Invariants maintained by the resolver:
/// - `attach_gpu == false` implies `gpu_type` is [`NO_ACCELERATOR`] and `gpu_count` is empty.
/// - `gpu_count` is one of the current count options, or empty without a GPU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareConfiguration {
    /// Selected machine type.
    pub machine_type: MachineType,
    /// Whether GPUs are attached.
    pub attach_gpu: bool,
    /// Selected GPU kind.
    pub gpu_type: AcceleratorType,
    /// Selected GPU count, empty when no GPU is attached.
    pub gpu_count: String,
}

impl HardwareConfiguration {
    /// Configuration without any GPU attached.
    #[must_use]
    pub fn without_gpu(machine_type: MachineType) -> Self {
        Self {
            machine_type,
            attach_gpu: false,
            gpu_type: AcceleratorType::none(),
            gpu_count: String::new(),
        }
    }
}
