//! Hardware configuration resolver.
//!
//! Pure state transitions for the hardware scaling form. Each transition takes
//! the current [`FormState`] and a user edit and returns the next state; none
//! of them fail, block, or touch anything outside the state they are given.
//!
//! ```text
//!   GpuCapableMachine                      GpuIncapableMachine
//!  ┌──────────────────────────────┐        ┌───────────────┐
//!  │  NoGpu  ◄──attach=false──┐   │ machine│               │
//!  │    │                     │   │ ──────►│     NoGpu     │
//!  │    └──attach=true──► GpuAttached      │               │
//!  └──────────────────────────────┘◄───────└───────────────┘
//!                                  machine
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{gpu_count_options, gpu_type_options, Catalog};
use crate::error::HardwareError;
use crate::profile::Details;
use crate::types::{
    count_options, first_value, AcceleratorType, AcceleratorTypeInfo, HardwareConfiguration,
    MachineType, SelectOption,
};

/// Everything the form tracks between edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// The configuration being edited.
    pub configuration: HardwareConfiguration,
    /// Legal GPU counts for the selected GPU type.
    pub gpu_count_options: Vec<SelectOption>,
}

/// A single user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareEvent {
    /// The "attach GPUs" checkbox was toggled.
    AttachGpu(bool),
    /// A GPU type was picked.
    GpuType(AcceleratorType),
    /// A machine type was picked.
    MachineType(MachineType),
    /// A GPU count was picked.
    GpuCount(String),
}

impl fmt::Display for HardwareEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachGpu(attach) => write!(f, "attach-gpu={attach}"),
            Self::GpuType(gpu_type) => write!(f, "gpu-type={gpu_type}"),
            Self::MachineType(machine_type) => write!(f, "machine-type={}", machine_type.name),
            Self::GpuCount(count) => write!(f, "gpu-count={count}"),
        }
    }
}

impl FromStr for HardwareEvent {
    type Err = HardwareError;

    /// Parse `key=value`, e.g. `machine-type=n1-standard-4` or `attach-gpu=true`.
    ///
    /// Machine types parsed this way carry their name as description; callers
    /// holding a catalog should swap in the catalog entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| HardwareError::InvalidEvent(format!("expected key=value, got '{s}'")))?;
        let value = value.trim();

        match key.trim() {
            "attach-gpu" => value.parse::<bool>().map(Self::AttachGpu).map_err(|_| {
                HardwareError::InvalidEvent(format!("attach-gpu expects true or false, got '{value}'"))
            }),
            "gpu-type" if !value.is_empty() => Ok(Self::GpuType(AcceleratorType::new(value))),
            "machine-type" if !value.is_empty() => {
                Ok(Self::MachineType(MachineType::new(value, value)))
            }
            "gpu-count" if !value.is_empty() => Ok(Self::GpuCount(value.to_string())),
            "gpu-type" | "machine-type" | "gpu-count" => Err(HardwareError::InvalidEvent(format!(
                "{key} requires a value"
            ))),
            other => Err(HardwareError::InvalidEvent(format!(
                "unknown event '{other}'"
            ))),
        }
    }
}

/// Derives valid configurations and option lists from an injected catalog.
#[derive(Debug, Clone)]
pub struct HardwareConfigurationResolver {
    catalog: Catalog,
    /// Accelerators available in context: the zone's list for an existing
    /// instance, otherwise the catalog's.
    available_accelerators: Vec<AcceleratorTypeInfo>,
    gpu_type_options: Vec<SelectOption>,
}

impl HardwareConfigurationResolver {
    /// Create a resolver for a new instance (`details == None`) or an existing one.
    ///
    /// An existing instance offers the accelerators listed in its profile, or
    /// the catalog's when the profile lists none.
    #[must_use]
    pub fn new(catalog: Catalog, details: Option<&Details>) -> Self {
        let (available_accelerators, gpu_type_options) = match details {
            Some(details) => {
                let available = if details.accelerator_types.is_empty() {
                    debug!(
                        instance = %details.instance.name,
                        "Profile lists no accelerator types, using the catalog's"
                    );
                    &catalog.accelerator_types
                } else {
                    &details.accelerator_types
                };
                let options =
                    gpu_type_options(available, Some(details.instance.cpu_platform.as_str()));
                (available.clone(), options)
            }
            None => {
                let options = gpu_type_options(&catalog.accelerator_types, None);
                (catalog.accelerator_types.clone(), options)
            }
        };

        Self {
            catalog,
            available_accelerators,
            gpu_type_options,
        }
    }

    /// The catalog this resolver draws from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// GPU types the user may pick from.
    #[must_use]
    pub fn gpu_type_options(&self) -> &[SelectOption] {
        &self.gpu_type_options
    }

    /// Initial form state.
    ///
    /// Without a profile the catalog's default machine type is selected with no
    /// GPU and the canonical counts are offered. With a profile the mapped
    /// configuration is used and counts are computed for its GPU type.
    #[must_use]
    pub fn initial_state(&self, details: Option<&Details>) -> FormState {
        match details {
            Some(details) => {
                let configuration = details.to_hardware_configuration(&self.catalog);
                let gpu_count_options = self.recompute_gpu_count_options(&configuration.gpu_type);
                FormState {
                    configuration,
                    gpu_count_options,
                }
            }
            None => FormState {
                configuration: HardwareConfiguration::without_gpu(
                    self.catalog.default_machine_type(),
                ),
                gpu_count_options: count_options(&self.catalog.gpu_counts),
            },
        }
    }

    /// Whether `machine_type` supports attaching GPUs.
    ///
    /// Gates both the attach toggle and the visibility of the GPU fields.
    #[must_use]
    pub fn can_attach_gpu(&self, machine_type: &str) -> bool {
        self.catalog.is_gpu_capable(machine_type)
    }

    /// Legal GPU counts for `selected` among the accelerators in context.
    #[must_use]
    pub fn recompute_gpu_count_options(&self, selected: &AcceleratorType) -> Vec<SelectOption> {
        gpu_count_options(
            &self.available_accelerators,
            selected,
            &self.catalog.gpu_counts,
        )
    }

    /// Apply a single edit.
    ///
    /// Edits are applied unconditionally. Callers must only forward
    /// `AttachGpu(true)` when [`Self::can_attach_gpu`] holds for the current
    /// machine type, and GPU type/count edits only while GPUs are attached;
    /// [`crate::form::HardwareScalingForm::handle`] does this gating.
    #[must_use]
    pub fn apply(&self, state: FormState, event: &HardwareEvent) -> FormState {
        debug!(event = %event, "Applying hardware event");
        match event {
            HardwareEvent::AttachGpu(attach) => self.toggle_attach_gpu(state, *attach),
            HardwareEvent::GpuType(gpu_type) => self.change_gpu_type(state, gpu_type.clone()),
            HardwareEvent::MachineType(machine_type) => {
                self.change_machine_type(state, machine_type.clone())
            }
            HardwareEvent::GpuCount(count) => self.change_gpu_count(state, count.clone()),
        }
    }

    /// Attach or detach GPUs.
    ///
    /// Attaching selects the first GPU type and the first of the current count
    /// options; detaching clears both. Attaching with no GPU type to offer
    /// leaves the state unchanged.
    ///
    /// The machine type is not checked here: callers must gate attaching on
    /// [`Self::can_attach_gpu`] so GPUs are only attached to capable machines.
    #[must_use]
    pub fn toggle_attach_gpu(&self, mut state: FormState, attach: bool) -> FormState {
        if attach && self.gpu_type_options.is_empty() {
            debug!("No GPU types available, not attaching");
            return state;
        }
        let config = &mut state.configuration;
        config.attach_gpu = attach;
        if attach {
            config.gpu_type = AcceleratorType::new(first_value(&self.gpu_type_options));
            config.gpu_count = first_value(&state.gpu_count_options);
        } else {
            config.gpu_type = AcceleratorType::none();
            config.gpu_count.clear();
        }
        state
    }

    /// Pick a GPU type, resetting the count to the first legal value for it.
    #[must_use]
    pub fn change_gpu_type(&self, mut state: FormState, gpu_type: AcceleratorType) -> FormState {
        let gpu_count_options = self.recompute_gpu_count_options(&gpu_type);
        state.configuration.gpu_count = first_value(&gpu_count_options);
        state.configuration.gpu_type = gpu_type;
        state.gpu_count_options = gpu_count_options;
        state
    }

    /// Pick a machine type.
    ///
    /// Machine types outside the GPU-capable family clear the GPU selection;
    /// otherwise the GPU type and count are left untouched.
    #[must_use]
    pub fn change_machine_type(&self, mut state: FormState, machine_type: MachineType) -> FormState {
        let can_attach_gpu = self.can_attach_gpu(&machine_type.name);
        let config = &mut state.configuration;
        config.machine_type = machine_type;
        config.attach_gpu = config.attach_gpu && can_attach_gpu;
        if !can_attach_gpu {
            config.gpu_type = AcceleratorType::none();
            config.gpu_count.clear();
        }
        state
    }

    /// Pick a GPU count. The value is taken as-is.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn change_gpu_count(&self, mut state: FormState, count: String) -> FormState {
        state.configuration.gpu_count = count;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NO_ACCELERATOR;

    fn resolver() -> HardwareConfigurationResolver {
        HardwareConfigurationResolver::new(Catalog::builtin(), None)
    }

    fn values(options: &[SelectOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn test_initial_state_without_profile() {
        let resolver = resolver();
        let state = resolver.initial_state(None);
        assert_eq!(state.configuration.machine_type.name, "n1-standard-1");
        assert!(!state.configuration.attach_gpu);
        assert!(state.configuration.gpu_type.is_none());
        assert_eq!(state.configuration.gpu_count, "");
        assert_eq!(values(&state.gpu_count_options), vec!["1", "2", "4", "8"]);
        assert_eq!(resolver.gpu_type_options().len(), 5);
    }

    #[test]
    fn test_attach_then_detach() {
        let resolver = resolver();
        let state = resolver.toggle_attach_gpu(resolver.initial_state(None), true);
        assert!(state.configuration.attach_gpu);
        assert_eq!(state.configuration.gpu_type.as_str(), "nvidia-tesla-k80");
        assert_eq!(state.configuration.gpu_count, "1");

        let state = resolver.toggle_attach_gpu(state, false);
        assert!(!state.configuration.attach_gpu);
        assert_eq!(state.configuration.gpu_type.as_str(), NO_ACCELERATOR);
        assert_eq!(state.configuration.gpu_count, "");
    }

    #[test]
    fn test_change_gpu_type_recomputes_counts() {
        let resolver = resolver();
        let state = resolver.toggle_attach_gpu(resolver.initial_state(None), true);
        let state = resolver.change_gpu_type(state, "nvidia-tesla-t4".into());
        assert_eq!(state.configuration.gpu_type.as_str(), "nvidia-tesla-t4");
        assert_eq!(values(&state.gpu_count_options), vec!["1", "2", "4"]);
        assert_eq!(state.configuration.gpu_count, "1");
    }

    #[test]
    fn test_machine_change_within_family_keeps_gpu() {
        let resolver = resolver();
        let state = resolver.toggle_attach_gpu(resolver.initial_state(None), true);
        let state = resolver.change_gpu_count(state, "4".to_string());
        let state =
            resolver.change_machine_type(state, MachineType::new("n1-highmem-8", "8 vCPUs, 52 GB RAM"));
        assert!(state.configuration.attach_gpu);
        assert_eq!(state.configuration.gpu_type.as_str(), "nvidia-tesla-k80");
        assert_eq!(state.configuration.gpu_count, "4");
        assert_eq!(state.configuration.machine_type.name, "n1-highmem-8");
    }

    #[test]
    fn test_machine_change_out_of_family_clears_gpu() {
        let resolver = resolver();
        let state = resolver.toggle_attach_gpu(resolver.initial_state(None), true);
        let state =
            resolver.change_machine_type(state, MachineType::new("e2-standard-4", "4 vCPUs, 16 GB RAM"));
        assert!(!state.configuration.attach_gpu);
        assert!(state.configuration.gpu_type.is_none());
        assert_eq!(state.configuration.gpu_count, "");
    }

    #[test]
    fn test_gpu_count_edit_touches_nothing_else() {
        let resolver = resolver();
        let before = resolver.toggle_attach_gpu(resolver.initial_state(None), true);
        let after = resolver.change_gpu_count(before.clone(), "8".to_string());
        assert_eq!(after.configuration.gpu_count, "8");
        assert_eq!(after.configuration.gpu_type, before.configuration.gpu_type);
        assert_eq!(after.configuration.machine_type, before.configuration.machine_type);
        assert_eq!(after.gpu_count_options, before.gpu_count_options);
    }

    #[test]
    fn test_profile_filters_gpu_types_by_platform() {
        let details: Details = serde_json::from_str(
            r#"{
                "instance": {
                    "name": "nb",
                    "machineType": {"name": "n1-standard-8", "description": ""},
                    "cpuPlatform": "Intel Skylake"
                },
                "gpu": {"type": "nvidia-tesla-v100", "count": 2},
                "acceleratorTypes": [
                    {"name": "nvidia-tesla-k80", "description": "NVIDIA Tesla K80", "maximumCardsPerInstance": 8, "unsupportedCpuPlatforms": ["Intel Skylake"]},
                    {"name": "nvidia-tesla-v100", "description": "NVIDIA Tesla V100", "minimumCardsPerInstance": 2, "maximumCardsPerInstance": 8}
                ]
            }"#,
        )
        .unwrap();

        let resolver = HardwareConfigurationResolver::new(Catalog::builtin(), Some(&details));
        assert_eq!(values(resolver.gpu_type_options()), vec!["nvidia-tesla-v100"]);

        let state = resolver.initial_state(Some(&details));
        assert!(state.configuration.attach_gpu);
        assert_eq!(state.configuration.gpu_count, "2");
        assert_eq!(values(&state.gpu_count_options), vec!["2", "4", "8"]);
    }

    #[test]
    fn test_profile_without_accelerators_uses_catalog() {
        let details: Details = serde_json::from_str(
            r#"{
                "instance": {
                    "name": "nb",
                    "machineType": {"name": "n1-standard-4", "description": ""},
                    "cpuPlatform": "Intel Haswell"
                }
            }"#,
        )
        .unwrap();

        let resolver = HardwareConfigurationResolver::new(Catalog::builtin(), Some(&details));
        assert_eq!(resolver.gpu_type_options().len(), 5);

        let state = resolver.toggle_attach_gpu(resolver.initial_state(Some(&details)), true);
        assert!(state.configuration.attach_gpu);
        assert_eq!(state.configuration.gpu_type.as_str(), "nvidia-tesla-k80");
        assert_eq!(state.configuration.gpu_count, "1");

        let state = resolver.change_gpu_type(state, "nvidia-tesla-t4".into());
        assert_eq!(values(&state.gpu_count_options), vec!["1", "2", "4"]);
    }

    #[test]
    fn test_attach_refused_when_no_gpu_type_fits_platform() {
        let details: Details = serde_json::from_str(
            r#"{
                "instance": {
                    "name": "nb",
                    "machineType": {"name": "n1-standard-4", "description": ""},
                    "cpuPlatform": "Intel Skylake"
                },
                "acceleratorTypes": [
                    {"name": "nvidia-tesla-k80", "description": "NVIDIA Tesla K80", "maximumCardsPerInstance": 8, "unsupportedCpuPlatforms": ["Intel Skylake"]}
                ]
            }"#,
        )
        .unwrap();

        let resolver = HardwareConfigurationResolver::new(Catalog::builtin(), Some(&details));
        assert!(resolver.gpu_type_options().is_empty());

        let before = resolver.initial_state(Some(&details));
        let after = resolver.toggle_attach_gpu(before.clone(), true);
        assert_eq!(after, before);
        assert!(!after.configuration.attach_gpu);
        assert!(after.configuration.gpu_type.is_none());
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            "attach-gpu=true".parse::<HardwareEvent>().unwrap(),
            HardwareEvent::AttachGpu(true)
        );
        assert_eq!(
            "gpu-type=nvidia-tesla-t4".parse::<HardwareEvent>().unwrap(),
            HardwareEvent::GpuType("nvidia-tesla-t4".into())
        );
        assert_eq!(
            "gpu-count=2".parse::<HardwareEvent>().unwrap(),
            HardwareEvent::GpuCount("2".to_string())
        );
        match "machine-type=n1-standard-2".parse::<HardwareEvent>().unwrap() {
            HardwareEvent::MachineType(machine) => assert_eq!(machine.name, "n1-standard-2"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_events() {
        for input in ["attach-gpu", "attach-gpu=maybe", "gpu-type=", "cpu=4"] {
            let err = input.parse::<HardwareEvent>().unwrap_err();
            assert!(matches!(err, HardwareError::InvalidEvent(_)), "input: {input}");
        }
    }

    #[test]
    fn test_event_display_round_trips() {
        let event = HardwareEvent::GpuCount("4".to_string());
        assert_eq!(event.to_string().parse::<HardwareEvent>().unwrap(), event);
    }
}
