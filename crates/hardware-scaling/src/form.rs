//! Hardware scaling form.
//!
//! Thin adapter between a UI event system and the [`HardwareConfigurationResolver`].
//! The form owns one [`FormState`], drops edits the rendered form would not
//! allow (a disabled checkbox, hidden GPU selectors), exposes a render model,
//! and hands the finished configuration to the caller on submit.

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::profile::Details;
use crate::resolver::{FormState, HardwareConfigurationResolver, HardwareEvent};
use crate::types::{HardwareConfiguration, MachineType, SelectOption};

/// Form heading.
pub const TITLE: &str = "Hardware Scaling Limits";

/// Text shown under the heading.
pub const DESCRIPTION: &str = "The hardware scaling limits you configured will be the max capacity \
allowed for this notebook. You'll only pay for the time the hardware resources are on.";

/// Pricing link shown with [`DESCRIPTION`].
pub const PRICING_LINK: &str = "https://cloud.google.com/compute/all-pricing";

/// Text shown above the GPU controls.
pub const GPU_RESTRICTION_MESSAGE: &str = "Based on the zone, framework, and machine type of the \
instance, the available GPU types and the minimum number of GPUs that can be selected may vary.";

/// GPU documentation link shown with [`GPU_RESTRICTION_MESSAGE`].
pub const GPU_RESTRICTION_LINK: &str = "https://cloud.google.com/compute/docs/gpus";

/// Receives the outcome of the form.
pub trait FormCallbacks {
    /// Called once with the configuration when the user submits.
    fn on_submit(&mut self, configuration: HardwareConfiguration);

    /// Called when the user cancels.
    fn on_dialog_close(&mut self);
}

/// [`FormCallbacks`] backed by closures.
pub struct CallbackFns<S, C>
where
    S: FnMut(HardwareConfiguration),
    C: FnMut(),
{
    on_submit: S,
    on_dialog_close: C,
}

impl<S, C> CallbackFns<S, C>
where
    S: FnMut(HardwareConfiguration),
    C: FnMut(),
{
    /// Wrap a submit closure and a close closure.
    pub fn new(on_submit: S, on_dialog_close: C) -> Self {
        Self {
            on_submit,
            on_dialog_close,
        }
    }
}

impl<S, C> FormCallbacks for CallbackFns<S, C>
where
    S: FnMut(HardwareConfiguration),
    C: FnMut(),
{
    fn on_submit(&mut self, configuration: HardwareConfiguration) {
        (self.on_submit)(configuration);
    }

    fn on_dialog_close(&mut self) {
        (self.on_dialog_close)();
    }
}

/// A headed group of options in a nested select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionGroup {
    pub header: String,
    pub options: Vec<SelectOption>,
}

/// The "attach GPUs" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckboxView {
    pub checked: bool,
    pub disabled: bool,
}

/// GPU type and count selectors, present only while GPUs are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuFieldsView {
    pub gpu_type_options: Vec<SelectOption>,
    pub gpu_type: String,
    pub gpu_count_options: Vec<SelectOption>,
    pub gpu_count: String,
}

/// Everything needed to draw the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub title: &'static str,
    pub description: &'static str,
    pub pricing_link: &'static str,
    pub machine_type_groups: Vec<OptionGroup>,
    pub machine_type: SelectOption,
    pub gpu_restriction_message: &'static str,
    pub gpu_restriction_link: &'static str,
    pub attach_gpu: CheckboxView,
    pub gpu_fields: Option<GpuFieldsView>,
    pub close_label: &'static str,
    pub submit_label: &'static str,
}

/// One instantiation of the hardware scaling form.
pub struct HardwareScalingForm<C: FormCallbacks> {
    resolver: HardwareConfigurationResolver,
    state: FormState,
    callbacks: C,
}

impl<C: FormCallbacks> HardwareScalingForm<C> {
    /// Open the form for a new instance (`details == None`) or an existing one.
    pub fn new(catalog: Catalog, details: Option<&Details>, callbacks: C) -> Self {
        let resolver = HardwareConfigurationResolver::new(catalog, details);
        let state = resolver.initial_state(details);
        debug!(
            machine_type = %state.configuration.machine_type.name,
            attach_gpu = state.configuration.attach_gpu,
            "Opened hardware scaling form"
        );
        Self {
            resolver,
            state,
            callbacks,
        }
    }

    /// Current form state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Current configuration.
    pub fn configuration(&self) -> &HardwareConfiguration {
        &self.state.configuration
    }

    /// The resolver behind this form.
    pub fn resolver(&self) -> &HardwareConfigurationResolver {
        &self.resolver
    }

    /// Whether the "attach GPUs" checkbox is enabled.
    ///
    /// Requires a GPU-capable machine type and at least one GPU type to offer.
    pub fn attach_gpu_enabled(&self) -> bool {
        self.resolver
            .can_attach_gpu(&self.state.configuration.machine_type.name)
            && !self.resolver.gpu_type_options().is_empty()
    }

    /// Whether the GPU type and count selectors are shown.
    pub fn gpu_fields_visible(&self) -> bool {
        self.state.configuration.attach_gpu && self.attach_gpu_enabled()
    }

    /// Handle a user edit.
    ///
    /// Returns `false` when the edit targets a control that is disabled or
    /// hidden, in which case the state is unchanged.
    pub fn handle(&mut self, event: &HardwareEvent) -> bool {
        let accepted = match event {
            HardwareEvent::AttachGpu(_) => self.attach_gpu_enabled(),
            HardwareEvent::GpuType(_) | HardwareEvent::GpuCount(_) => self.gpu_fields_visible(),
            HardwareEvent::MachineType(_) => true,
        };

        if !accepted {
            debug!(event = %event, "Ignoring edit to an inactive control");
            return false;
        }

        self.state = self.resolver.apply(self.state.clone(), event);
        true
    }

    /// Render model for the current state.
    pub fn view(&self) -> FormView {
        let config = &self.state.configuration;
        let gpu_fields = self.gpu_fields_visible().then(|| GpuFieldsView {
            gpu_type_options: self.resolver.gpu_type_options().to_vec(),
            gpu_type: config.gpu_type.to_string(),
            gpu_count_options: self.state.gpu_count_options.clone(),
            gpu_count: config.gpu_count.clone(),
        });

        FormView {
            title: TITLE,
            description: DESCRIPTION,
            pricing_link: PRICING_LINK,
            machine_type_groups: self
                .resolver
                .catalog()
                .machine_types
                .iter()
                .map(|family| OptionGroup {
                    header: family.base.clone(),
                    options: family
                        .configurations
                        .iter()
                        .map(MachineType::to_option)
                        .collect(),
                })
                .collect(),
            machine_type: config.machine_type.to_option(),
            gpu_restriction_message: GPU_RESTRICTION_MESSAGE,
            gpu_restriction_link: GPU_RESTRICTION_LINK,
            attach_gpu: CheckboxView {
                checked: self.gpu_fields_visible(),
                disabled: !self.attach_gpu_enabled(),
            },
            gpu_fields,
            close_label: "Cancel",
            submit_label: "Next",
        }
    }

    /// Submit the form, handing a copy of the configuration to the caller.
    pub fn submit(mut self) -> C {
        let configuration = self.state.configuration.clone();
        info!(
            machine_type = %configuration.machine_type.name,
            gpu_type = %configuration.gpu_type,
            gpu_count = %configuration.gpu_count,
            "Submitting hardware configuration"
        );
        self.callbacks.on_submit(configuration);
        self.callbacks
    }

    /// Dismiss the form without submitting.
    pub fn dismiss(mut self) -> C {
        debug!("Hardware scaling form dismissed");
        self.callbacks.on_dialog_close();
        self.callbacks
    }
}
