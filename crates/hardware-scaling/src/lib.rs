//! Hardware scaling form logic for notebook instances.
//!
//! Lets a user pick a machine type and, on GPU-capable machines, a GPU type
//! and count before the selection is applied to a compute instance.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    events    ┌──────────────────────┐   on_submit   ┌────────────┐
//! │  UI / CLI    │ ───────────► │  HardwareScalingForm │ ────────────► │  caller    │
//! └──────────────┘ ◄─────────── │  (gating, view)      │  on_dialog_   │  (applies  │
//!                    FormView   └──────────┬───────────┘     close     │  resize)   │
//!                                          │ pure transitions          └────────────┘
//!                               ┌──────────▼───────────┐
//!                               │ HardwareConfiguration│ ◄── Catalog (injected)
//!                               │ Resolver             │ ◄── Details (existing VM)
//!                               └──────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use hardware_scaling::{Catalog, CallbackFns, HardwareEvent, HardwareScalingForm};
//!
//! let mut form = HardwareScalingForm::new(
//!     Catalog::builtin(),
//!     None,
//!     CallbackFns::new(|config| println!("{config:?}"), || {}),
//! );
//!
//! form.handle(&HardwareEvent::AttachGpu(true));
//! form.handle(&HardwareEvent::GpuType("nvidia-tesla-t4".into()));
//! form.submit();
//! ```

pub mod catalog;
pub mod error;
pub mod form;
pub mod profile;
pub mod resolver;
pub mod types;

pub use catalog::Catalog;
pub use error::{HardwareError, HardwareResult};
pub use form::{CallbackFns, FormCallbacks, FormView, HardwareScalingForm};
pub use profile::Details;
pub use resolver::{FormState, HardwareConfigurationResolver, HardwareEvent};
pub use types::{
    AcceleratorType, AcceleratorTypeInfo, HardwareConfiguration, MachineType, MachineTypeFamily,
    SelectOption, NO_ACCELERATOR,
};
