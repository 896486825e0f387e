//! Built-in Compute Engine hardware catalog.
//!
//! Machine types are listed family by family in display order. The first
//! configuration of the first family is the form's default machine type.

use crate::types::{AcceleratorTypeInfo, MachineType, MachineTypeFamily};

const N1_STANDARD: &[(&str, &str)] = &[
    ("n1-standard-1", "1 vCPU, 3.75 GB RAM"),
    ("n1-standard-2", "2 vCPUs, 7.5 GB RAM"),
    ("n1-standard-4", "4 vCPUs, 15 GB RAM"),
    ("n1-standard-8", "8 vCPUs, 30 GB RAM"),
    ("n1-standard-16", "16 vCPUs, 60 GB RAM"),
    ("n1-standard-32", "32 vCPUs, 120 GB RAM"),
    ("n1-standard-64", "64 vCPUs, 240 GB RAM"),
    ("n1-standard-96", "96 vCPUs, 360 GB RAM"),
];

const N1_HIGHMEM: &[(&str, &str)] = &[
    ("n1-highmem-2", "2 vCPUs, 13 GB RAM"),
    ("n1-highmem-4", "4 vCPUs, 26 GB RAM"),
    ("n1-highmem-8", "8 vCPUs, 52 GB RAM"),
    ("n1-highmem-16", "16 vCPUs, 104 GB RAM"),
    ("n1-highmem-32", "32 vCPUs, 208 GB RAM"),
    ("n1-highmem-64", "64 vCPUs, 416 GB RAM"),
    ("n1-highmem-96", "96 vCPUs, 624 GB RAM"),
];

const N1_HIGHCPU: &[(&str, &str)] = &[
    ("n1-highcpu-2", "2 vCPUs, 1.8 GB RAM"),
    ("n1-highcpu-4", "4 vCPUs, 3.6 GB RAM"),
    ("n1-highcpu-8", "8 vCPUs, 7.2 GB RAM"),
    ("n1-highcpu-16", "16 vCPUs, 14.4 GB RAM"),
    ("n1-highcpu-32", "32 vCPUs, 28.8 GB RAM"),
    ("n1-highcpu-64", "64 vCPUs, 57.6 GB RAM"),
    ("n1-highcpu-96", "96 vCPUs, 86.4 GB RAM"),
];

const E2_STANDARD: &[(&str, &str)] = &[
    ("e2-standard-2", "2 vCPUs, 8 GB RAM"),
    ("e2-standard-4", "4 vCPUs, 16 GB RAM"),
    ("e2-standard-8", "8 vCPUs, 32 GB RAM"),
    ("e2-standard-16", "16 vCPUs, 64 GB RAM"),
];

const N2_STANDARD: &[(&str, &str)] = &[
    ("n2-standard-2", "2 vCPUs, 8 GB RAM"),
    ("n2-standard-4", "4 vCPUs, 16 GB RAM"),
    ("n2-standard-8", "8 vCPUs, 32 GB RAM"),
    ("n2-standard-16", "16 vCPUs, 64 GB RAM"),
    ("n2-standard-32", "32 vCPUs, 128 GB RAM"),
];

fn family(base: &str, configurations: &[(&str, &str)]) -> MachineTypeFamily {
    MachineTypeFamily {
        base: base.to_string(),
        configurations: configurations
            .iter()
            .map(|(name, description)| MachineType::new(*name, *description))
            .collect(),
    }
}

/// Machine type families offered by the form.
pub(crate) fn machine_types() -> Vec<MachineTypeFamily> {
    vec![
        family("N1 standard", N1_STANDARD),
        family("N1 high-memory", N1_HIGHMEM),
        family("N1 high-CPU", N1_HIGHCPU),
        family("E2 standard", E2_STANDARD),
        family("N2 standard", N2_STANDARD),
    ]
}

/// Accelerator types offered when no zone availability is known.
pub(crate) fn accelerator_types() -> Vec<AcceleratorTypeInfo> {
    vec![
        AcceleratorTypeInfo::new("nvidia-tesla-k80", "NVIDIA Tesla K80", 8)
            .unsupported_on("Intel Skylake")
            .unsupported_on("Intel Cascade Lake"),
        AcceleratorTypeInfo::new("nvidia-tesla-p100", "NVIDIA Tesla P100", 4),
        AcceleratorTypeInfo::new("nvidia-tesla-v100", "NVIDIA Tesla V100", 8),
        AcceleratorTypeInfo::new("nvidia-tesla-p4", "NVIDIA Tesla P4", 4),
        AcceleratorTypeInfo::new("nvidia-tesla-t4", "NVIDIA Tesla T4", 4),
    ]
}
