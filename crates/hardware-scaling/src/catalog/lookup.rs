//! Option-list lookups over accelerator availability.

use crate::types::{count_options, AcceleratorType, AcceleratorTypeInfo, SelectOption};

/// Legal GPU counts for `selected`, given the accelerators available in context.
///
/// Counts come from `canonical` narrowed to the accelerator's card limits.
/// Unknown accelerators (including the "no GPU" sentinel) get the full
/// canonical list, and so does a narrowing that would leave nothing.
#[must_use]
pub fn gpu_count_options(
    available: &[AcceleratorTypeInfo],
    selected: &AcceleratorType,
    canonical: &[u32],
) -> Vec<SelectOption> {
    let Some(info) = available.iter().find(|info| info.name == selected.as_str()) else {
        return count_options(canonical);
    };

    let counts: Vec<u32> = canonical
        .iter()
        .copied()
        .filter(|count| info.accepts_count(*count))
        .collect();

    if counts.is_empty() {
        count_options(canonical)
    } else {
        count_options(&counts)
    }
}

/// GPU types that can be paired with `cpu_platform`, in availability order.
///
/// Without a platform every available accelerator is offered.
#[must_use]
pub fn gpu_type_options(
    available: &[AcceleratorTypeInfo],
    cpu_platform: Option<&str>,
) -> Vec<SelectOption> {
    available
        .iter()
        .filter(|info| {
            cpu_platform.is_none_or(|platform| {
                !info
                    .unsupported_cpu_platforms
                    .iter()
                    .any(|unsupported| unsupported == platform)
            })
        })
        .map(AcceleratorTypeInfo::to_option)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ACCELERATOR_COUNTS_1_2_4_8;

    fn values(options: &[SelectOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    fn available() -> Vec<AcceleratorTypeInfo> {
        vec![
            AcceleratorTypeInfo::new("nvidia-tesla-k80", "NVIDIA Tesla K80", 8)
                .unsupported_on("Intel Skylake"),
            AcceleratorTypeInfo::new("nvidia-tesla-t4", "NVIDIA Tesla T4", 4),
            AcceleratorTypeInfo::new("nvidia-tesla-a100", "NVIDIA Tesla A100", 8).with_minimum(4),
        ]
    }

    #[test]
    fn test_count_options_for_sentinel_are_canonical() {
        let options = gpu_count_options(
            &available(),
            &AcceleratorType::none(),
            &ACCELERATOR_COUNTS_1_2_4_8,
        );
        assert_eq!(values(&options), vec!["1", "2", "4", "8"]);
    }

    #[test]
    fn test_count_options_capped_by_maximum() {
        let options = gpu_count_options(
            &available(),
            &"nvidia-tesla-t4".into(),
            &ACCELERATOR_COUNTS_1_2_4_8,
        );
        assert_eq!(values(&options), vec!["1", "2", "4"]);
    }

    #[test]
    fn test_count_options_raised_by_minimum() {
        let options = gpu_count_options(
            &available(),
            &"nvidia-tesla-a100".into(),
            &ACCELERATOR_COUNTS_1_2_4_8,
        );
        assert_eq!(values(&options), vec!["4", "8"]);
    }

    #[test]
    fn test_count_options_never_empty() {
        let odd = vec![AcceleratorTypeInfo::new("odd", "Odd", 3).with_minimum(3)];
        let options = gpu_count_options(&odd, &"odd".into(), &ACCELERATOR_COUNTS_1_2_4_8);
        assert_eq!(options.len(), 4);
    }

    #[test]
    fn test_type_options_filtered_by_platform() {
        let options = gpu_type_options(&available(), Some("Intel Skylake"));
        assert_eq!(values(&options), vec!["nvidia-tesla-t4", "nvidia-tesla-a100"]);

        let options = gpu_type_options(&available(), Some("Intel Broadwell"));
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].label, "NVIDIA Tesla K80");
    }

    #[test]
    fn test_type_options_without_platform() {
        assert_eq!(gpu_type_options(&available(), None).len(), 3);
    }
}
