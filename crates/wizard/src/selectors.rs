//! Template catalog selectors
//!
//! Narrows the template catalog by progressively intersecting label
//! constraints. Each axis (operating system, workload profile, flavor) is
//! resolved while holding the other two axes' current selections fixed;
//! an absent selection simply constrains nothing.

use vm_manifests::{
    Template, TEMPLATE_FLAVOR_LABEL, TEMPLATE_OS_LABEL, TEMPLATE_WORKLOAD_LABEL,
};

use crate::fields::{BasicSettings, FieldKey, CUSTOM_FLAVOR};

fn label(settings: &BasicSettings, prefix: &str, key: FieldKey) -> Option<String> {
    settings.text(key).map(|value| format!("{prefix}/{value}"))
}

pub fn os_label(settings: &BasicSettings) -> Option<String> {
    label(settings, TEMPLATE_OS_LABEL, FieldKey::OperatingSystem)
}

pub fn workload_label(settings: &BasicSettings) -> Option<String> {
    label(settings, TEMPLATE_WORKLOAD_LABEL, FieldKey::WorkloadProfile)
}

/// The flavor constraint; the Custom sentinel constrains nothing since it
/// means user-specified CPU/memory rather than a templated preset
pub fn flavor_label(settings: &BasicSettings) -> Option<String> {
    match settings.text(FieldKey::Flavor) {
        Some(CUSTOM_FLAVOR) | None => None,
        Some(flavor) => Some(format!("{TEMPLATE_FLAVOR_LABEL}/{flavor}")),
    }
}

/// Templates carrying every present constraint label, catalog order
pub fn templates_with_labels<'a>(
    templates: &'a [Template],
    constraints: &[Option<String>],
) -> Vec<&'a Template> {
    templates
        .iter()
        .filter(|t| {
            constraints
                .iter()
                .flatten()
                .all(|label| t.has_label(label))
        })
        .collect()
}

/// Distinct values of the given label axis among the templates, in catalog
/// order; the first occurrence wins
pub fn label_values(templates: &[&Template], prefix: &str) -> Vec<String> {
    let prefix = format!("{prefix}/");
    let mut values: Vec<String> = Vec::new();
    for template in templates {
        let Some(labels) = template.metadata.labels.as_ref() else {
            continue;
        };
        for key in labels.keys() {
            if let Some(value) = key.strip_prefix(&prefix) {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
    }
    values
}

pub fn operating_systems(settings: &BasicSettings, templates: &[Template]) -> Vec<String> {
    let matching =
        templates_with_labels(templates, &[workload_label(settings), flavor_label(settings)]);
    label_values(&matching, TEMPLATE_OS_LABEL)
}

pub fn workload_profiles(settings: &BasicSettings, templates: &[Template]) -> Vec<String> {
    let matching = templates_with_labels(templates, &[os_label(settings), flavor_label(settings)]);
    label_values(&matching, TEMPLATE_WORKLOAD_LABEL)
}

/// Flavor choices always end with the synthetic Custom entry
pub fn flavors(settings: &BasicSettings, templates: &[Template]) -> Vec<String> {
    let matching =
        templates_with_labels(templates, &[workload_label(settings), os_label(settings)]);
    let mut flavors = label_values(&matching, TEMPLATE_FLAVOR_LABEL);
    flavors.push(CUSTOM_FLAVOR.to_string());
    flavors
}

/// The template a submission will be compiled from: the first catalog
/// entry satisfying all three axes, or `None` when the user's triple
/// matches nothing
pub fn resolve_template<'a>(
    settings: &BasicSettings,
    templates: &'a [Template],
) -> Option<&'a Template> {
    templates_with_labels(
        templates,
        &[
            os_label(settings),
            workload_label(settings),
            flavor_label(settings),
        ],
    )
    .into_iter()
    .next()
}

#[cfg(test)]
#[path = "selectors_test.rs"]
mod selectors_test;
