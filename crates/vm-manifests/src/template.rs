//! VM template catalog entry
//!
//! A template bundles a labelled, parameterised VirtualMachine definition.
//! The wizard narrows the catalog by label intersection, deep-clones the
//! winner, fills in its parameters and mutates the embedded VM object into
//! the final manifest. Templates themselves are never mutated in place.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use crate::vm::VirtualMachine;

/// Label prefixes for the three template axes. The full label key is
/// `"<prefix>/<value>"`, e.g. `os.template.kubevirt.io/fedora28`.
pub const TEMPLATE_OS_LABEL: &str = "os.template.kubevirt.io";
pub const TEMPLATE_WORKLOAD_LABEL: &str = "workload.template.kubevirt.io";
pub const TEMPLATE_FLAVOR_LABEL: &str = "flavor.template.kubevirt.io";

/// Parameter substituted with the machine name
pub const PARAM_VM_NAME: &str = "NAME";

/// Annotations naming the template's default boot devices
pub const DEFAULT_DISK_ANNOTATION: &str = "defaults.template.kubevirt.io/disk";
pub const DEFAULT_NETWORK_ANNOTATION: &str = "defaults.template.kubevirt.io/network";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TemplateParameter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<VirtualMachine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateParameter {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default)]
    pub required: bool,
}

impl Template {
    /// The VM object this template defines, if any
    pub fn vm_object(&self) -> Option<&VirtualMachine> {
        self.objects.first()
    }

    /// Set a parameter's value; unknown parameter names are ignored
    pub fn set_parameter_value(&mut self, name: &str, value: &str) {
        if let Some(param) = self.parameters.iter_mut().find(|p| p.name == name) {
            param.value = Some(value.to_string());
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }

    /// Whether the template carries the given label key
    pub fn has_label(&self, key: &str) -> bool {
        self.metadata
            .labels
            .as_ref()
            .is_some_and(|l| l.contains_key(key))
    }
}
