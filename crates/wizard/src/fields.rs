//! Basic settings fields
//!
//! A closed set of field identities with static descriptors carrying the
//! required/visibility/validation predicates. Whether the whole settings
//! step is valid falls out of the descriptors: every currently required
//! field must be present, and no present, currently visible field may
//! carry a validation message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel flavor meaning user-specified CPU and memory
pub const CUSTOM_FLAVOR: &str = "Custom";

/// Identity of a basic-settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKey {
    Name,
    Description,
    Namespace,
    ImageSourceType,
    RegistryImage,
    ImageUrl,
    OperatingSystem,
    Flavor,
    Memory,
    Cpu,
    WorkloadProfile,
    StartVm,
    CloudInit,
    Hostname,
    AuthKeys,
}

/// A field's current value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }
}

/// A field's value together with its validation outcome
#[derive(Debug, Clone)]
pub struct FieldState {
    pub value: FieldValue,
    pub valid_msg: Option<String>,
}

/// Static description of one field
pub struct FieldDescriptor {
    pub key: FieldKey,
    pub title: &'static str,
    pub required: bool,
    /// Present only for fields that come and go with other selections
    pub is_visible: Option<fn(&BasicSettings) -> bool>,
    pub validate: Option<fn(&str) -> Option<&'static str>>,
}

/// How the machine's root image is provisioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProvisionSource {
    /// Network boot; the default when nothing was chosen
    #[default]
    Pxe,
    Url,
    Registry,
}

impl ProvisionSource {
    pub const PXE: &'static str = "PXE";
    pub const URL: &'static str = "URL";
    pub const REGISTRY: &'static str = "Registry";

    /// All selectable source names, in menu order
    pub const ALL: [&'static str; 3] = [Self::PXE, Self::URL, Self::REGISTRY];

    pub fn from_value(value: &str) -> Self {
        match value {
            Self::URL => ProvisionSource::Url,
            Self::REGISTRY => ProvisionSource::Registry,
            _ => ProvisionSource::Pxe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionSource::Pxe => Self::PXE,
            ProvisionSource::Url => Self::URL,
            ProvisionSource::Registry => Self::REGISTRY,
        }
    }
}

fn registry_visible(settings: &BasicSettings) -> bool {
    settings.text(FieldKey::ImageSourceType) == Some(ProvisionSource::REGISTRY)
}

fn url_visible(settings: &BasicSettings) -> bool {
    settings.text(FieldKey::ImageSourceType) == Some(ProvisionSource::URL)
}

fn custom_flavor_visible(settings: &BasicSettings) -> bool {
    settings.text(FieldKey::Flavor) == Some(CUSTOM_FLAVOR)
}

fn cloud_init_visible(settings: &BasicSettings) -> bool {
    settings.flag(FieldKey::CloudInit)
}

fn positive_number(value: &str) -> Option<&'static str> {
    let ok = value.parse::<u32>().map(|n| n > 0).unwrap_or(false);
    if ok { None } else { Some("must be a number") }
}

/// The basic-settings form, in display order
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: FieldKey::Name,
        title: "Name",
        required: true,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::Description,
        title: "Description",
        required: false,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::Namespace,
        title: "Namespace",
        required: true,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::ImageSourceType,
        title: "Provision Source",
        required: true,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::RegistryImage,
        title: "Registry Image",
        required: true,
        is_visible: Some(registry_visible),
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::ImageUrl,
        title: "URL",
        required: true,
        is_visible: Some(url_visible),
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::OperatingSystem,
        title: "Operating System",
        required: true,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::Flavor,
        title: "Flavor",
        required: true,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::Memory,
        title: "Memory (GB)",
        required: true,
        is_visible: Some(custom_flavor_visible),
        validate: Some(positive_number),
    },
    FieldDescriptor {
        key: FieldKey::Cpu,
        title: "CPUs",
        required: true,
        is_visible: Some(custom_flavor_visible),
        validate: Some(positive_number),
    },
    FieldDescriptor {
        key: FieldKey::WorkloadProfile,
        title: "Workload Profile",
        required: true,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::StartVm,
        title: "Start virtual machine on creation",
        required: false,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::CloudInit,
        title: "Use cloud-init",
        required: false,
        is_visible: None,
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::Hostname,
        title: "Hostname",
        required: true,
        is_visible: Some(cloud_init_visible),
        validate: None,
    },
    FieldDescriptor {
        key: FieldKey::AuthKeys,
        title: "Authenticated SSH Keys",
        required: true,
        is_visible: Some(cloud_init_visible),
        validate: None,
    },
];

pub fn descriptor(key: FieldKey) -> &'static FieldDescriptor {
    // FIELDS enumerates every FieldKey variant
    FIELDS
        .iter()
        .find(|d| d.key == key)
        .expect("descriptor table covers every field key")
}

/// The accumulated settings of the first wizard step
#[derive(Default)]
pub struct BasicSettings {
    fields: BTreeMap<FieldKey, FieldState>,
}

impl BasicSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a user edit: store the value together with the outcome of the
    /// field's validation predicate and the required-but-empty check.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) {
        let desc = descriptor(key);
        let mut valid_msg = None;

        if let FieldValue::Text(text) = &value {
            if let Some(validate) = desc.validate {
                valid_msg = validate(text).map(str::to_string);
            }
            if desc.required && text.trim().is_empty() {
                valid_msg = Some("is required".to_string());
            }
        }

        let valid_msg = valid_msg.map(|msg| format!("{} {}", desc.title, msg));
        self.fields.insert(key, FieldState { value, valid_msg });
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn text(&self, key: FieldKey) -> Option<&str> {
        self.fields.get(&key).and_then(|f| f.value.as_text())
    }

    pub fn flag(&self, key: FieldKey) -> bool {
        self.fields.get(&key).is_some_and(|f| f.value.as_flag())
    }

    pub fn valid_msg(&self, key: FieldKey) -> Option<&str> {
        self.fields
            .get(&key)
            .and_then(|f| f.valid_msg.as_deref())
    }

    pub fn provision_source(&self) -> ProvisionSource {
        self.text(FieldKey::ImageSourceType)
            .map(ProvisionSource::from_value)
            .unwrap_or_default()
    }

    fn is_visible(&self, desc: &FieldDescriptor) -> bool {
        desc.is_visible.map(|f| f(self)).unwrap_or(true)
    }

    /// Whether the field is required under the current selections
    pub fn is_field_required(&self, key: FieldKey) -> bool {
        let desc = descriptor(key);
        desc.required && self.is_visible(desc)
    }

    /// Step-gating validity over the whole form
    pub fn validate_wizard(&self) -> bool {
        let required = FIELDS
            .iter()
            .filter(|d| self.is_field_required(d.key))
            .count();
        let required_present = FIELDS
            .iter()
            .filter(|d| self.is_field_required(d.key) && self.contains(d.key))
            .count();
        if required != required_present {
            return false;
        }

        self.fields.iter().all(|(key, state)| {
            state.valid_msg.is_none() || !self.is_visible(descriptor(*key))
        })
    }
}

#[cfg(test)]
#[path = "fields_test.rs"]
mod fields_test;
