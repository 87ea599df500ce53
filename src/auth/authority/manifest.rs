//! Service manifests
//!
//! A manifest declares a service's roles and attributes. Registration is
//! additive: re-registering an unchanged manifest is a no-op, and names absent
//! from a later manifest are kept.

use crate::core::models::{Attribute, AttributeType, AttributeValue, Role, Service};
use crate::utils::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Declarative description of a service's roles and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceManifest {
    /// Service name; used in cache keys, so it may not contain `:` or whitespace
    #[serde(alias = "name")]
    pub service: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleDeclaration>,
    #[serde(default)]
    pub attributes: Vec<AttributeDeclaration>,
}

/// A role entry in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDeclaration {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, alias = "global")]
    pub is_global: bool,
}

/// An attribute entry in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<AttributeValue>,
}

impl ServiceManifest {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            display_name: None,
            description: None,
            roles: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn role(mut self, name: impl Into<String>, is_global: bool) -> Self {
        self.roles.push(RoleDeclaration {
            name: name.into(),
            display_name: None,
            is_global,
        });
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, attribute_type: AttributeType) -> Self {
        self.attributes.push(AttributeDeclaration {
            name: name.into(),
            attribute_type,
            required: false,
            default: None,
        });
        self
    }

    pub fn attribute_with_default(
        mut self,
        name: impl Into<String>,
        attribute_type: AttributeType,
        default: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.push(AttributeDeclaration {
            name: name.into(),
            attribute_type,
            required: false,
            default: Some(default.into()),
        });
        self
    }

    /// Parse a YAML (or JSON) manifest
    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await.map_err(|e| {
            AuthzError::config(format!(
                "Failed to read manifest {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Structural checks that need no stored state
    pub fn validate(&self) -> Result<()> {
        validate_name("service", &self.service)?;

        let mut roles = HashSet::new();
        for role in &self.roles {
            validate_name("role", &role.name)?;
            if !roles.insert(role.name.as_str()) {
                return Err(AuthzError::duplicate(format!(
                    "role '{}' declared twice in manifest for '{}'",
                    role.name, self.service
                )));
            }
        }

        let mut attributes = HashSet::new();
        for attribute in &self.attributes {
            validate_name("attribute", &attribute.name)?;
            if !attributes.insert(attribute.name.as_str()) {
                return Err(AuthzError::duplicate(format!(
                    "attribute '{}' declared twice in manifest for '{}'",
                    attribute.name, self.service
                )));
            }
            if let Some(default) = &attribute.default {
                if !attribute.attribute_type.accepts(default) {
                    return Err(AuthzError::validation(format!(
                        "default for attribute '{}' is not a {}",
                        attribute.name, attribute.attribute_type
                    )));
                }
            }
        }

        Ok(())
    }

    /// Records this manifest declares
    pub fn to_records(&self) -> (Service, Vec<Role>, Vec<Attribute>) {
        let service = Service {
            name: self.service.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.service.clone()),
            description: self.description.clone().unwrap_or_default(),
        };
        let roles = self
            .roles
            .iter()
            .map(|r| Role {
                service: self.service.clone(),
                name: r.name.clone(),
                display_name: r.display_name.clone().unwrap_or_else(|| r.name.clone()),
                is_global: r.is_global,
            })
            .collect();
        let attributes = self
            .attributes
            .iter()
            .map(|a| Attribute {
                service: self.service.clone(),
                name: a.name.clone(),
                attribute_type: a.attribute_type,
                required: a.required,
                default: a.default.clone(),
            })
            .collect();
        (service, roles, attributes)
    }
}

fn validate_name(what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AuthzError::validation(format!("{} name cannot be empty", what)));
    }
    if name.contains(':') || name.chars().any(char::is_whitespace) {
        return Err(AuthzError::validation(format!(
            "{} name '{}' may not contain ':' or whitespace",
            what, name
        )));
    }
    Ok(())
}

/// Outcome of a manifest registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestReport {
    pub service: String,
    pub service_created: bool,
    pub service_updated: bool,
    pub roles_created: Vec<String>,
    pub roles_updated: Vec<String>,
    pub attributes_created: Vec<String>,
    pub attributes_updated: Vec<String>,
    /// Stored declarations the manifest no longer mentions; kept as is
    pub retained: Vec<String>,
}

impl ManifestReport {
    /// True when registration changed nothing
    pub fn is_noop(&self) -> bool {
        !self.service_created
            && !self.service_updated
            && self.roles_created.is_empty()
            && self.roles_updated.is_empty()
            && self.attributes_created.is_empty()
            && self.attributes_updated.is_empty()
    }
}
