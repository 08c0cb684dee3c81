use crate::error::{MediaError, MediaResult};
use std::collections::HashSet;
use std::fmt;

pub const MEDIA_MODULE: &str = "Media";
pub const OBJECT_RESOURCE: &str = "Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Use,
    Manage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Use => f.write_str("Use"),
            Capability::Manage => f.write_str("Manage"),
        }
    }
}

/// Capability check answering (module, resource, action) questions.
pub trait AccessControl: Send + Sync {
    fn check_access(&self, module: &str, resource: &str, action: Capability) -> bool;

    fn require(&self, module: &str, resource: &str, action: Capability) -> MediaResult<()> {
        if self.check_access(module, resource, action) {
            Ok(())
        } else {
            tracing::warn!("Access denied: {}/{}/{}", module, resource, action);
            Err(MediaError::AccessDenied)
        }
    }
}

/// Grants everything. Used when the surrounding application authenticates upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessControl for AllowAll {
    fn check_access(&self, _module: &str, _resource: &str, _action: Capability) -> bool {
        true
    }
}

/// Explicit grant set
#[derive(Debug, Clone, Default)]
pub struct CapabilityPolicy {
    grants: HashSet<(String, String, Capability)>,
}

impl CapabilityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, module: &str, resource: &str, action: Capability) -> Self {
        self.grants
            .insert((module.to_string(), resource.to_string(), action));
        self
    }

    /// Read-only access to media objects
    pub fn media_reader() -> Self {
        Self::new().grant(MEDIA_MODULE, OBJECT_RESOURCE, Capability::Use)
    }

    pub fn media_manager() -> Self {
        Self::media_reader().grant(MEDIA_MODULE, OBJECT_RESOURCE, Capability::Manage)
    }
}

impl AccessControl for CapabilityPolicy {
    fn check_access(&self, module: &str, resource: &str, action: Capability) -> bool {
        self.grants
            .contains(&(module.to_string(), resource.to_string(), action))
    }
}
