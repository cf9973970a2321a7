//! Proxy configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::resource::RESOURCE_TYPE_OBJECT_REFERENCE;

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Resource type tag supplied when binding a target.
    pub resource_type: String,
    /// Publish `jmx.attribute.change` after a successful `set_attribute`.
    pub attribute_change_notifications: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            resource_type: RESOURCE_TYPE_OBJECT_REFERENCE.to_string(),
            attribute_change_notifications: true,
        }
    }
}

impl ProxyConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ProxyConfig::default();
        assert_eq!(cfg.resource_type, "ObjectReference");
        assert!(cfg.attribute_change_notifications);
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = ProxyConfig::from_json(r#"{ "attribute_change_notifications": false }"#).unwrap();
        assert_eq!(cfg.resource_type, "ObjectReference");
        assert!(!cfg.attribute_change_notifications);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = ProxyConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidConfig { .. }));
    }
}
