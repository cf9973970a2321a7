//! Identity of a notification broadcaster.
//!
//! Names follow the `domain:key=value[,key=value...]` layout. Key order is
//! normalized so `app:b=2,a=1` and `app:a=1,b=2` compare equal.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A parsed, canonical broadcaster name.
///
/// # Examples
///
/// ```
/// use modelbean::ObjectName;
///
/// let name = ObjectName::parse("app:type=Worker,id=7").unwrap();
/// assert_eq!(name.domain(), "app");
/// assert_eq!(name.property("type"), Some("Worker"));
/// assert_eq!(name.to_string(), "app:id=7,type=Worker");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
}

impl ObjectName {
    /// Parses a name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidObjectName` if the domain is empty,
    /// there are no key properties, or a property is malformed or repeated.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidObjectName {
            name: input.to_string(),
            reason: reason.to_string(),
        };

        let (domain, props) = input.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(invalid("empty domain"));
        }

        let mut properties = BTreeMap::new();
        for pair in props.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid("property must be key=value"))?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(invalid("empty property key or value"));
            }
            if properties.insert(key.to_string(), value.to_string()).is_some() {
                return Err(invalid("duplicate property key"));
            }
        }

        Ok(Self {
            domain: domain.to_string(),
            properties,
        })
    }

    /// The domain part.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Looks up a key property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
