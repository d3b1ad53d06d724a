use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named prior snippet. On the wire a prior is a single-entry map
/// `{ name: code }`, so serde impls are written by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prior {
    pub name: String,
    pub code: String,
}

impl Serialize for Prior {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.code)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Prior {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PriorVisitor;

        impl<'de> Visitor<'de> for PriorVisitor {
            type Value = Prior;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-entry map of prior name to code")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Prior, A::Error>
            where
                A: MapAccess<'de>,
            {
                let Some((name, code)) = map.next_entry::<String, String>()? else {
                    return Err(serde::de::Error::invalid_length(0, &self));
                };
                if map.next_entry::<String, String>()?.is_some() {
                    return Err(serde::de::Error::custom(
                        "prior entry holds more than one name",
                    ));
                }
                Ok(Prior { name, code })
            }
        }

        deserializer.deserialize_map(PriorVisitor)
    }
}

/// One statistical model of the analysis: a display name, an optional
/// simulate snippet, and an ordered list of uniquely named priors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    name: String,
    priors: Vec<Prior>,
    simulate: Option<String>,
}

impl Model {
    pub fn new(name: impl Into<String>, simulate: Option<String>) -> Self {
        Self {
            name: name.into(),
            priors: Vec::new(),
            simulate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn simulate(&self) -> Option<&str> {
        self.simulate.as_deref()
    }

    pub fn set_simulate(&mut self, code: impl Into<String>) {
        self.simulate = Some(code.into());
    }

    pub fn priors(&self) -> &[Prior] {
        &self.priors
    }

    /// Appends a prior unless the name is already taken. Returns whether
    /// the insertion happened; a duplicate leaves the list untouched.
    pub fn add_prior(&mut self, name: impl Into<String>, code: impl Into<String>) -> bool {
        let name = name.into();
        if self.priors.iter().any(|p| p.name == name) {
            return false;
        }
        self.priors.push(Prior {
            name,
            code: code.into(),
        });
        true
    }

    /// Removes the prior at `idx`. An out-of-range index is a caller bug
    /// (UI/state desync) and panics.
    pub fn remove_prior(&mut self, idx: usize) {
        self.priors.remove(idx);
    }

    pub fn has_priors(&self) -> bool {
        !self.priors.is_empty()
    }
}
