use std::fmt;

use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_SIMULATIONS: u64 = 1000;
pub const THRESHOLD_UNSET: f64 = -1.0;
pub const DEFAULT_PERCENTILE: f64 = 0.05;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "custom")]
    Custom,
}

impl DistanceMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::Default => "default",
            DistanceMetric::Custom => "custom",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[serde(rename = "inference")]
    Inference,
    #[serde(rename = "comparison")]
    Comparison,
}

impl Objective {
    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Inference => "inference",
            Objective::Comparison => "comparison",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "rejection")]
    Rejection,
    #[serde(rename = "logistic")]
    Logistic,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Rejection => "rejection",
            Method::Logistic => "logistic",
        }
    }
}

/// Model-test selection. Serialized as JSON `false` (off) or a
/// non-negative model index, matching the project snapshot schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelTest {
    #[default]
    Off,
    Index(usize),
}

impl Serialize for ModelTest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ModelTest::Off => serializer.serialize_bool(false),
            ModelTest::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

impl<'de> Deserialize<'de> for ModelTest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ModelTestVisitor;

        impl Visitor<'_> for ModelTestVisitor {
            type Value = ModelTest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("false or a non-negative model index")
            }

            fn visit_bool<E>(self, value: bool) -> Result<ModelTest, E>
            where
                E: serde::de::Error,
            {
                if value {
                    return Err(E::custom("model test cannot be `true`; use an index"));
                }
                Ok(ModelTest::Off)
            }

            fn visit_u64<E>(self, value: u64) -> Result<ModelTest, E>
            where
                E: serde::de::Error,
            {
                Ok(ModelTest::Index(value as usize))
            }

            fn visit_i64<E>(self, value: i64) -> Result<ModelTest, E>
            where
                E: serde::de::Error,
            {
                usize::try_from(value)
                    .map(ModelTest::Index)
                    .map_err(|_| E::custom("model test index must be non-negative"))
            }
        }

        deserializer.deserialize_any(ModelTestVisitor)
    }
}

/// Run settings as a typed record. The snapshot schema's recognized keys
/// are fields here; unknown keys are rejected at the serde boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    pub outputdir: String,
    pub distance_metric: DistanceMetric,
    pub simulations: u64,
    pub threshold: f64,
    pub percentile: f64,
    pub objective: Objective,
    pub method: Method,
    pub modeltest: ModelTest,
    #[serde(with = "ordered_map")]
    pub fixedparameters: Vec<(String, f64)>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            outputdir: String::new(),
            distance_metric: DistanceMetric::Default,
            simulations: DEFAULT_SIMULATIONS,
            threshold: THRESHOLD_UNSET,
            percentile: DEFAULT_PERCENTILE,
            objective: Objective::Comparison,
            method: Method::Logistic,
            modeltest: ModelTest::Off,
            fixedparameters: Vec::new(),
        }
    }
}

/// Serializes `Vec<(String, f64)>` as a JSON object, keeping insertion
/// order in both directions.
mod ordered_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(entries: &[(String, f64)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (name, value) in entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor;

        impl<'de> Visitor<'de> for OrderedMapVisitor {
            type Value = Vec<(String, f64)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter name to value")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = Vec::new();
                while let Some(entry) = map.next_entry::<String, f64>()? {
                    out.push(entry);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor)
    }
}
