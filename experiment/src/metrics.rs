//! Metrics produced by the collection phase.
//!
//! A [`Metrics`] value is an ordered map from metric name to numeric value.
//! Ordering is by name so two equal runs serialize and render identically.
//!
//! Serialized values are plain numbers when finite. `NaN`, `inf` and `-inf`
//! are written as those strings, since JSON has no literal for them.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    values: BTreeMap<String, f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Records `value` under `name`, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.values.iter()
    }

    /// Compares two metric sets value by value.
    ///
    /// Values are compared on their bit pattern, so `NaN` matches `NaN` and
    /// `0.0` does not match `-0.0`. A name present on only one side is
    /// reported with `None` for the missing value.
    pub fn diff(&self, other: &Metrics) -> Vec<MetricDifference> {
        let mut differences = Vec::new();

        for (name, &left) in &self.values {
            match other.values.get(name) {
                Some(&right) if left.to_bits() == right.to_bits() => {}
                right => differences.push(MetricDifference {
                    name: name.clone(),
                    first: Some(left),
                    second: right.copied(),
                }),
            }
        }

        for (name, &right) in &other.values {
            if !self.values.contains_key(name) {
                differences.push(MetricDifference {
                    name: name.clone(),
                    first: None,
                    second: Some(right),
                });
            }
        }

        differences.sort_by(|a, b| a.name.cmp(&b.name));
        differences
    }

    /// True when [`Metrics::diff`] finds nothing.
    pub fn matches(&self, other: &Metrics) -> bool {
        self.diff(other).is_empty()
    }
}

impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.values.iter().map(|(k, &v)| (k, MetricValue(v))))
    }
}

impl<'de> Deserialize<'de> for Metrics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = BTreeMap::<String, MetricValue>::deserialize(deserializer)?;
        Ok(Self {
            values: values.into_iter().map(|(k, v)| (k, v.0)).collect(),
        })
    }
}

/// Wire form of a single metric value.
struct MetricValue(f64);

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value == f64::INFINITY {
            serializer.serialize_str("inf")
        } else if value == f64::NEG_INFINITY {
            serializer.serialize_str("-inf")
        } else {
            serializer.serialize_f64(value)
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MetricValueVisitor;

        impl Visitor<'_> for MetricValueVisitor {
            type Value = MetricValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a number or one of \"NaN\", \"inf\", \"-inf\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MetricValue, E> {
                Ok(MetricValue(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MetricValue, E> {
                Ok(MetricValue(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MetricValue, E> {
                Ok(MetricValue(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MetricValue, E> {
                match v {
                    "NaN" | "nan" => Ok(MetricValue(f64::NAN)),
                    "inf" | "+inf" => Ok(MetricValue(f64::INFINITY)),
                    "-inf" => Ok(MetricValue(f64::NEG_INFINITY)),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(MetricValueVisitor)
    }
}

/// `serde(with)` adapter for optional metric values.
mod optional_value {
    use super::MetricValue;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(MetricValue).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<MetricValue>::deserialize(deserializer)?.map(|v| v.0))
    }
}

impl<'a> IntoIterator for &'a Metrics {
    type Item = (&'a String, &'a f64);
    type IntoIter = btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Metrics {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return write!(f, "(no metrics)");
        }
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

/// One metric whose value differs between two runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDifference {
    pub name: String,
    #[serde(with = "optional_value")]
    pub first: Option<f64>,
    #[serde(with = "optional_value")]
    pub second: Option<f64>,
}

impl fmt::Display for MetricDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "<missing>".to_string(), |v| v.to_string());
        write!(f, "{}: {} vs {}", self.name, show(self.first), show(self.second))
    }
}
