//! Persona generation: demographic buckets → flat ordered list of named agents.

use serde::{Deserialize, Serialize};

/// One trait value: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    /// Single value, e.g. `"teacher"`.
    One(String),
    /// Multi-valued, e.g. `["teacher", "tutor"]`.
    Many(Vec<String>),
}

impl TraitValue {
    /// Render for prompt text; multi-valued traits joined by `", "`.
    pub fn render(&self) -> String {
        match self {
            Self::One(value) => value.clone(),
            Self::Many(values) => values.join(", "),
        }
    }

    /// An empty string or empty list counts as absent.
    fn is_present(&self) -> bool {
        match self {
            Self::One(value) => !value.is_empty(),
            Self::Many(values) => !values.is_empty(),
        }
    }
}

/// One demographic bucket from the request: how many personas to create plus
/// the traits they share. Input-only, never mutated after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicBucket {
    /// Number of personas this bucket expands into; `0` contributes nothing.
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<TraitValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<TraitValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<TraitValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_range: Option<TraitValue>,
}

/// Trait mapping carried by a persona. Absent attributes are omitted, not
/// defaulted; these exact values are copied into every message the persona
/// produces (wire names stay camelCase).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaTraits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<TraitValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<TraitValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<TraitValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_range: Option<TraitValue>,
}

impl PersonaTraits {
    fn from_bucket(bucket: &DemographicBucket) -> Self {
        Self {
            occupation: bucket.occupation.clone().filter(TraitValue::is_present),
            age_range: bucket.age_range.clone().filter(TraitValue::is_present),
            gender: bucket.gender.clone().filter(TraitValue::is_present),
            income_range: bucket.income_range.clone().filter(TraitValue::is_present),
        }
    }

    /// Render as `"key: value"` segments joined by `". "`, keys in wire form.
    pub fn render(&self) -> String {
        let mut segments = Vec::new();
        if let Some(ref value) = self.occupation {
            segments.push(format!("occupation: {}", value.render()));
        }
        if let Some(ref value) = self.age_range {
            segments.push(format!("ageRange: {}", value.render()));
        }
        if let Some(ref value) = self.gender {
            segments.push(format!("gender: {}", value.render()));
        }
        if let Some(ref value) = self.income_range {
            segments.push(format!("incomeRange: {}", value.render()));
        }
        segments.join(". ")
    }
}

/// A synthetic focus-group participant, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Display name, `"Agent N"` with global 1-based numbering.
    pub name: String,
    /// Trait mapping copied from the originating bucket.
    pub traits: PersonaTraits,
}

/// Expand buckets into personas. Output length equals the sum of `count`
/// across buckets; numbering is global and sequential across buckets, so
/// bucket order is preserved. No error conditions.
pub fn generate_personas(buckets: &[DemographicBucket]) -> Vec<Persona> {
    let mut personas = Vec::new();
    let mut number = 1u32;
    for bucket in buckets {
        for _ in 0..bucket.count {
            personas.push(Persona {
                name: format!("Agent {number}"),
                traits: PersonaTraits::from_bucket(bucket),
            });
            number += 1;
        }
    }
    personas
}
