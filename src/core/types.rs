use serde::Serialize;

/// One intake response, flattened by the normalizer upstream of the engine.
///
/// Categorical fields are free-form strings: an unrecognized value matches no
/// rule and is never an error. Numeric self-report scores are on a 0-10 scale
/// where 0 means the question was left unanswered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub priority: String,
    pub income_range: String,
    pub essentials_range: String,
    pub debt_load: String,
    pub interest_level: String,
    pub emergency_fund: String,
    pub income_stability: String,
    pub goal_timeline: String,
    pub dependents: String,
    pub stage_of_life: String,

    pub satisfaction: f64,
    pub discipline: f64,
    pub impulse: f64,
    pub long_term: f64,
    pub emotion_spend: f64,
    pub emotion_safety: f64,
    pub avoidance: f64,
    pub lifestyle: f64,
    pub growth: f64,
    pub stability: f64,
    pub autonomy: f64,
    pub literacy_level: f64,
}

/// A value per bucket: Multiply (investing), Essentials (cost of living),
/// Freedom (debt and reserves), Enjoyment (discretionary).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSplit {
    pub multiply: f64,
    pub essentials: f64,
    pub freedom: f64,
    pub enjoyment: f64,
}

impl BucketSplit {
    pub fn total(self) -> f64 {
        self.multiply + self.essentials + self.freedom + self.enjoyment
    }
}

/// Note text for one bucket, kept per rule category so the trace can show
/// which kind of answer drove each adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketNotes {
    pub financial: String,
    pub behavioral: String,
    pub motivational: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierNotes {
    pub multiply: BucketNotes,
    pub essentials: BucketNotes,
    pub freedom: BucketNotes,
    pub enjoyment: BucketNotes,
}

/// Per-bucket coaching copy for the report columns, plus a fixed summary line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightNotes {
    pub multiply: String,
    pub essentials: String,
    pub freedom: String,
    pub enjoyment: String,
    pub summary: String,
}

/// Read-only trace of how the final split was reached. Nothing in here feeds
/// back into the percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDetails {
    pub base_priority: String,
    pub base_weights: String,
    pub raw_scores: String,
    pub normalized_scores: String,
    pub modifiers: ModifierNotes,
    pub detailed_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub percentages: BucketSplit,
    pub light_notes: LightNotes,
    pub details: AllocationDetails,
}
