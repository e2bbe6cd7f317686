mod config;
mod engine;
mod types;

pub use config::{
    CareerVolatilityRule, FinancialConfidenceRule, SatisfactionCurve, StageOfLifeRule, Tuning,
};
pub use engine::compute_allocations;
pub use types::{
    AllocationDetails, AllocationResult, BucketNotes, BucketSplit, LightNotes, ModifierNotes,
    Profile,
};
