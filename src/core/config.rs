use std::collections::BTreeMap;

/// Piecewise-linear amplification curve for the satisfaction boost.
///
/// Scores above `neutral_score` grow the factor by `step` per point, capped
/// at `1 + max_boost`. Scores at or below neutral leave the factor at 1.
#[derive(Debug, Clone, Copy)]
pub struct SatisfactionCurve {
    pub neutral_score: f64,
    pub step: f64,
    pub max_boost: f64,
}

/// Late-career adjustment: matched against the stage-of-life answer.
#[derive(Debug, Clone)]
pub struct StageOfLifeRule {
    pub label: String,
    pub multiply_delta: i32,
    pub freedom_delta: i32,
}

/// Gig-economy adjustment: matched against the income-stability answer.
#[derive(Debug, Clone)]
pub struct CareerVolatilityRule {
    pub label: String,
    pub essentials_delta: i32,
    pub freedom_delta: i32,
}

/// Low financial-literacy adjustment. Fires when the self-reported literacy
/// level is answered and at or below `max_level`.
#[derive(Debug, Clone, Copy)]
pub struct FinancialConfidenceRule {
    pub max_level: f64,
    pub multiply_delta: i32,
    pub essentials_delta: i32,
    pub freedom_delta: i32,
}

/// Tuning constants for the allocation engine.
///
/// Loaded once and shared across every profile scored in a run. Passing the
/// struct into the engine (instead of reading a global) lets tests substitute
/// alternate tables.
#[derive(Debug, Clone)]
pub struct Tuning {
    pub satisfaction: SatisfactionCurve,
    /// Essentials-spending bracket code -> percent midpoint of the bracket.
    pub essentials_midpoints: BTreeMap<String, f64>,
    /// Absolute lower bound on the Essentials share, whatever was reported.
    pub min_essentials_pct: f64,
    /// Reported midpoints above this trigger an overspend warning.
    pub max_recommended_essentials_pct: f64,
    /// Months of runway the emergency-fund warning refers to.
    pub emergency_fund_threshold_months: u32,
    /// Income brackets where a maxed-out debt load raises the debt red flag.
    pub high_debt_income_ranges: Vec<String>,
    pub min_invest_pct: f64,
    pub max_enjoyment_pct: f64,
    /// Per-bucket clamp bounds for the accumulated modifier.
    pub max_positive_mod: i32,
    pub max_negative_mod: i32,
    /// Rounding granularity divisor: 1 = whole percent, 0.5 = half percent.
    pub round_factor: f64,
    pub stage_of_life: StageOfLifeRule,
    pub career_volatility: CareerVolatilityRule,
    pub financial_confidence: FinancialConfidenceRule,
}

impl Tuning {
    /// Percent midpoint for an essentials bracket code, 0 for unknown codes.
    pub fn essentials_midpoint(&self, bracket: &str) -> f64 {
        self.essentials_midpoints
            .get(bracket)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_high_debt_income(&self, bracket: &str) -> bool {
        self.high_debt_income_ranges.iter().any(|r| r == bracket)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        let essentials_midpoints = [
            ("A", 40.0),
            ("B", 50.0),
            ("C", 60.0),
            ("D", 70.0),
            ("E", 80.0),
            ("F", 90.0),
        ]
        .into_iter()
        .map(|(code, midpoint)| (code.to_string(), midpoint))
        .collect::<BTreeMap<_, _>>();

        Self {
            satisfaction: SatisfactionCurve {
                neutral_score: 5.0,
                step: 0.1,
                max_boost: 0.3,
            },
            essentials_midpoints,
            min_essentials_pct: 5.0,
            max_recommended_essentials_pct: 60.0,
            emergency_fund_threshold_months: 3,
            high_debt_income_ranges: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            min_invest_pct: 10.0,
            max_enjoyment_pct: 30.0,
            max_positive_mod: 50,
            max_negative_mod: 30,
            round_factor: 1.0,
            stage_of_life: StageOfLifeRule {
                label: "Winding down toward retirement".to_string(),
                multiply_delta: -10,
                freedom_delta: 10,
            },
            career_volatility: CareerVolatilityRule {
                label: "Freelance / gig work".to_string(),
                essentials_delta: 5,
                freedom_delta: 5,
            },
            financial_confidence: FinancialConfidenceRule {
                max_level: 3.0,
                multiply_delta: -5,
                essentials_delta: 5,
                freedom_delta: 5,
            },
        }
    }
}
