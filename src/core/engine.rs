use super::config::{SatisfactionCurve, Tuning};
use super::types::{
    AllocationDetails, AllocationResult, BucketNotes, BucketSplit, LightNotes, ModifierNotes,
    Profile,
};

/// Score at or above which a 0-10 answer counts as high.
const SCORE_HIGH: f64 = 8.0;
/// Score at or below which an answered question counts as low.
const SCORE_LOW: f64 = 3.0;
const AVOIDANCE_HIGH: f64 = 7.0;

const SUMMARY_NOTE: &str =
    "These percentages are a starting point; revisit them with your coach as life changes.";

#[derive(Debug, Clone, Copy)]
struct BaseWeights {
    multiply: i32,
    essentials: i32,
    freedom: i32,
    enjoyment: i32,
}

const DEFAULT_BASE: BaseWeights = BaseWeights {
    multiply: 25,
    essentials: 25,
    freedom: 25,
    enjoyment: 25,
};

/// Starting split per stated priority. Every row sums to 100.
const BASE_WEIGHT_TABLE: &[(&str, BaseWeights)] = &[
    (
        "Build Long-Term Wealth",
        BaseWeights {
            multiply: 40,
            essentials: 25,
            freedom: 20,
            enjoyment: 15,
        },
    ),
    (
        "Get Out of Debt",
        BaseWeights {
            multiply: 15,
            essentials: 25,
            freedom: 45,
            enjoyment: 15,
        },
    ),
    (
        "Create Financial Stability",
        BaseWeights {
            multiply: 20,
            essentials: 35,
            freedom: 30,
            enjoyment: 15,
        },
    ),
    (
        "Save for a Major Purchase",
        BaseWeights {
            multiply: 30,
            essentials: 25,
            freedom: 30,
            enjoyment: 15,
        },
    ),
    (
        "Enjoy Life More",
        BaseWeights {
            multiply: 20,
            essentials: 25,
            freedom: 20,
            enjoyment: 35,
        },
    ),
    (
        "Gain Financial Independence",
        BaseWeights {
            multiply: 35,
            essentials: 25,
            freedom: 25,
            enjoyment: 15,
        },
    ),
    (
        "Provide for My Family",
        BaseWeights {
            multiply: 25,
            essentials: 35,
            freedom: 25,
            enjoyment: 15,
        },
    ),
    (
        "Build an Emergency Fund",
        BaseWeights {
            multiply: 20,
            essentials: 25,
            freedom: 40,
            enjoyment: 15,
        },
    ),
    (
        "Grow My Business",
        BaseWeights {
            multiply: 35,
            essentials: 30,
            freedom: 20,
            enjoyment: 15,
        },
    ),
    (
        "Retire Comfortably",
        BaseWeights {
            multiply: 40,
            essentials: 30,
            freedom: 20,
            enjoyment: 10,
        },
    ),
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BucketMods {
    multiply: i32,
    essentials: i32,
    freedom: i32,
    enjoyment: i32,
}

/// Compute the recommended four-bucket split for one intake profile.
///
/// Pure and total: unknown categorical answers match no rule, unanswered
/// scores (zero) apply no modifier, and no input can make it fail.
pub fn compute_allocations(profile: &Profile, tuning: &Tuning) -> AllocationResult {
    let base = base_weights(&profile.priority);
    let (mods, mut notes, sat_factor) = accumulate_modifiers(profile, tuning);

    let raw_multiply = base.multiply + mods.multiply;
    let raw_essentials = base.essentials + mods.essentials;
    let raw_freedom = base.freedom + mods.freedom;
    let raw_enjoyment = base.enjoyment + mods.enjoyment;
    let total_raw = (raw_multiply + raw_essentials + raw_freedom + raw_enjoyment) as f64;

    let mut percentages = if total_raw > 0.0 {
        BucketSplit {
            multiply: raw_multiply as f64 / total_raw * 100.0,
            essentials: raw_essentials as f64 / total_raw * 100.0,
            freedom: raw_freedom as f64 / total_raw * 100.0,
            enjoyment: raw_enjoyment as f64 / total_raw * 100.0,
        }
    } else {
        // Modifiers consumed the whole weight pool; there is nothing left to
        // split proportionally, so every share collapses to zero.
        BucketSplit::default()
    };

    // Pre-floor snapshot, rounded per bucket. Trace only, never re-normalized.
    let pre_floor = BucketSplit {
        multiply: percentages.multiply.round(),
        essentials: percentages.essentials.round(),
        freedom: percentages.freedom.round(),
        enjoyment: percentages.enjoyment.round(),
    };

    let reported_min = tuning.essentials_midpoint(&profile.essentials_range);
    let essentials_floor = reported_min.max(tuning.min_essentials_pct);
    let mut floor_applied = false;
    if percentages.essentials < essentials_floor {
        floor_applied = true;
        percentages.essentials = essentials_floor;
        let pool = percentages.multiply + percentages.freedom + percentages.enjoyment;
        let factor = rescale_factor(100.0 - essentials_floor, pool);
        percentages.multiply *= factor;
        percentages.freedom *= factor;
        percentages.enjoyment *= factor;
    }

    // Keyed to the reported midpoint, not the enforced floor.
    if reported_min > tuning.max_recommended_essentials_pct {
        push_note(
            &mut notes.essentials.behavioral,
            &format!(
                "Reported essentials spending around {reported_min}% of income is above the recommended {}% ceiling; look for costs to trim.",
                tuning.max_recommended_essentials_pct
            ),
        );
    }

    apply_red_flags(profile, tuning, &percentages, &mut notes);

    let rf = 1.0 / tuning.round_factor;
    percentages = BucketSplit {
        multiply: (percentages.multiply * rf).round() / rf,
        essentials: (percentages.essentials * rf).round() / rf,
        freedom: (percentages.freedom * rf).round() / rf,
        enjoyment: (percentages.enjoyment * rf).round() / rf,
    };

    let base_priority = if known_priority(&profile.priority) {
        profile.priority.clone()
    } else {
        "Balanced default".to_string()
    };
    let base_line = format_weights(base.multiply, base.essentials, base.freedom, base.enjoyment, "%");
    let raw_line = format_weights(raw_multiply, raw_essentials, raw_freedom, raw_enjoyment, "");
    let normalized_line = format_split(&pre_floor, "%");
    let final_line = format_split(&percentages, "%");

    let detailed_summary = build_detailed_summary(
        &base_priority,
        &base_line,
        &raw_line,
        &normalized_line,
        &final_line,
        sat_factor,
        floor_applied.then_some(essentials_floor),
        &notes,
    );

    let light_notes = build_light_notes(&notes);
    let details = AllocationDetails {
        base_priority,
        base_weights: base_line,
        raw_scores: raw_line,
        normalized_scores: normalized_line,
        modifiers: notes,
        detailed_summary,
    };

    AllocationResult {
        percentages,
        light_notes,
        details,
    }
}

fn base_weights(priority: &str) -> BaseWeights {
    BASE_WEIGHT_TABLE
        .iter()
        .find(|(name, _)| *name == priority)
        .map(|(_, weights)| *weights)
        .unwrap_or(DEFAULT_BASE)
}

fn known_priority(priority: &str) -> bool {
    BASE_WEIGHT_TABLE.iter().any(|(name, _)| *name == priority)
}

fn accumulate_modifiers(profile: &Profile, tuning: &Tuning) -> (BucketMods, ModifierNotes, f64) {
    let mut mods = BucketMods::default();
    let mut notes = ModifierNotes::default();

    apply_financial_rules(profile, &mut mods, &mut notes);

    // Amplification runs here on purpose: it scales only what the financial
    // phase accumulated. Behavioral and motivational deltas land afterwards
    // and are never amplified.
    let sat_factor = satisfaction_factor(profile.satisfaction, &tuning.satisfaction);
    amplify_positive_mods(&mut mods, sat_factor);

    apply_behavioral_rules(profile, &mut mods, &mut notes);
    apply_motivational_rules(profile, tuning, &mut mods, &mut notes);

    clamp_mods(&mut mods, tuning);

    (mods, notes, sat_factor)
}

fn apply_financial_rules(profile: &Profile, mods: &mut BucketMods, notes: &mut ModifierNotes) {
    match profile.income_range.as_str() {
        "A" => {
            mods.multiply -= 5;
            push_note(
                &mut notes.multiply.financial,
                "Income is tight right now, so the investing share starts smaller.",
            );
        }
        "E" => {
            mods.multiply += 10;
            push_note(
                &mut notes.multiply.financial,
                "Strong income leaves room for a larger investing share.",
            );
        }
        _ => {}
    }

    match profile.debt_load.as_str() {
        "D" => {
            mods.freedom += 10;
            push_note(
                &mut notes.freedom.financial,
                "A sizable debt balance shifts extra weight toward payoff.",
            );
        }
        "E" => {
            mods.freedom += 15;
            push_note(
                &mut notes.freedom.financial,
                "A heavy debt balance makes payoff the leading priority.",
            );
        }
        _ => {}
    }

    match profile.interest_level.as_str() {
        "High" => {
            mods.freedom += 10;
            push_note(
                &mut notes.freedom.financial,
                "High interest rates make faster payoff worthwhile.",
            );
        }
        "Low" => {
            mods.freedom -= 5;
            push_note(
                &mut notes.freedom.financial,
                "Low interest rates ease the urgency on payoff.",
            );
        }
        _ => {}
    }

    match profile.emergency_fund.as_str() {
        "A" | "B" => {
            mods.freedom += 10;
            push_note(
                &mut notes.freedom.financial,
                "A thin emergency cushion pulls weight into reserves.",
            );
        }
        "D" | "E" => {
            mods.freedom -= 10;
            push_note(
                &mut notes.freedom.financial,
                "Reserves already look solid, freeing weight for other goals.",
            );
        }
        _ => {}
    }

    match profile.income_stability.as_str() {
        "Unstable / irregular" => {
            mods.essentials += 5;
            mods.freedom += 5;
            push_note(
                &mut notes.essentials.financial,
                "Irregular income argues for more room around essentials.",
            );
            push_note(
                &mut notes.freedom.financial,
                "Irregular income also favors a deeper cash buffer.",
            );
        }
        "Very stable" => {
            mods.multiply += 5;
            push_note(
                &mut notes.multiply.financial,
                "Steady income can carry a little more investing risk.",
            );
        }
        _ => {}
    }
}

fn apply_behavioral_rules(profile: &Profile, mods: &mut BucketMods, notes: &mut ModifierNotes) {
    if profile.discipline >= SCORE_HIGH {
        mods.multiply += 10;
        push_note(
            &mut notes.multiply.behavioral,
            "Strong follow-through supports a bigger investing share.",
        );
    } else if answered_low(profile.discipline, SCORE_LOW) {
        mods.multiply -= 10;
        push_note(
            &mut notes.multiply.behavioral,
            "Low follow-through suggests starting the investing habit small.",
        );
    }

    if profile.impulse >= SCORE_HIGH {
        mods.enjoyment += 5;
        push_note(
            &mut notes.enjoyment.behavioral,
            "Good impulse control earns a little more guilt-free spending.",
        );
    } else if answered_low(profile.impulse, SCORE_LOW) {
        mods.enjoyment -= 10;
        push_note(
            &mut notes.enjoyment.behavioral,
            "Impulse spending is a risk, so the fun budget stays tighter.",
        );
    }

    if profile.long_term >= SCORE_HIGH {
        mods.multiply += 10;
        push_note(
            &mut notes.multiply.behavioral,
            "A long-horizon mindset supports compounding money.",
        );
    } else if answered_low(profile.long_term, SCORE_LOW) {
        mods.multiply -= 10;
        push_note(
            &mut notes.multiply.behavioral,
            "Short-horizon thinking trims the investing share for now.",
        );
    }

    if profile.emotion_spend >= SCORE_HIGH {
        mods.enjoyment += 10;
        push_note(
            &mut notes.enjoyment.behavioral,
            "Spending genuinely lifts your mood, so the plan leaves room for it.",
        );
    } else if answered_low(profile.emotion_spend, SCORE_LOW) {
        mods.enjoyment -= 5;
        push_note(
            &mut notes.enjoyment.behavioral,
            "Spending does little for your mood, so the fun budget shrinks a bit.",
        );
    }

    if profile.emotion_safety >= SCORE_HIGH {
        mods.essentials += 5;
        mods.freedom += 5;
        push_note(
            &mut notes.essentials.behavioral,
            "Financial safety matters to you, so essentials get extra slack.",
        );
        push_note(
            &mut notes.freedom.behavioral,
            "Financial safety matters to you, so reserves get extra weight.",
        );
    }

    if profile.avoidance >= AVOIDANCE_HIGH {
        mods.multiply -= 5;
        mods.freedom += 5;
        push_note(
            &mut notes.multiply.behavioral,
            "A tendency to avoid money decisions keeps the investing share simple and small.",
        );
        push_note(
            &mut notes.freedom.behavioral,
            "A tendency to avoid money decisions favors a buffer that needs no watching.",
        );
    }
}

fn apply_motivational_rules(
    profile: &Profile,
    tuning: &Tuning,
    mods: &mut BucketMods,
    notes: &mut ModifierNotes,
) {
    if profile.lifestyle >= SCORE_HIGH {
        mods.enjoyment += 10;
        push_note(
            &mut notes.enjoyment.motivational,
            "Lifestyle is a core motivator for you, and the split honors that.",
        );
    } else if answered_low(profile.lifestyle, SCORE_LOW) {
        mods.enjoyment -= 5;
        push_note(
            &mut notes.enjoyment.motivational,
            "Lifestyle ranks low for you, so discretionary spending gives way.",
        );
    }

    if profile.growth >= SCORE_HIGH {
        mods.multiply += 10;
        push_note(
            &mut notes.multiply.motivational,
            "A growth drive earns a bigger wealth-building share.",
        );
    }

    if profile.stability >= SCORE_HIGH {
        mods.freedom += 10;
        push_note(
            &mut notes.freedom.motivational,
            "A strong need for stability weights the safety net.",
        );
    }

    if matches!(
        profile.goal_timeline.as_str(),
        "Within 6 months" | "6–12 months"
    ) {
        mods.freedom += 10;
        push_note(
            &mut notes.freedom.motivational,
            "A near-term goal pulls weight into accessible money.",
        );
    }

    if profile.dependents == "Yes" {
        mods.essentials += 5;
        push_note(
            &mut notes.essentials.motivational,
            "Dependents raise the essentials baseline.",
        );
    }

    if profile.autonomy >= SCORE_HIGH {
        mods.multiply += 5;
        push_note(
            &mut notes.multiply.motivational,
            "Independence as a driver supports assets that work for you.",
        );
    } else if answered_low(profile.autonomy, SCORE_LOW) {
        mods.essentials += 5;
        mods.freedom += 5;
        push_note(
            &mut notes.essentials.motivational,
            "With independence ranking low, the plan leans protective.",
        );
        push_note(
            &mut notes.freedom.motivational,
            "With independence ranking low, the buffer gets extra weight.",
        );
    }

    if profile.stage_of_life == tuning.stage_of_life.label {
        mods.multiply += tuning.stage_of_life.multiply_delta;
        mods.freedom += tuning.stage_of_life.freedom_delta;
        push_note(
            &mut notes.multiply.motivational,
            "This close to retirement the investing share de-risks.",
        );
        push_note(
            &mut notes.freedom.motivational,
            "This close to retirement accessible reserves matter more.",
        );
    }

    if profile.income_stability == tuning.career_volatility.label {
        mods.essentials += tuning.career_volatility.essentials_delta;
        mods.freedom += tuning.career_volatility.freedom_delta;
        push_note(
            &mut notes.essentials.motivational,
            "Gig income favors a wider essentials margin.",
        );
        push_note(
            &mut notes.freedom.motivational,
            "Gig income favors a deeper cash buffer.",
        );
    }

    if answered_low(profile.literacy_level, tuning.financial_confidence.max_level) {
        mods.multiply += tuning.financial_confidence.multiply_delta;
        mods.essentials += tuning.financial_confidence.essentials_delta;
        mods.freedom += tuning.financial_confidence.freedom_delta;
        push_note(
            &mut notes.multiply.motivational,
            "While financial confidence grows, investing stays conservative.",
        );
        push_note(
            &mut notes.essentials.motivational,
            "While financial confidence grows, the plan protects the basics.",
        );
        push_note(
            &mut notes.freedom.motivational,
            "While financial confidence grows, cash reserves take priority.",
        );
    }
}

fn satisfaction_factor(satisfaction: f64, curve: &SatisfactionCurve) -> f64 {
    let raw = 1.0 + (satisfaction - curve.neutral_score).max(0.0) * curve.step;
    raw.min(1.0 + curve.max_boost)
}

/// Boost-only: positive modifiers scale up, zero and negative ones are left
/// exactly as accumulated.
fn amplify_positive_mods(mods: &mut BucketMods, factor: f64) {
    for modifier in [
        &mut mods.multiply,
        &mut mods.essentials,
        &mut mods.freedom,
        &mut mods.enjoyment,
    ] {
        if *modifier > 0 {
            *modifier = (*modifier as f64 * factor).round() as i32;
        }
    }
}

fn clamp_mods(mods: &mut BucketMods, tuning: &Tuning) {
    let lo = -tuning.max_negative_mod;
    let hi = tuning.max_positive_mod;
    mods.multiply = mods.multiply.clamp(lo, hi);
    mods.essentials = mods.essentials.clamp(lo, hi);
    mods.freedom = mods.freedom.clamp(lo, hi);
    mods.enjoyment = mods.enjoyment.clamp(lo, hi);
}

fn apply_red_flags(
    profile: &Profile,
    tuning: &Tuning,
    percentages: &BucketSplit,
    notes: &mut ModifierNotes,
) {
    if matches!(profile.emergency_fund.as_str(), "A" | "B") {
        push_note(
            &mut notes.freedom.financial,
            &format!(
                "Red flag: emergency savings cover less than {} months of expenses.",
                tuning.emergency_fund_threshold_months
            ),
        );
    }

    if profile.debt_load == "E" && tuning.is_high_debt_income(&profile.income_range) {
        push_note(
            &mut notes.freedom.financial,
            "Red flag: debt load is heavy relative to income; tackle the payoff plan first.",
        );
    }

    if percentages.multiply < tuning.min_invest_pct {
        push_note(
            &mut notes.multiply.financial,
            &format!(
                "Red flag: long-term investing fell below {}% of the plan; revisit once debt and reserves stabilize.",
                tuning.min_invest_pct
            ),
        );
    }

    if percentages.enjoyment > tuning.max_enjoyment_pct {
        push_note(
            &mut notes.enjoyment.behavioral,
            &format!(
                "Red flag: discretionary spending above {}% of the plan can crowd out the other goals.",
                tuning.max_enjoyment_pct
            ),
        );
    }
}

/// A zero score is an unanswered question, not a reported low.
fn answered_low(score: f64, threshold: f64) -> bool {
    score > 0.0 && score <= threshold
}

fn rescale_factor(available: f64, pool: f64) -> f64 {
    // Degenerate pool: the essentials floor already consumed everything, so
    // the remaining buckets collapse to zero rather than dividing by zero.
    if pool <= 0.0 {
        return 0.0;
    }
    available / pool
}

fn push_note(slot: &mut String, text: &str) {
    if !slot.is_empty() {
        slot.push(' ');
    }
    slot.push_str(text);
}

fn combined_note(notes: &BucketNotes, fallback: &str) -> String {
    let combined = [
        notes.financial.as_str(),
        notes.behavioral.as_str(),
        notes.motivational.as_str(),
    ]
    .iter()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    if combined.is_empty() {
        fallback.to_string()
    } else {
        combined
    }
}

fn build_light_notes(notes: &ModifierNotes) -> LightNotes {
    LightNotes {
        multiply: combined_note(
            &notes.multiply,
            "Your investing share follows your stated priority with no extra adjustments.",
        ),
        essentials: combined_note(
            &notes.essentials,
            "Essentials stay at the baseline implied by your priority.",
        ),
        freedom: combined_note(
            &notes.freedom,
            "Debt payoff and reserves stay at the baseline implied by your priority.",
        ),
        enjoyment: combined_note(
            &notes.enjoyment,
            "Guilt-free spending stays at the baseline implied by your priority.",
        ),
        summary: SUMMARY_NOTE.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_detailed_summary(
    base_priority: &str,
    base_line: &str,
    raw_line: &str,
    normalized_line: &str,
    final_line: &str,
    sat_factor: f64,
    essentials_floor: Option<f64>,
    notes: &ModifierNotes,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Base split for \"{base_priority}\": {base_line}."));
    out.push_str(&format!(
        "\n\nYour answers shifted the raw weights to {raw_line}, normalizing to {normalized_line}."
    ));
    if sat_factor > 1.0 {
        out.push_str(&format!(
            "\n\nSatisfaction above neutral amplified the positive financial adjustments by {sat_factor:.2}x."
        ));
    }
    if let Some(floor) = essentials_floor {
        out.push_str(&format!(
            "\n\nEssentials was raised to its {floor}% floor and the other buckets were rescaled to fit."
        ));
    }
    out.push_str(&format!("\n\nFinal recommendation: {final_line}."));
    out.push_str(&format!(
        "\n\nMultiply: {}\nEssentials: {}\nFreedom: {}\nEnjoyment: {}",
        combined_note(&notes.multiply, "No adjustments applied."),
        combined_note(&notes.essentials, "No adjustments applied."),
        combined_note(&notes.freedom, "No adjustments applied."),
        combined_note(&notes.enjoyment, "No adjustments applied."),
    ));
    out
}

fn format_weights(multiply: i32, essentials: i32, freedom: i32, enjoyment: i32, unit: &str) -> String {
    format!(
        "Multiply {multiply}{unit} | Essentials {essentials}{unit} | Freedom {freedom}{unit} | Enjoyment {enjoyment}{unit}"
    )
}

fn format_split(split: &BucketSplit, unit: &str) -> String {
    format!(
        "Multiply {}{unit} | Essentials {}{unit} | Freedom {}{unit} | Enjoyment {}{unit}",
        split.multiply, split.essentials, split.freedom, split.enjoyment
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{Strategy, any, prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn profile_with(priority: &str) -> Profile {
        Profile {
            priority: priority.to_string(),
            ..Profile::default()
        }
    }

    #[test]
    fn base_weight_rows_each_sum_to_100() {
        assert_eq!(BASE_WEIGHT_TABLE.len(), 10);
        for (name, weights) in BASE_WEIGHT_TABLE {
            let total =
                weights.multiply + weights.essentials + weights.freedom + weights.enjoyment;
            assert_eq!(total, 100, "base weights for {name} must sum to 100");
        }
        let default_total = DEFAULT_BASE.multiply
            + DEFAULT_BASE.essentials
            + DEFAULT_BASE.freedom
            + DEFAULT_BASE.enjoyment;
        assert_eq!(default_total, 100);
    }

    #[test]
    fn unknown_priority_falls_back_to_even_split() {
        let result = compute_allocations(&profile_with("nonexistent"), &Tuning::default());
        assert_approx(result.percentages.multiply, 25.0);
        assert_approx(result.percentages.essentials, 25.0);
        assert_approx(result.percentages.freedom, 25.0);
        assert_approx(result.percentages.enjoyment, 25.0);
        assert_eq!(result.details.base_priority, "Balanced default");
    }

    #[test]
    fn priority_lookup_is_exact_match_only() {
        let lower = compute_allocations(&profile_with("get out of debt"), &Tuning::default());
        assert_eq!(lower.details.base_priority, "Balanced default");

        let padded = compute_allocations(&profile_with("Get Out of Debt "), &Tuning::default());
        assert_eq!(padded.details.base_priority, "Balanced default");
    }

    #[test]
    fn debt_payoff_profile_matches_hand_calculation() {
        let mut profile = profile_with("Get Out of Debt");
        profile.debt_load = "E".to_string();
        profile.income_range = "A".to_string();
        profile.emergency_fund = "A".to_string();
        profile.essentials_range = "A".to_string();

        let result = compute_allocations(&profile, &Tuning::default());

        // Base 15/25/45/15; Freedom +15 +10, Multiply -5.
        assert_eq!(
            result.details.raw_scores,
            "Multiply 10 | Essentials 25 | Freedom 70 | Enjoyment 15"
        );
        assert_eq!(
            result.details.normalized_scores,
            "Multiply 8% | Essentials 21% | Freedom 58% | Enjoyment 13%"
        );

        // Floor max(40, 5) pins Essentials at 40 and rescales the rest by
        // 60 / 79.1666... before rounding.
        assert_approx(result.percentages.essentials, 40.0);
        assert_approx(result.percentages.multiply, 6.0);
        assert_approx(result.percentages.freedom, 44.0);
        assert_approx(result.percentages.enjoyment, 9.0);

        assert!(result.light_notes.freedom.contains("Red flag"));
        assert!(result.light_notes.multiply.contains("Red flag"));
        assert!(
            result
                .details
                .detailed_summary
                .contains("raised to its 40% floor")
        );
    }

    #[test]
    fn wealth_builder_with_high_discipline_lands_above_base_share() {
        let mut profile = profile_with("Build Long-Term Wealth");
        profile.discipline = 9.0;
        profile.long_term = 9.0;

        let result = compute_allocations(&profile, &Tuning::default());

        // Behavioral phase adds Multiply +20: raw 60/25/20/15 -> 50%.
        assert_approx(result.percentages.multiply, 50.0);
        assert!(result.percentages.multiply > 40.0);
        assert!((99.0..=101.0).contains(&result.percentages.total()));
    }

    #[test]
    fn satisfaction_amplifies_only_the_financial_phase() {
        let mut profile = Profile {
            satisfaction: 10.0,
            income_range: "E".to_string(),
            ..Profile::default()
        };
        let tuning = Tuning::default();

        let (mods, _, factor) = accumulate_modifiers(&profile, &tuning);
        assert_approx(factor, 1.3);
        assert_eq!(mods.multiply, 13); // round(10 * 1.3)

        // A behavioral boost lands after amplification and is added verbatim.
        profile.discipline = 9.0;
        let (mods, _, _) = accumulate_modifiers(&profile, &tuning);
        assert_eq!(mods.multiply, 23); // 13 + 10, never round(20 * 1.3)
    }

    #[test]
    fn amplification_never_shrinks_or_flips_modifiers() {
        let profile = Profile {
            satisfaction: 10.0,
            income_range: "A".to_string(),
            ..Profile::default()
        };
        let (mods, _, _) = accumulate_modifiers(&profile, &Tuning::default());
        assert_eq!(mods.multiply, -5);

        let mut mods = BucketMods {
            multiply: 0,
            essentials: -10,
            freedom: 10,
            enjoyment: 0,
        };
        amplify_positive_mods(&mut mods, 1.3);
        assert_eq!(mods.multiply, 0);
        assert_eq!(mods.essentials, -10);
        assert_eq!(mods.freedom, 13);
        assert_eq!(mods.enjoyment, 0);
    }

    #[test]
    fn satisfaction_factor_follows_the_curve() {
        let curve = Tuning::default().satisfaction;
        assert_approx(satisfaction_factor(0.0, &curve), 1.0);
        assert_approx(satisfaction_factor(5.0, &curve), 1.0);
        assert_approx(satisfaction_factor(6.0, &curve), 1.1);
        assert_approx(satisfaction_factor(7.0, &curve), 1.2);
        assert_approx(satisfaction_factor(10.0, &curve), 1.3); // clamped from 1.5
    }

    #[test]
    fn zero_scores_apply_no_low_end_modifiers() {
        // Every numeric answer left blank: only categorical rules may fire,
        // and none do here, so the split is exactly the base table row.
        let result = compute_allocations(
            &profile_with("Create Financial Stability"),
            &Tuning::default(),
        );
        assert_approx(result.percentages.multiply, 20.0);
        assert_approx(result.percentages.essentials, 35.0);
        assert_approx(result.percentages.freedom, 30.0);
        assert_approx(result.percentages.enjoyment, 15.0);
    }

    #[test]
    fn low_scores_apply_modifiers_once_answered() {
        let mut profile = profile_with("Create Financial Stability");
        profile.discipline = 1.0;
        let (mods, _, _) = accumulate_modifiers(&profile, &Tuning::default());
        assert_eq!(mods.multiply, -10);
    }

    #[test]
    fn positive_modifiers_clamp_at_the_upper_bound() {
        let profile = Profile {
            debt_load: "E".to_string(),               // Freedom +15
            interest_level: "High".to_string(),       // Freedom +10
            emergency_fund: "A".to_string(),          // Freedom +10
            income_stability: "Unstable / irregular".to_string(), // Freedom +5
            emotion_safety: 9.0,                      // Freedom +5
            avoidance: 7.0,                           // Freedom +5
            stability: 9.0,                           // Freedom +10
            goal_timeline: "Within 6 months".to_string(), // Freedom +10
            autonomy: 1.0,                            // Freedom +5
            ..Profile::default()
        };
        let tuning = Tuning::default();
        let (mods, _, _) = accumulate_modifiers(&profile, &tuning);
        assert_eq!(mods.freedom, tuning.max_positive_mod);
    }

    #[test]
    fn negative_modifiers_clamp_at_the_lower_bound() {
        let tuning = Tuning::default();
        let profile = Profile {
            income_range: "A".to_string(), // Multiply -5
            discipline: 1.0,               // Multiply -10
            long_term: 1.0,                // Multiply -10
            avoidance: 8.0,                // Multiply -5
            literacy_level: 1.0,           // Multiply -5
            stage_of_life: tuning.stage_of_life.label.clone(), // Multiply -10
            ..Profile::default()
        };
        let (mods, _, _) = accumulate_modifiers(&profile, &tuning);
        assert_eq!(mods.multiply, -tuning.max_negative_mod);
    }

    #[test]
    fn essentials_floor_pins_the_bucket_without_rescaling_it() {
        let mut profile = profile_with("Get Out of Debt");
        profile.essentials_range = "A".to_string();
        profile.debt_load = "E".to_string();

        let result = compute_allocations(&profile, &Tuning::default());
        // Pinned exactly at the floor; the rescale factor applies only to
        // the other three buckets.
        assert_approx(result.percentages.essentials, 40.0);
    }

    #[test]
    fn essentials_floor_skipped_when_share_is_already_above_it() {
        let result = compute_allocations(&profile_with("Provide for My Family"), &Tuning::default());
        // 35% essentials with a blank bracket (floor 5) stays untouched.
        assert_approx(result.percentages.essentials, 35.0);
        assert!(
            !result
                .details
                .detailed_summary
                .contains("raised to its")
        );
    }

    #[test]
    fn overspend_warning_keys_on_reported_midpoint_not_the_floor() {
        let mut profile = profile_with("nonexistent");
        profile.essentials_range = "E".to_string(); // midpoint 80 > 60 ceiling
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(result.light_notes.essentials.contains("above the recommended"));
        assert_approx(result.percentages.essentials, 80.0);

        profile.essentials_range = "B".to_string(); // midpoint 50, within ceiling
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(!result.light_notes.essentials.contains("above the recommended"));
    }

    #[test]
    fn high_debt_red_flag_requires_both_conditions() {
        let mut profile = profile_with("nonexistent");
        profile.debt_load = "E".to_string();
        profile.income_range = "B".to_string();
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(result.light_notes.freedom.contains("heavy relative to income"));

        profile.income_range = "E".to_string();
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(!result.light_notes.freedom.contains("heavy relative to income"));

        profile.debt_load = "D".to_string();
        profile.income_range = "A".to_string();
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(!result.light_notes.freedom.contains("heavy relative to income"));
    }

    #[test]
    fn enjoyment_above_cap_raises_a_red_flag() {
        let profile = Profile {
            priority: "Enjoy Life More".to_string(),
            impulse: 8.0,
            emotion_spend: 8.0,
            lifestyle: 8.0,
            ..Profile::default()
        };
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(result.percentages.enjoyment > 30.0);
        assert!(result.light_notes.enjoyment.contains("Red flag"));
    }

    #[test]
    fn emergency_fund_red_flag_fires_for_thin_reserves() {
        let mut profile = profile_with("nonexistent");
        profile.emergency_fund = "B".to_string();
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(result.light_notes.freedom.contains("emergency savings"));

        profile.emergency_fund = "C".to_string();
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(!result.light_notes.freedom.contains("emergency savings"));
    }

    #[test]
    fn rescale_factor_treats_empty_pool_as_zero() {
        assert_approx(rescale_factor(60.0, 0.0), 0.0);
        assert_approx(rescale_factor(60.0, -5.0), 0.0);
        assert_approx(rescale_factor(60.0, 80.0), 0.75);
    }

    #[test]
    fn total_floor_collapses_remaining_buckets_to_zero() {
        let tuning = Tuning {
            min_essentials_pct: 100.0,
            ..Tuning::default()
        };
        let result = compute_allocations(&profile_with("nonexistent"), &tuning);
        assert_approx(result.percentages.essentials, 100.0);
        assert_approx(result.percentages.multiply, 0.0);
        assert_approx(result.percentages.freedom, 0.0);
        assert_approx(result.percentages.enjoyment, 0.0);
    }

    #[test]
    fn light_notes_fall_back_to_fixed_copy_when_no_rules_fire() {
        let result = compute_allocations(&profile_with("nonexistent"), &Tuning::default());
        assert_eq!(
            result.light_notes.multiply,
            "Your investing share follows your stated priority with no extra adjustments."
        );
        assert_eq!(
            result.light_notes.essentials,
            "Essentials stay at the baseline implied by your priority."
        );
        assert_eq!(result.light_notes.summary, SUMMARY_NOTE);
    }

    #[test]
    fn detailed_summary_mentions_the_boost_only_when_amplified() {
        let mut profile = profile_with("nonexistent");
        profile.income_range = "E".to_string();

        let result = compute_allocations(&profile, &Tuning::default());
        assert!(!result.details.detailed_summary.contains("amplified"));

        profile.satisfaction = 10.0;
        let result = compute_allocations(&profile, &Tuning::default());
        assert!(result.details.detailed_summary.contains("amplified"));
        assert!(result.details.detailed_summary.contains("1.30x"));
    }

    #[test]
    fn coarse_round_factor_snaps_to_the_granularity() {
        let tuning = Tuning {
            round_factor: 5.0,
            ..Tuning::default()
        };
        let mut profile = profile_with("Build Long-Term Wealth");
        profile.discipline = 9.0;

        // Raw 50/25/20/15 normalizes to 45.45/22.73/18.18/13.64.
        let result = compute_allocations(&profile, &tuning);
        assert_approx(result.percentages.multiply, 45.0);
        assert_approx(result.percentages.essentials, 25.0);
        assert_approx(result.percentages.freedom, 20.0);
        assert_approx(result.percentages.enjoyment, 15.0);
    }

    #[test]
    fn identical_inputs_yield_identical_results() {
        let mut profile = profile_with("Gain Financial Independence");
        profile.satisfaction = 8.0;
        profile.income_range = "E".to_string();
        profile.emergency_fund = "A".to_string();
        profile.growth = 9.0;

        let tuning = Tuning::default();
        let first = compute_allocations(&profile, &tuning);
        let second = compute_allocations(&profile, &tuning);
        assert_eq!(first, second);
    }

    const PRIORITIES: [&str; 12] = [
        "Build Long-Term Wealth",
        "Get Out of Debt",
        "Create Financial Stability",
        "Save for a Major Purchase",
        "Enjoy Life More",
        "Gain Financial Independence",
        "Provide for My Family",
        "Build an Emergency Fund",
        "Grow My Business",
        "Retire Comfortably",
        "Something else entirely",
        "",
    ];
    const BRACKETS: [&str; 7] = ["A", "B", "C", "D", "E", "F", ""];
    const INTEREST: [&str; 3] = ["High", "Low", ""];
    const STABILITY_ANSWERS: [&str; 4] = [
        "Very stable",
        "Unstable / irregular",
        "Freelance / gig work",
        "",
    ];
    const TIMELINES: [&str; 4] = ["Within 6 months", "6–12 months", "1–3 years", ""];
    const STAGES: [&str; 3] = ["Winding down toward retirement", "Mid-career", ""];

    fn arb_profile() -> impl Strategy<Value = Profile> {
        let categoricals = (
            0usize..PRIORITIES.len(),
            0usize..BRACKETS.len(),
            0usize..BRACKETS.len(),
            0usize..BRACKETS.len(),
            0usize..INTEREST.len(),
            0usize..BRACKETS.len(),
            0usize..STABILITY_ANSWERS.len(),
            0usize..TIMELINES.len(),
            any::<bool>(),
            0usize..STAGES.len(),
        );
        (categoricals, proptest::array::uniform12(0u32..=10)).prop_map(
            |((pr, inc, ess, debt, int, em, stab, tl, dep, stage), s)| Profile {
                priority: PRIORITIES[pr].to_string(),
                income_range: BRACKETS[inc].to_string(),
                essentials_range: BRACKETS[ess].to_string(),
                debt_load: BRACKETS[debt].to_string(),
                interest_level: INTEREST[int].to_string(),
                emergency_fund: BRACKETS[em].to_string(),
                income_stability: STABILITY_ANSWERS[stab].to_string(),
                goal_timeline: TIMELINES[tl].to_string(),
                dependents: if dep { "Yes" } else { "No" }.to_string(),
                stage_of_life: STAGES[stage].to_string(),
                satisfaction: s[0] as f64,
                discipline: s[1] as f64,
                impulse: s[2] as f64,
                long_term: s[3] as f64,
                emotion_spend: s[4] as f64,
                emotion_safety: s[5] as f64,
                avoidance: s[6] as f64,
                lifestyle: s[7] as f64,
                growth: s[8] as f64,
                stability: s[9] as f64,
                autonomy: s[10] as f64,
                literacy_level: s[11] as f64,
            },
        )
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_final_split_respects_floor_and_rounding_tolerance(profile in arb_profile()) {
            let tuning = Tuning::default();
            let result = compute_allocations(&profile, &tuning);

            for (label, value) in [
                ("multiply", result.percentages.multiply),
                ("essentials", result.percentages.essentials),
                ("freedom", result.percentages.freedom),
                ("enjoyment", result.percentages.enjoyment),
            ] {
                prop_assert!(value.is_finite(), "{} must be finite", label);
            }

            let total = result.percentages.total();
            prop_assert!(
                (99.0..=101.0).contains(&total),
                "total {} outside rounding tolerance",
                total
            );

            let floor = tuning
                .essentials_midpoint(&profile.essentials_range)
                .max(tuning.min_essentials_pct);
            prop_assert!(
                result.percentages.essentials + 1e-9 >= floor,
                "essentials {} under its floor {}",
                result.percentages.essentials,
                floor
            );
        }

        #[test]
        fn prop_accumulated_modifiers_stay_within_clamp_bounds(profile in arb_profile()) {
            let tuning = Tuning::default();
            let (mods, _, _) = accumulate_modifiers(&profile, &tuning);
            for (label, value) in [
                ("multiply", mods.multiply),
                ("essentials", mods.essentials),
                ("freedom", mods.freedom),
                ("enjoyment", mods.enjoyment),
            ] {
                prop_assert!(
                    (-tuning.max_negative_mod..=tuning.max_positive_mod).contains(&value),
                    "{} modifier {} escaped the clamp",
                    label,
                    value
                );
            }
        }

        #[test]
        fn prop_scoring_is_deterministic(profile in arb_profile()) {
            let tuning = Tuning::default();
            prop_assert_eq!(
                compute_allocations(&profile, &tuning),
                compute_allocations(&profile, &tuning)
            );
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_satisfaction_factor_is_monotone_and_bounded(a in 0u32..=10, b in 0u32..=10) {
            let curve = Tuning::default().satisfaction;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let f_lo = satisfaction_factor(lo as f64, &curve);
            let f_hi = satisfaction_factor(hi as f64, &curve);
            prop_assert!(f_lo >= 1.0);
            prop_assert!(f_lo <= f_hi + 1e-12);
            prop_assert!(f_hi <= 1.0 + curve.max_boost + 1e-12);
        }
    }
}
