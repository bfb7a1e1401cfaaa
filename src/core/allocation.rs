use super::types::{
    AllocationWeights, EquitySubSplit, Exclusions, InvestorProfile, RiskLevel,
};

const SHORT_HORIZON_YEARS: u32 = 3;
const MEDIUM_HORIZON_YEARS: u32 = 5;
const LONG_HORIZON_YEARS: u32 = 8;

const LONG_TERM_GOLD: i64 = 7;
const LONG_TERM_SILVER: i64 = 3;
const AGE_RULE_BASE: i64 = 110;
const AGGRESSIVE_EQUITY_THRESHOLD: u32 = 80;
const INTERNATIONAL_EQUITY_SHARE: u32 = 15;

pub const SAFETY_NOTE: &str = "Safety is the priority for short durations.";
pub const AGGRESSIVE_NOTE: &str = "Aggressive growth strategy focused on wealth creation.";
pub const BALANCED_NOTE: &str = "Balanced approach for steady growth and stability.";
pub const SHORT_TERM_DEBT_WARNING: &str =
    "WARNING: Excluding Debt for a short-term goal is extremely risky.";
pub const COMMODITY_HEDGE_NOTE: &str = "Excluding Gold/Silver removes the inflation hedge.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub weights: AllocationWeights,
    pub equity_split: EquitySubSplit,
    pub rationale: String,
}

/// Signed working weights; band arithmetic and rescaling may dip below zero
/// before being clamped into `AllocationWeights`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawWeights {
    equity: i64,
    debt: i64,
    gold: i64,
    silver: i64,
}

impl RawWeights {
    fn total(self) -> i64 {
        self.equity + self.debt + self.gold + self.silver
    }

    fn clamped(self) -> Self {
        Self {
            equity: self.equity.max(0),
            debt: self.debt.max(0),
            gold: self.gold.max(0),
            silver: self.silver.max(0),
        }
    }

    fn into_weights(self) -> AllocationWeights {
        let clamped = self.clamped();
        AllocationWeights {
            equity: clamped.equity as u32,
            debt: clamped.debt as u32,
            gold: clamped.gold as u32,
            silver: clamped.silver as u32,
        }
    }
}

pub fn resolve(profile: &InvestorProfile, exclusions: Exclusions) -> Resolution {
    let band = band_weights(profile);
    // Below three years the all-debt band holds regardless of exclusions.
    let redistributed = if profile.horizon_years < SHORT_HORIZON_YEARS {
        band
    } else {
        redistribute_exclusions(band, exclusions)
    };
    let weights = normalize(redistributed);
    let equity_split = equity_sub_split(profile, exclusions, weights.equity);
    let rationale = build_rationale(profile, exclusions, weights);

    Resolution {
        weights,
        equity_split,
        rationale,
    }
}

fn band_weights(profile: &InvestorProfile) -> RawWeights {
    let horizon = profile.horizon_years;
    if horizon < SHORT_HORIZON_YEARS {
        RawWeights {
            equity: 0,
            debt: 100,
            gold: 0,
            silver: 0,
        }
    } else if horizon < MEDIUM_HORIZON_YEARS {
        RawWeights {
            equity: 20,
            debt: 75,
            gold: 5,
            silver: 0,
        }
    } else if horizon < LONG_HORIZON_YEARS {
        let equity = match profile.risk {
            RiskLevel::High => 60,
            RiskLevel::Medium => 50,
            RiskLevel::Low => 40,
        };
        with_long_term_hedges(equity)
    } else {
        with_long_term_hedges(age_based_equity(profile.age, profile.risk))
    }
}

fn with_long_term_hedges(equity: i64) -> RawWeights {
    let equity = equity.max(0);
    RawWeights {
        equity,
        debt: 100 - equity - LONG_TERM_GOLD - LONG_TERM_SILVER,
        gold: LONG_TERM_GOLD,
        silver: LONG_TERM_SILVER,
    }
}

fn age_based_equity(age: u32, risk: RiskLevel) -> i64 {
    let (risk_penalty, ceiling) = match risk {
        RiskLevel::Low => (20, 50),
        RiskLevel::Medium => (10, 70),
        RiskLevel::High => (0, 85),
    };
    let base = (AGE_RULE_BASE - i64::from(age)).max(0) - risk_penalty;
    base.min(ceiling).max(0)
}

fn redistribute_exclusions(mut weights: RawWeights, exclusions: Exclusions) -> RawWeights {
    if exclusions.exclude_debt {
        weights.equity += weights.debt;
        weights.debt = 0;
    }
    if exclusions.exclude_commodities {
        weights.equity += weights.gold + weights.silver;
        weights.gold = 0;
        weights.silver = 0;
    }
    weights
}

/// Forces the weights to sum to 100 with silver as the balancing term.
fn normalize(raw: RawWeights) -> AllocationWeights {
    let raw = raw.clamped();
    let total = raw.total();
    if total <= 0 {
        return AllocationWeights::default();
    }
    if total == 100 {
        return raw.into_weights();
    }

    let factor = 100.0 / total as f64;
    let equity = (raw.equity as f64 * factor).round() as i64;
    let debt = (raw.debt as f64 * factor).round() as i64;
    let gold = (raw.gold as f64 * factor).round() as i64;
    let silver = 100 - equity - debt - gold;

    absorb_silver_shortfall(RawWeights {
        equity,
        debt,
        gold,
        silver,
    })
    .into_weights()
}

/// Negative silver after rescaling is clamped to zero; the shortfall comes
/// out of debt first, then equity.
fn absorb_silver_shortfall(mut weights: RawWeights) -> RawWeights {
    if weights.silver >= 0 {
        return weights;
    }
    let mut shortfall = -weights.silver;
    weights.silver = 0;

    let from_debt = shortfall.min(weights.debt);
    weights.debt -= from_debt;
    shortfall -= from_debt;

    weights.equity -= shortfall.min(weights.equity);
    weights
}

fn equity_sub_split(
    profile: &InvestorProfile,
    exclusions: Exclusions,
    equity_weight: u32,
) -> EquitySubSplit {
    if equity_weight == 0 {
        return EquitySubSplit::empty();
    }

    let horizon = profile.horizon_years;
    let include_international = !exclusions.exclude_us_equity
        && horizon >= MEDIUM_HORIZON_YEARS
        && matches!(profile.risk, RiskLevel::Medium | RiskLevel::High);
    let international = if include_international {
        INTERNATIONAL_EQUITY_SHARE
    } else {
        0
    };
    let remaining = 100 - international;

    let mut percents = match profile.risk {
        _ if horizon < MEDIUM_HORIZON_YEARS => [100, 0, 0, 0],
        RiskLevel::Low => [100, 0, 0, 0],
        RiskLevel::Medium => [
            share_of(remaining, 60),
            share_of(remaining, 40),
            0,
            international,
        ],
        RiskLevel::High => [
            share_of(remaining, 50),
            share_of(remaining, 30),
            share_of(remaining, 20),
            international,
        ],
    };

    let sum: i64 = percents.iter().map(|&p| i64::from(p)).sum();
    if sum != 100 {
        percents[0] = (i64::from(percents[0]) + 100 - sum).max(0) as u32;
    }

    EquitySubSplit::from_percents(percents)
}

/// `round(amount * percent / 100)`, halves rounded up.
fn share_of(amount: u32, percent: u32) -> u32 {
    (amount * percent + 50) / 100
}

fn build_rationale(
    profile: &InvestorProfile,
    exclusions: Exclusions,
    weights: AllocationWeights,
) -> String {
    let mut notes = Vec::with_capacity(3);
    if profile.horizon_years < SHORT_HORIZON_YEARS {
        notes.push(SAFETY_NOTE);
    } else if weights.equity > AGGRESSIVE_EQUITY_THRESHOLD {
        notes.push(AGGRESSIVE_NOTE);
    } else {
        notes.push(BALANCED_NOTE);
    }

    if exclusions.exclude_debt && profile.horizon_years < MEDIUM_HORIZON_YEARS {
        notes.push(SHORT_TERM_DEBT_WARNING);
    }
    if exclusions.exclude_commodities {
        notes.push(COMMODITY_HEDGE_NOTE);
    }

    notes.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EquityStyle;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    fn profile(age: u32, horizon_years: u32, risk: RiskLevel) -> InvestorProfile {
        InvestorProfile {
            age,
            horizon_years,
            risk,
            monthly_amount: 10_000,
            annual_step_up: 0.0,
        }
    }

    fn risk_from_index(index: u8) -> RiskLevel {
        match index % 3 {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    fn weights(equity: u32, debt: u32, gold: u32, silver: u32) -> AllocationWeights {
        AllocationWeights {
            equity,
            debt,
            gold,
            silver,
        }
    }

    #[test]
    fn medium_risk_thirty_year_old_on_ten_year_horizon() {
        let resolved = resolve(&profile(30, 10, RiskLevel::Medium), Exclusions::default());
        assert_eq!(resolved.weights, weights(70, 20, 7, 3));

        let split = &resolved.equity_split;
        assert_eq!(split.percent(EquityStyle::LargeCap), 51);
        assert_eq!(split.percent(EquityStyle::MidCap), 34);
        assert_eq!(split.percent(EquityStyle::SmallCap), 0);
        assert_eq!(split.percent(EquityStyle::International), 15);
        assert_eq!(resolved.rationale, BALANCED_NOTE);
    }

    #[test]
    fn horizon_bands_follow_the_rule_table() {
        let cases = [
            (0, RiskLevel::High, weights(0, 100, 0, 0)),
            (2, RiskLevel::High, weights(0, 100, 0, 0)),
            (3, RiskLevel::Low, weights(20, 75, 5, 0)),
            (4, RiskLevel::High, weights(20, 75, 5, 0)),
            (5, RiskLevel::Low, weights(40, 50, 7, 3)),
            (6, RiskLevel::Medium, weights(50, 40, 7, 3)),
            (7, RiskLevel::High, weights(60, 30, 7, 3)),
        ];
        for (horizon, risk, expected) in cases {
            let resolved = resolve(&profile(40, horizon, risk), Exclusions::default());
            assert_eq!(resolved.weights, expected, "horizon {horizon}, risk {risk:?}");
        }
    }

    #[test]
    fn long_horizon_equity_is_capped_by_risk_ceiling() {
        let young = 20;
        assert_eq!(
            resolve(&profile(young, 20, RiskLevel::High), Exclusions::default())
                .weights
                .equity,
            85
        );
        assert_eq!(
            resolve(&profile(young, 20, RiskLevel::Medium), Exclusions::default())
                .weights
                .equity,
            70
        );
        assert_eq!(
            resolve(&profile(young, 20, RiskLevel::Low), Exclusions::default())
                .weights
                .equity,
            50
        );
        assert_eq!(
            resolve(&profile(60, 20, RiskLevel::Low), Exclusions::default()).weights,
            weights(30, 60, 7, 3)
        );
    }

    #[test]
    fn very_old_investor_floors_equity_at_zero() {
        let resolved = resolve(&profile(125, 10, RiskLevel::Low), Exclusions::default());
        assert_eq!(resolved.weights, weights(0, 90, 7, 3));
        assert!(resolved.equity_split.is_empty());
    }

    #[test]
    fn short_horizon_ignores_every_exclusion_combination() {
        for bits in 0u8..8 {
            let exclusions = Exclusions {
                exclude_debt: bits & 1 != 0,
                exclude_commodities: bits & 2 != 0,
                exclude_us_equity: bits & 4 != 0,
            };
            let resolved = resolve(&profile(35, 2, RiskLevel::High), exclusions);
            assert_eq!(resolved.weights, weights(0, 100, 0, 0), "{exclusions:?}");
            assert!(resolved.equity_split.is_empty());
        }
    }

    #[test]
    fn short_horizon_with_debt_excluded_still_warns() {
        let exclusions = Exclusions {
            exclude_debt: true,
            ..Exclusions::default()
        };
        let resolved = resolve(&profile(35, 2, RiskLevel::Medium), exclusions);
        assert_eq!(
            resolved.rationale,
            format!("{SAFETY_NOTE} {SHORT_TERM_DEBT_WARNING}")
        );
    }

    #[test]
    fn excluding_debt_moves_it_into_equity() {
        let base = resolve(&profile(45, 6, RiskLevel::Medium), Exclusions::default());
        let excluded = resolve(
            &profile(45, 6, RiskLevel::Medium),
            Exclusions {
                exclude_debt: true,
                ..Exclusions::default()
            },
        );
        assert_eq!(excluded.weights.debt, 0);
        assert_eq!(
            excluded.weights.equity,
            base.weights.equity + base.weights.debt
        );
        assert_eq!(excluded.weights.gold, base.weights.gold);
        assert_eq!(excluded.weights.silver, base.weights.silver);
    }

    #[test]
    fn excluding_everything_but_equity_on_medium_horizon_is_all_equity() {
        let exclusions = Exclusions {
            exclude_debt: true,
            exclude_commodities: true,
            exclude_us_equity: false,
        };
        let resolved = resolve(&profile(30, 3, RiskLevel::Low), exclusions);
        assert_eq!(resolved.weights, weights(100, 0, 0, 0));
        assert_eq!(
            resolved.rationale,
            format!("{AGGRESSIVE_NOTE} {SHORT_TERM_DEBT_WARNING} {COMMODITY_HEDGE_NOTE}")
        );
        assert_eq!(resolved.equity_split.percent(EquityStyle::LargeCap), 100);
    }

    #[test]
    fn high_risk_split_gives_rounding_remainder_to_large_cap() {
        let resolved = resolve(&profile(25, 12, RiskLevel::High), Exclusions::default());
        let split = &resolved.equity_split;
        assert_eq!(split.percent(EquityStyle::LargeCap), 42);
        assert_eq!(split.percent(EquityStyle::MidCap), 26);
        assert_eq!(split.percent(EquityStyle::SmallCap), 17);
        assert_eq!(split.percent(EquityStyle::International), 15);
        assert_eq!(split.total(), 100);
    }

    #[test]
    fn us_exclusion_keeps_domestic_split_whole() {
        let exclusions = Exclusions {
            exclude_us_equity: true,
            ..Exclusions::default()
        };
        let resolved = resolve(&profile(25, 12, RiskLevel::High), exclusions);
        let percents: Vec<u32> = resolved
            .equity_split
            .slices()
            .iter()
            .map(|slice| slice.percent)
            .collect();
        assert_eq!(percents, vec![50, 30, 20, 0]);
    }

    #[test]
    fn sub_split_is_listed_in_fixed_style_order() {
        let resolved = resolve(&profile(30, 10, RiskLevel::Medium), Exclusions::default());
        let styles: Vec<EquityStyle> = resolved
            .equity_split
            .slices()
            .iter()
            .map(|slice| slice.style)
            .collect();
        assert_eq!(styles, EquityStyle::ORDER.to_vec());
    }

    #[test]
    fn normalize_rescales_and_balances_on_silver() {
        let normalized = normalize(RawWeights {
            equity: 1,
            debt: 1,
            gold: 1,
            silver: 0,
        });
        assert_eq!(normalized, weights(33, 33, 33, 1));
    }

    #[test]
    fn normalize_takes_negative_silver_out_of_debt() {
        // 12.5 and 87.5 both round up, overshooting 100 by one.
        let normalized = normalize(RawWeights {
            equity: 0,
            debt: 1,
            gold: 7,
            silver: 0,
        });
        assert_eq!(normalized, weights(0, 12, 88, 0));
    }

    #[test]
    fn normalize_leaves_all_zero_weights_alone() {
        let normalized = normalize(RawWeights {
            equity: 0,
            debt: 0,
            gold: 0,
            silver: 0,
        });
        assert_eq!(normalized, AllocationWeights::default());
    }

    #[test]
    fn normalize_clamps_negative_inputs_before_rescaling() {
        let normalized = normalize(RawWeights {
            equity: -20,
            debt: 110,
            gold: 7,
            silver: 3,
        });
        assert_eq!(normalized.total(), 100);
        assert_eq!(normalized.equity, 0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_weights_always_sum_to_one_hundred(
            age in 0u32..140,
            horizon in 0u32..60,
            risk_index in any::<u8>(),
            exclude_debt in any::<bool>(),
            exclude_commodities in any::<bool>(),
            exclude_us_equity in any::<bool>()
        ) {
            let exclusions = Exclusions { exclude_debt, exclude_commodities, exclude_us_equity };
            let resolved = resolve(&profile(age, horizon, risk_from_index(risk_index)), exclusions);
            prop_assert_eq!(resolved.weights.total(), 100);

            if resolved.weights.equity > 0 {
                prop_assert_eq!(resolved.equity_split.total(), 100);
                prop_assert_eq!(resolved.equity_split.slices().len(), 4);
            } else {
                prop_assert!(resolved.equity_split.is_empty());
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_debt_exclusion_conserves_weight(
            age in 0u32..100,
            horizon in 3u32..40,
            risk_index in any::<u8>(),
            exclude_commodities in any::<bool>()
        ) {
            let investor = profile(age, horizon, risk_from_index(risk_index));
            let kept = resolve(&investor, Exclusions { exclude_commodities, ..Exclusions::default() });
            let excluded = resolve(&investor, Exclusions {
                exclude_debt: true,
                exclude_commodities,
                exclude_us_equity: false,
            });

            prop_assert_eq!(excluded.weights.debt, 0);
            prop_assert_eq!(excluded.weights.equity, kept.weights.equity + kept.weights.debt);
        }

        #[test]
        fn prop_older_investor_never_gets_more_equity(
            age in 0u32..130,
            horizon in 8u32..50,
            risk_index in any::<u8>()
        ) {
            let risk = risk_from_index(risk_index);
            let younger = resolve(&profile(age, horizon, risk), Exclusions::default());
            let older = resolve(&profile(age + 1, horizon, risk), Exclusions::default());
            prop_assert!(older.weights.equity <= younger.weights.equity);
        }
    }
}
