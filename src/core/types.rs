use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetClass {
    Equity,
    Debt,
    Gold,
    Silver,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::Debt,
        AssetClass::Gold,
        AssetClass::Silver,
    ];
}

/// Equity styles in sub-split order. The first entry absorbs rounding drift.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquityStyle {
    LargeCap,
    MidCap,
    SmallCap,
    International,
}

impl EquityStyle {
    pub const ORDER: [EquityStyle; 4] = [
        EquityStyle::LargeCap,
        EquityStyle::MidCap,
        EquityStyle::SmallCap,
        EquityStyle::International,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EquityStyle::LargeCap => "Large Cap / Nifty 50",
            EquityStyle::MidCap => "Mid Cap",
            EquityStyle::SmallCap => "Small Cap",
            EquityStyle::International => "US / International",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvestorProfile {
    pub age: u32,
    pub horizon_years: u32,
    pub risk: RiskLevel,
    pub monthly_amount: u64,
    /// Percent increase of the monthly contribution after each full year.
    pub annual_step_up: f64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Exclusions {
    pub exclude_debt: bool,
    pub exclude_commodities: bool,
    pub exclude_us_equity: bool,
}

/// Expected annual returns in percent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRates {
    pub equity: f64,
    pub debt: f64,
    pub gold: f64,
    pub silver: f64,
}

impl Default for ReturnRates {
    fn default() -> Self {
        Self {
            equity: 12.0,
            debt: 7.0,
            gold: 8.0,
            silver: 8.0,
        }
    }
}

impl ReturnRates {
    pub fn get(&self, asset: AssetClass) -> f64 {
        match asset {
            AssetClass::Equity => self.equity,
            AssetClass::Debt => self.debt,
            AssetClass::Gold => self.gold,
            AssetClass::Silver => self.silver,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerAsset<T> {
    pub equity: T,
    pub debt: T,
    pub gold: T,
    pub silver: T,
}

impl<T: Copy> PerAsset<T> {
    pub fn get(&self, asset: AssetClass) -> T {
        match asset {
            AssetClass::Equity => self.equity,
            AssetClass::Debt => self.debt,
            AssetClass::Gold => self.gold,
            AssetClass::Silver => self.silver,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(AssetClass, T) -> U) -> PerAsset<U> {
        PerAsset {
            equity: f(AssetClass::Equity, self.equity),
            debt: f(AssetClass::Debt, self.debt),
            gold: f(AssetClass::Gold, self.gold),
            silver: f(AssetClass::Silver, self.silver),
        }
    }
}

/// Integer percentages of the portfolio; always sum to 100 once resolved.
pub type AllocationWeights = PerAsset<u32>;

impl AllocationWeights {
    pub fn total(&self) -> u32 {
        self.equity + self.debt + self.gold + self.silver
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquitySlice {
    pub style: EquityStyle,
    pub label: &'static str,
    pub percent: u32,
}

/// Percentages of the equity slice, in `EquityStyle::ORDER`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EquitySubSplit {
    slices: Vec<EquitySlice>,
}

impl EquitySubSplit {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_percents(percents: [u32; 4]) -> Self {
        let slices = EquityStyle::ORDER
            .iter()
            .zip(percents)
            .map(|(&style, percent)| EquitySlice {
                style,
                label: style.label(),
                percent,
            })
            .collect();
        Self { slices }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn slices(&self) -> &[EquitySlice] {
        &self.slices
    }

    pub fn percent(&self, style: EquityStyle) -> u32 {
        self.slices
            .iter()
            .find(|slice| slice.style == style)
            .map_or(0, |slice| slice.percent)
    }

    pub fn total(&self) -> u32 {
        self.slices.iter().map(|slice| slice.percent).sum()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Projection {
    pub invested: i64,
    pub value: i64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionBreakdown {
    pub invested: i64,
    pub terminal_value: i64,
    pub returns: i64,
}

impl From<Projection> for ProjectionBreakdown {
    fn from(value: Projection) -> Self {
        Self {
            invested: value.invested,
            terminal_value: value.value,
            returns: value.value.saturating_sub(value.invested),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioProjection {
    pub total_invested: i64,
    pub total_value: i64,
    pub total_returns: i64,
    pub weighted_annual_rate: f64,
    pub breakdown: PerAsset<ProjectionBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub monthly_contribution: i64,
    pub invested: i64,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub weights: AllocationWeights,
    pub equity_split: EquitySubSplit,
    pub monthly_amounts: PerAsset<u64>,
    pub rationale: String,
    pub projection: PortfolioProjection,
    pub yearly: Vec<ProjectionYear>,
}
