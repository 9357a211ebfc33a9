use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::series::PriceSeries;

/// A single security inside an industry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub symbol: String,
    pub display_name: String,
    pub market_cap: f64,
}

/// An industry grouping of securities, owned by exactly one sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Industry {
    pub name: String,
    pub securities: Vec<Security>,
}

/// A top-level sector grouping of industries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    pub industries: Vec<Industry>,
}

/// Reference market index, with a fallback identifier used when the
/// primary symbol has no usable price history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmark {
    pub primary: String,
    pub fallback: String,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self {
            primary: "NSE:NIFTY500-INDEX".to_string(),
            fallback: "NSE:NIFTY50-INDEX".to_string(),
        }
    }
}

/// Constituent weighting scheme for synthetic index construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightScheme {
    /// Linear market-cap weights
    CapWeight,
    /// Square-root-of-cap weights; dampens mega-cap dominance
    SqrtCapWeight,
    /// 1/n weights
    EqualWeight,
}

impl WeightScheme {
    pub fn name(&self) -> &'static str {
        match self {
            WeightScheme::CapWeight => "cap_weight",
            WeightScheme::SqrtCapWeight => "sqrt_cap_weight",
            WeightScheme::EqualWeight => "equal_weight",
        }
    }
}

/// How industry indices roll up into a sector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectorRollup {
    /// Equal-weight mean of the industry index series
    EqualWeight,
    /// Industries weighted by the sum of their constituents' market caps
    CapWeight,
}

/// A synthetic weighted aggregate of constituent price series.
///
/// Derived data: recomputed on every run, never persisted. `base_date` is
/// the base-100 normalization date, or `None` for the raw cap-weighted mode.
#[derive(Debug, Clone)]
pub struct IndexSeries {
    pub series: PriceSeries,
    pub scheme: WeightScheme,
    pub base_date: Option<NaiveDate>,
}

/// Sampling frequency for the rotation calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// Which benchmark a node is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkMode {
    /// Parent-level index: stock vs industry, industry vs sector, sector vs market
    Relative,
    /// The market-wide benchmark, regardless of hierarchy level
    Broad,
}

/// One point on the rotation trajectory: x = RS-Ratio, y = RS-Momentum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

/// Chronological tail of rotation points; empty means "insufficient data".
pub type RotationSeries = Vec<RotationPoint>;

/// One value per sampling frequency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencySet<T> {
    pub daily: T,
    pub weekly: T,
    pub monthly: T,
}

impl<T> FrequencySet<T> {
    pub fn get(&self, frequency: Frequency) -> &T {
        match frequency {
            Frequency::Daily => &self.daily,
            Frequency::Weekly => &self.weekly,
            Frequency::Monthly => &self.monthly,
        }
    }
}

/// Rotation trajectories for a node, per benchmark mode and frequency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationData {
    pub relative: FrequencySet<RotationSeries>,
    pub broad: FrequencySet<RotationSeries>,
}

impl RotationData {
    pub fn get(&self, mode: BenchmarkMode, frequency: Frequency) -> &RotationSeries {
        match mode {
            BenchmarkMode::Relative => self.relative.get(frequency),
            BenchmarkMode::Broad => self.broad.get(frequency),
        }
    }
}

/// Level of a node in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Sector,
    Industry,
    Stock,
}

/// One node of the output tree, mirroring the input nesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bullish: Option<bool>,
    #[serde(rename = "rrg_data")]
    pub rotation: RotationData,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ResultNode>,
}

/// The single document produced by one aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationDocument {
    pub generated_at: NaiveDate,
    pub benchmark_id: String,
    pub sectors: Vec<ResultNode>,
}
