//! Core domain types for the cardiovascular risk engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Sex, calibration region and scoring method keys
//! - Raw (optional) and validated clinical profiles
//! - Calculation results with their strongly-typed breakdowns

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// mg/dL per mmol/L for total and HDL cholesterol
pub const MGDL_PER_MMOL: f64 = 38.67;

// ============================================================================
// Keys
// ============================================================================

/// Biological sex; selects coefficient sets and point tables
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

/// SCORE2 calibration region (population risk tier)
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Low,
    #[default]
    Moderate,
    High,
    VeryHigh,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Low, Region::Moderate, Region::High, Region::VeryHigh];

    /// Parse a region key, falling back to `Moderate` for anything unrecognized
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or_else(|_| {
            tracing::debug!("Unknown calibration region '{}', using Moderate", key);
            Region::Moderate
        })
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Region::Low),
            "moderate" | "moder" => Ok(Region::Moderate),
            "high" => Ok(Region::High),
            "veryhigh" | "very high" | "very_high" | "very-high" => Ok(Region::VeryHigh),
            other => Err(format!("unknown calibration region '{}'", other)),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Low => write!(f, "Low"),
            Region::Moderate => write!(f, "Moderate"),
            Region::High => write!(f, "High"),
            Region::VeryHigh => write!(f, "VeryHigh"),
        }
    }
}

/// Which scoring pipeline a profile is validated for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Framingham,
    Score2,
}

impl Method {
    /// Closed age interval accepted by this method
    pub fn age_range(&self) -> (u32, u32) {
        match self {
            Method::Framingham => (20, 79),
            Method::Score2 => (40, 69),
        }
    }
}

/// Unit the caller entered cholesterol values in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CholesterolUnit {
    #[default]
    MmolPerL,
    MgPerDl,
}

// ============================================================================
// Profiles
// ============================================================================

/// Clinical inputs as supplied by a caller; any numeric field may be absent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawProfile {
    pub age: Option<i32>,
    pub sex: Sex,
    pub systolic_bp: Option<i32>,
    pub total_cholesterol: Option<f64>,
    pub hdl_cholesterol: Option<f64>,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub bp_treated: bool,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub cholesterol_unit: CholesterolUnit,
}

/// A profile that passed validation; every field is present and in range
///
/// Cholesterol values are always mmol/L here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClinicalProfile {
    pub age: u32,
    pub sex: Sex,
    pub systolic_bp: u32,
    pub total_cholesterol: f64,
    pub hdl_cholesterol: f64,
    pub smoker: bool,
    pub bp_treated: bool,
    pub region: Region,
}

impl ClinicalProfile {
    /// Total minus HDL cholesterol (mmol/L)
    pub fn non_hdl(&self) -> f64 {
        self.total_cholesterol - self.hdl_cholesterol
    }
}

// ============================================================================
// Results
// ============================================================================

/// Risk category shared by both methods
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskCategory::Low => write!(f, "Low"),
            RiskCategory::Medium => write!(f, "Medium"),
            RiskCategory::High => write!(f, "High"),
        }
    }
}

/// Key into the caller's (localized) clinical advice texts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdviceKey {
    #[serde(rename = "advice-1")]
    ReinforcePrevention,
    #[serde(rename = "advice-2")]
    ConsiderIntervention,
    #[serde(rename = "advice-3")]
    IntensiveAction,
}

impl AdviceKey {
    pub fn key(&self) -> &'static str {
        match self {
            AdviceKey::ReinforcePrevention => "advice-1",
            AdviceKey::ConsiderIntervention => "advice-2",
            AdviceKey::IntensiveAction => "advice-3",
        }
    }
}

/// Numeric score; its unit depends on the method
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Score {
    /// Framingham point total
    Points(i32),
    /// SCORE2 10-year risk, 0.0 to 100.0
    Percent(f64),
}

/// Framingham component points
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct FraminghamPoints {
    pub age: i32,
    pub total_cholesterol: i32,
    pub hdl: i32,
    pub systolic_bp: i32,
    pub smoking: i32,
}

impl FraminghamPoints {
    pub fn total(&self) -> i32 {
        self.age + self.total_cholesterol + self.hdl + self.systolic_bp + self.smoking
    }
}

/// Published 10-year risk band for a Framingham point total
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum TenYearRisk {
    BelowOne,
    Percent(u8),
    AtLeastThirty,
}

impl fmt::Display for TenYearRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenYearRisk::BelowOne => write!(f, "< 1%"),
            TenYearRisk::Percent(p) => write!(f, "{}%", p),
            TenYearRisk::AtLeastThirty => write!(f, ">= 30%"),
        }
    }
}

/// Simple banded points shown next to a SCORE2 risk
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct BandedPoints {
    pub age: u32,
    pub non_hdl: u32,
    pub systolic_bp: u32,
    pub smoking: u32,
}

impl BandedPoints {
    pub fn total(&self) -> u32 {
        self.age + self.non_hdl + self.systolic_bp + self.smoking
    }
}

/// Per-factor share of the SCORE2 linear predictor (diagnostics only)
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Contributions {
    pub age: f64,
    pub non_hdl: f64,
    pub systolic_bp: f64,
    pub smoking: f64,
}

/// Full SCORE2 calculation record
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Score2Details {
    pub region: Region,
    pub linear_predictor: f64,
    /// Mean LP of the formulation; 0.0 since covariates are centered
    pub mean_lp: f64,
    pub baseline_survival: f64,
    pub calibration: (f64, f64),
    pub uncalibrated_risk: f64,
    pub contributions: Contributions,
    pub points: BandedPoints,
    /// Risk came from the banded heuristic instead of the calibrated model
    pub is_fallback: bool,
    /// Repository S0 for the profile's age group, if the set has one
    pub reference_s0: Option<f64>,
    /// Repository mean LP for the profile's age group, if the set has one
    pub reference_mean_lp: Option<f64>,
}

/// Method-specific breakdown carried by a result
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Breakdown {
    Framingham {
        points: FraminghamPoints,
        ten_year_risk: TenYearRisk,
    },
    Score2(Score2Details),
}

/// Outcome of a successful calculation, owned by the caller
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalculationResult {
    pub category: RiskCategory,
    pub advice: AdviceKey,
    pub score: Score,
    pub breakdown: Breakdown,
}

impl CalculationResult {
    /// True when a SCORE2 result was produced by the fallback heuristic
    pub fn is_fallback(&self) -> bool {
        matches!(&self.breakdown, Breakdown::Score2(d) if d.is_fallback)
    }
}
