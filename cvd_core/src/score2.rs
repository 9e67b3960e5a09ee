//! SCORE2 10-year risk with region recalibration.
//!
//! Covariates are centered and scaled, combined with sex-specific betas into
//! a linear predictor (LP), turned into an uncalibrated risk through the
//! baseline survival, then recalibrated with the region's (a, b) pair:
//!
//! ```text
//! u   = 1 - S0^exp(LP)
//! t   = -ln(1 - u)
//! cal = 1 - exp(-exp(a + b * ln t))
//! ```
//!
//! Degenerate outputs are replaced by the banded heuristic in [`crate::fallback`].

use crate::categorize::categorize_percent;
use crate::coefficients::CoefficientRepository;
use crate::fallback;
use crate::{
    Breakdown, CalculationResult, ClinicalProfile, Contributions, Region, Score, Score2Details,
    Sex,
};

/// Mean LP of the formulation; covariates are centered so it is zero
pub const FORMULATION_MEAN_LP: f64 = 0.0;

/// Largest uncalibrated risk kept before the log transform
const MAX_UNCALIBRATED: f64 = 1.0 - 1e-12;

/// LP coefficients, including the age interaction terms
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Betas {
    pub age: f64,
    pub smoke: f64,
    pub sbp: f64,
    pub tc: f64,
    pub hdl: f64,
    pub age_smoke: f64,
    pub age_sbp: f64,
    pub age_tc: f64,
    pub age_hdl: f64,
}

pub const MALE_BETAS: Betas = Betas {
    age: 0.3742,
    smoke: 0.6012,
    sbp: 0.2777,
    tc: 0.1458,
    hdl: -0.2698,
    age_smoke: -0.0755,
    age_sbp: -0.0255,
    age_tc: -0.0281,
    age_hdl: 0.0426,
};

pub const FEMALE_BETAS: Betas = Betas {
    age: 0.4648,
    smoke: 0.7744,
    sbp: 0.3131,
    tc: 0.1002,
    hdl: -0.2606,
    age_smoke: -0.1088,
    age_sbp: -0.0277,
    age_tc: -0.0226,
    age_hdl: 0.0613,
};

/// Calibration (a, b) pairs in `Region::ALL` order
const MALE_SCALES: [(f64, f64); 4] = [
    (-0.5699, 0.7476),
    (-0.1565, 0.8009),
    (0.3207, 0.9360),
    (0.5836, 0.8294),
];
const FEMALE_SCALES: [(f64, f64); 4] = [
    (-0.7380, 0.7019),
    (-0.3143, 0.7701),
    (0.5710, 0.9369),
    (0.9412, 0.8329),
];

/// Everything the calculator needs for one sex
#[derive(Clone, Debug, PartialEq)]
pub struct Score2Parameters {
    pub betas: Betas,
    pub baseline_survival: f64,
    pub scales: [(f64, f64); 4],
}

impl Score2Parameters {
    /// Published parameters for `sex`
    pub fn published(sex: Sex) -> Self {
        match sex {
            Sex::Male => Self {
                betas: MALE_BETAS,
                baseline_survival: 0.9605,
                scales: MALE_SCALES,
            },
            Sex::Female => Self {
                betas: FEMALE_BETAS,
                baseline_survival: 0.9776,
                scales: FEMALE_SCALES,
            },
        }
    }

    /// Calibration pair for `region`
    pub fn scale(&self, region: Region) -> (f64, f64) {
        let idx = Region::ALL
            .iter()
            .position(|r| *r == region)
            .unwrap_or(1);
        self.scales[idx]
    }
}

/// Centered and scaled covariates
#[derive(Clone, Copy, Debug)]
struct Covariates {
    cage: f64,
    csbp: f64,
    ct: f64,
    chdl: f64,
    smk: f64,
}

impl Covariates {
    fn from_profile(profile: &ClinicalProfile) -> Self {
        Self {
            cage: (f64::from(profile.age) - 60.0) / 5.0,
            csbp: (f64::from(profile.systolic_bp) - 120.0) / 20.0,
            ct: (profile.total_cholesterol - 6.0) / 1.0,
            chdl: (profile.hdl_cholesterol - 1.3) / 0.5,
            smk: if profile.smoker { 1.0 } else { 0.0 },
        }
    }
}

fn contributions(b: &Betas, x: &Covariates) -> Contributions {
    Contributions {
        age: b.age * x.cage
            + b.age_smoke * (x.cage * x.smk)
            + b.age_sbp * (x.cage * x.csbp)
            + b.age_tc * (x.cage * x.ct)
            + b.age_hdl * (x.cage * x.chdl),
        non_hdl: b.tc * x.ct + b.age_tc * (x.cage * x.ct),
        systolic_bp: b.sbp * x.csbp + b.age_sbp * (x.cage * x.csbp),
        smoking: b.smoke * x.smk + b.age_smoke * (x.cage * x.smk),
    }
}

fn linear_predictor(b: &Betas, x: &Covariates) -> f64 {
    b.age * x.cage
        + b.smoke * x.smk
        + b.sbp * x.csbp
        + b.tc * x.ct
        + b.hdl * x.chdl
        + b.age_smoke * (x.cage * x.smk)
        + b.age_sbp * (x.cage * x.csbp)
        + b.age_tc * (x.cage * x.ct)
        + b.age_hdl * (x.cage * x.chdl)
}

/// `1 - S0^exp(LP)`, clamped to [0, 1 - 1e-12]
fn uncalibrated_risk(baseline_survival: f64, lp: f64) -> f64 {
    let u = 1.0 - baseline_survival.powf(lp.exp());
    if u >= 1.0 {
        MAX_UNCALIBRATED
    } else if u < 0.0 {
        0.0
    } else {
        u
    }
}

/// Two-step recalibration of an uncalibrated risk, clamped to [0, 1]
fn calibrate(uncalibrated: f64, (a, b): (f64, f64)) -> f64 {
    let t = -(1.0 - uncalibrated).ln();
    let calibrated = 1.0 - (-(a + b * t.ln()).exp()).exp();
    calibrated.clamp(0.0, 1.0)
}

/// SCORE2 result for a validated profile using the published parameters
pub fn calculate(
    profile: &ClinicalProfile,
    region: Region,
    repository: &CoefficientRepository,
) -> CalculationResult {
    calculate_with(
        profile,
        region,
        &Score2Parameters::published(profile.sex),
        repository,
    )
}

/// SCORE2 result with explicit parameters
pub fn calculate_with(
    profile: &ClinicalProfile,
    region: Region,
    params: &Score2Parameters,
    repository: &CoefficientRepository,
) -> CalculationResult {
    let x = Covariates::from_profile(profile);
    let lp = linear_predictor(&params.betas, &x);
    let calibration = params.scale(region);
    let uncalibrated = uncalibrated_risk(params.baseline_survival, lp);
    let calibrated_percent = calibrate(uncalibrated, calibration) * 100.0;

    let points = fallback::banded_points(profile);
    let is_fallback = fallback::is_degenerate(lp, FORMULATION_MEAN_LP, calibrated_percent);
    let risk = if is_fallback {
        let heuristic = fallback::heuristic_risk(points.total());
        tracing::debug!(
            lp,
            calibrated_percent,
            total_points = points.total(),
            heuristic,
            "SCORE2 output degenerate, using banded fallback"
        );
        heuristic
    } else {
        calibrated_percent
    };

    let reference = repository.get(profile.sex, region);
    let (category, advice) = categorize_percent(risk);

    CalculationResult {
        category,
        advice,
        score: Score::Percent(risk),
        breakdown: Breakdown::Score2(Score2Details {
            region,
            linear_predictor: lp,
            mean_lp: FORMULATION_MEAN_LP,
            baseline_survival: params.baseline_survival,
            calibration,
            uncalibrated_risk: uncalibrated,
            contributions: contributions(&params.betas, &x),
            points,
            is_fallback,
            reference_s0: reference.s0_for_age(profile.age),
            reference_mean_lp: reference.mean_lp_for_age(profile.age),
        }),
    }
}
