//! Framingham point tables (NCEP ATP III, 10-year hard CHD).
//!
//! The tables are a versioned constant: published band edges in mg/dL and
//! mmHg with lower-inclusive bounds. Validated profiles carry mmol/L, so
//! cholesterol is converted to whole mg/dL before lookup.

use crate::categorize::categorize_points;
use crate::{
    Breakdown, CalculationResult, ClinicalProfile, FraminghamPoints, Score, Sex, TenYearRisk,
    MGDL_PER_MMOL,
};

/// Age band for the age-dependent cholesterol and smoking columns
/// (20–39, 40–49, 50–59, 60–69, 70–79)
fn age_column(age: u32) -> usize {
    match age {
        0..=39 => 0,
        40..=49 => 1,
        50..=59 => 2,
        60..=69 => 3,
        _ => 4,
    }
}

/// Index of the band containing `value`: the last lower edge not above it
fn band<T: PartialOrd + Copy>(value: T, lower_edges: &[T]) -> usize {
    lower_edges
        .iter()
        .rposition(|edge| value >= *edge)
        .unwrap_or(0)
}

fn to_mgdl(mmol: f64) -> f64 {
    (mmol * MGDL_PER_MMOL).round()
}

const AGE_EDGES: [u32; 10] = [20, 35, 40, 45, 50, 55, 60, 65, 70, 75];
const MALE_AGE_POINTS: [i32; 10] = [-9, -4, 0, 3, 6, 8, 10, 11, 12, 13];
const FEMALE_AGE_POINTS: [i32; 10] = [-7, -3, 0, 3, 6, 8, 10, 12, 14, 16];

/// Points for age
pub fn age_points(age: u32, sex: Sex) -> i32 {
    let idx = band(age, &AGE_EDGES);
    match sex {
        Sex::Male => MALE_AGE_POINTS[idx],
        Sex::Female => FEMALE_AGE_POINTS[idx],
    }
}

const TOTAL_CHOL_EDGES_MGDL: [f64; 5] = [0.0, 160.0, 200.0, 240.0, 280.0];

// rows: cholesterol band, columns: age column
const MALE_TOTAL_CHOL_POINTS: [[i32; 5]; 5] = [
    [0, 0, 0, 0, 0],
    [4, 3, 2, 1, 0],
    [7, 5, 3, 1, 0],
    [9, 6, 4, 2, 1],
    [11, 8, 5, 3, 1],
];
const FEMALE_TOTAL_CHOL_POINTS: [[i32; 5]; 5] = [
    [0, 0, 0, 0, 0],
    [4, 3, 2, 1, 1],
    [8, 6, 4, 2, 1],
    [11, 8, 5, 3, 2],
    [13, 10, 7, 4, 2],
];

/// Points for total cholesterol (mmol/L), which depend on age
pub fn total_cholesterol_points(age: u32, sex: Sex, total_mmol: f64) -> i32 {
    let row = band(to_mgdl(total_mmol), &TOTAL_CHOL_EDGES_MGDL);
    let col = age_column(age);
    match sex {
        Sex::Male => MALE_TOTAL_CHOL_POINTS[row][col],
        Sex::Female => FEMALE_TOTAL_CHOL_POINTS[row][col],
    }
}

const HDL_EDGES_MGDL: [f64; 4] = [0.0, 40.0, 50.0, 60.0];
const HDL_POINTS: [i32; 4] = [2, 1, 0, -1];

/// Points for HDL cholesterol (mmol/L); the table is the same for both sexes
pub fn hdl_points(_sex: Sex, hdl_mmol: f64) -> i32 {
    HDL_POINTS[band(to_mgdl(hdl_mmol), &HDL_EDGES_MGDL)]
}

const SBP_EDGES: [u32; 5] = [0, 120, 130, 140, 160];
const MALE_SBP_UNTREATED: [i32; 5] = [0, 0, 1, 1, 2];
const MALE_SBP_TREATED: [i32; 5] = [0, 1, 2, 2, 3];
const FEMALE_SBP_UNTREATED: [i32; 5] = [0, 1, 2, 3, 4];
const FEMALE_SBP_TREATED: [i32; 5] = [0, 3, 4, 5, 6];

/// Points for systolic blood pressure, by treatment status
pub fn systolic_bp_points(sbp: u32, treated: bool, sex: Sex) -> i32 {
    let idx = band(sbp, &SBP_EDGES);
    let table = match (sex, treated) {
        (Sex::Male, false) => &MALE_SBP_UNTREATED,
        (Sex::Male, true) => &MALE_SBP_TREATED,
        (Sex::Female, false) => &FEMALE_SBP_UNTREATED,
        (Sex::Female, true) => &FEMALE_SBP_TREATED,
    };
    table[idx]
}

const MALE_SMOKER_POINTS: [i32; 5] = [8, 5, 3, 1, 1];
const FEMALE_SMOKER_POINTS: [i32; 5] = [9, 7, 4, 2, 1];

/// Points for smoking, which depend on age
pub fn smoking_points(sex: Sex, smoker: bool, age: u32) -> i32 {
    if !smoker {
        return 0;
    }
    let col = age_column(age);
    match sex {
        Sex::Male => MALE_SMOKER_POINTS[col],
        Sex::Female => FEMALE_SMOKER_POINTS[col],
    }
}

/// All five component points for a validated profile
pub fn points(profile: &ClinicalProfile) -> FraminghamPoints {
    FraminghamPoints {
        age: age_points(profile.age, profile.sex),
        total_cholesterol: total_cholesterol_points(
            profile.age,
            profile.sex,
            profile.total_cholesterol,
        ),
        hdl: hdl_points(profile.sex, profile.hdl_cholesterol),
        systolic_bp: systolic_bp_points(profile.systolic_bp, profile.bp_treated, profile.sex),
        smoking: smoking_points(profile.sex, profile.smoker, profile.age),
    }
}

/// Framingham result for a validated profile
pub fn calculate(profile: &ClinicalProfile) -> CalculationResult {
    let points = points(profile);
    let total = points.total();
    let (category, advice) = categorize_points(total);

    CalculationResult {
        category,
        advice,
        score: Score::Points(total),
        breakdown: Breakdown::Framingham {
            points,
            ten_year_risk: ten_year_risk(profile.sex, total),
        },
    }
}

/// Published 10-year risk for a point total
pub fn ten_year_risk(sex: Sex, total: i32) -> TenYearRisk {
    match sex {
        Sex::Male => match total {
            i32::MIN..=0 => TenYearRisk::BelowOne,
            1..=4 => TenYearRisk::Percent(1),
            5..=6 => TenYearRisk::Percent(2),
            7 => TenYearRisk::Percent(3),
            8 => TenYearRisk::Percent(4),
            9 => TenYearRisk::Percent(5),
            10 => TenYearRisk::Percent(6),
            11 => TenYearRisk::Percent(8),
            12 => TenYearRisk::Percent(10),
            13 => TenYearRisk::Percent(12),
            14 => TenYearRisk::Percent(16),
            15 => TenYearRisk::Percent(20),
            16 => TenYearRisk::Percent(25),
            _ => TenYearRisk::AtLeastThirty,
        },
        Sex::Female => match total {
            i32::MIN..=8 => TenYearRisk::BelowOne,
            9..=12 => TenYearRisk::Percent(1),
            13..=14 => TenYearRisk::Percent(2),
            15 => TenYearRisk::Percent(3),
            16 => TenYearRisk::Percent(4),
            17 => TenYearRisk::Percent(5),
            18 => TenYearRisk::Percent(6),
            19 => TenYearRisk::Percent(8),
            20 => TenYearRisk::Percent(11),
            21 => TenYearRisk::Percent(14),
            22 => TenYearRisk::Percent(17),
            23 => TenYearRisk::Percent(22),
            24 => TenYearRisk::Percent(27),
            _ => TenYearRisk::AtLeastThirty,
        },
    }
}
