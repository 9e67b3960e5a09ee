//! Banded-points heuristic used when the calibrated SCORE2 model degenerates.
//!
//! The same bands also produce the "points" shown next to every SCORE2 result,
//! whether or not the fallback replaced the calibrated risk.

use crate::{BandedPoints, ClinicalProfile};

/// LP this far above the mean LP is treated as degenerate
pub const MAX_LP_EXCESS: f64 = 10.0;

/// Calibrated risk (percent) at or above this is treated as saturated
pub const SATURATED_RISK_PERCENT: f64 = 99.9;

/// Risk percent for point totals 0..=9; 10 and above map to 75%
const RISK_BY_POINTS: [f64; 10] = [1.0, 2.5, 4.0, 6.0, 9.0, 14.0, 20.0, 30.0, 40.0, 50.0];
const RISK_CAP: f64 = 75.0;

fn age_band(age: u32) -> u32 {
    match age {
        40..=49 => 1,
        50..=59 => 2,
        60..=69 => 3,
        _ => 0,
    }
}

fn non_hdl_band(non_hdl_mmol: f64) -> u32 {
    if non_hdl_mmol < 2.6 {
        0
    } else if non_hdl_mmol < 3.9 {
        1
    } else if non_hdl_mmol < 5.0 {
        2
    } else {
        3
    }
}

fn sbp_band(sbp: u32) -> u32 {
    match sbp {
        0..=129 => 0,
        130..=139 => 1,
        140..=159 => 2,
        _ => 3,
    }
}

/// Banded points for a validated profile
pub fn banded_points(profile: &ClinicalProfile) -> BandedPoints {
    BandedPoints {
        age: age_band(profile.age),
        non_hdl: non_hdl_band(profile.non_hdl()),
        systolic_bp: sbp_band(profile.systolic_bp),
        smoking: if profile.smoker { 2 } else { 0 },
    }
}

/// Conservative risk percent for a banded point total
pub fn heuristic_risk(total_points: u32) -> f64 {
    RISK_BY_POINTS
        .get(total_points as usize)
        .copied()
        .unwrap_or(RISK_CAP)
}

/// Whether a calibrated result must be replaced by the heuristic
pub fn is_degenerate(linear_predictor: f64, mean_lp: f64, risk_percent: f64) -> bool {
    !linear_predictor.is_finite()
        || linear_predictor - mean_lp > MAX_LP_EXCESS
        || !risk_percent.is_finite()
        || risk_percent >= SATURATED_RISK_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Region, Sex};

    fn profile(age: u32, sbp: u32, total: f64, hdl: f64, smoker: bool) -> ClinicalProfile {
        ClinicalProfile {
            age,
            sex: Sex::Male,
            systolic_bp: sbp,
            total_cholesterol: total,
            hdl_cholesterol: hdl,
            smoker,
            bp_treated: false,
            region: Region::Moderate,
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(age_band(39), 0);
        assert_eq!(age_band(40), 1);
        assert_eq!(age_band(59), 2);
        assert_eq!(age_band(69), 3);
        assert_eq!(age_band(70), 0);

        assert_eq!(non_hdl_band(2.5), 0);
        assert_eq!(non_hdl_band(3.0), 1);
        assert_eq!(non_hdl_band(3.9), 2);
        assert_eq!(non_hdl_band(5.0), 3);

        assert_eq!(sbp_band(129), 0);
        assert_eq!(sbp_band(130), 1);
        assert_eq!(sbp_band(159), 2);
        assert_eq!(sbp_band(160), 3);
    }

    #[test]
    fn test_banded_points_for_high_profile() {
        let pts = banded_points(&profile(65, 160, 6.5, 1.1, true));
        assert_eq!(
            pts,
            BandedPoints {
                age: 3,
                non_hdl: 3,
                systolic_bp: 3,
                smoking: 2
            }
        );
        assert_eq!(pts.total(), 11);
    }

    #[test]
    fn test_heuristic_risk_table() {
        assert_eq!(heuristic_risk(0), 1.0);
        assert_eq!(heuristic_risk(4), 9.0);
        assert_eq!(heuristic_risk(9), 50.0);
        assert_eq!(heuristic_risk(10), 75.0);
        assert_eq!(heuristic_risk(u32::MAX), 75.0);

        for points in 0..20 {
            let risk = heuristic_risk(points);
            assert!(risk.is_finite() && (0.0..=100.0).contains(&risk));
        }
    }

    #[test]
    fn test_degeneracy_detection() {
        assert!(!is_degenerate(1.5, 0.0, 25.0));
        assert!(is_degenerate(f64::NAN, 0.0, 25.0));
        assert!(is_degenerate(f64::INFINITY, 0.0, 25.0));
        assert!(is_degenerate(10.5, 0.0, 25.0));
        assert!(!is_degenerate(10.0, 0.0, 25.0));
        assert!(is_degenerate(1.0, 0.0, 99.9));
        assert!(is_degenerate(1.0, 0.0, f64::NAN));
    }
}
