//! Conversion of optional raw inputs into a validated [`ClinicalProfile`].
//!
//! Rules run in a fixed order and the first failing rule is reported. No rule
//! has side effects, so validating the same input twice gives the same outcome.

use crate::{ClinicalProfile, CholesterolUnit, Method, RawProfile, Region, Sex, MGDL_PER_MMOL};
use serde::Serialize;

/// Total cholesterol above this (mmol/L) is almost certainly a mg/dL value
pub const MAX_PLAUSIBLE_TOTAL_MMOL: f64 = 50.0;

/// HDL above this (mmol/L) is almost certainly a mg/dL value
pub const MAX_PLAUSIBLE_HDL_MMOL: f64 = 20.0;

/// Lowest HDL (mmol/L) SCORE2 accepts for a sex
pub fn hdl_minimum(sex: Sex) -> f64 {
    match sex {
        Sex::Male => 1.04,
        Sex::Female => 1.29,
    }
}

/// Reason a profile was rejected
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("age is required")]
    MissingAge,

    #[error("age {age} is outside the accepted range [{min}, {max}]")]
    AgeOutOfRange { age: i32, min: u32, max: u32 },

    #[error("total cholesterol is required")]
    MissingTotalCholesterol,

    #[error("total cholesterol must be positive (got {value})")]
    NonPositiveTotalCholesterol { value: f64 },

    #[error("HDL cholesterol is required")]
    MissingHdl,

    #[error("HDL cholesterol {value} is not allowed")]
    InvalidHdl { value: f64 },

    #[error("total cholesterol {total} is below HDL cholesterol {hdl}")]
    TotalBelowHdl { total: f64, hdl: f64 },

    #[error("non-HDL cholesterol must be positive (total {total} equals HDL)")]
    NonPositiveNonHdl { total: f64 },

    #[error("systolic blood pressure is required")]
    MissingSystolicBp,

    #[error("systolic blood pressure must be positive (got {value})")]
    NonPositiveSystolicBp { value: i32 },

    #[error("cholesterol values look like mg/dL (total {total}, HDL {hdl}); enter mmol/L")]
    ProbableMgDl { total: f64, hdl: f64 },

    #[error("HDL cholesterol {hdl} mmol/L is below the {minimum} mmol/L minimum for {sex}")]
    HdlBelowMinimum { sex: Sex, hdl: f64, minimum: f64 },
}

impl ValidationFailure {
    /// Stable machine-checkable reason code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::MissingAge => "missing_age",
            ValidationFailure::AgeOutOfRange { .. } => "age_out_of_range",
            ValidationFailure::MissingTotalCholesterol => "missing_total_cholesterol",
            ValidationFailure::NonPositiveTotalCholesterol { .. } => {
                "non_positive_total_cholesterol"
            }
            ValidationFailure::MissingHdl => "missing_hdl",
            ValidationFailure::InvalidHdl { .. } => "invalid_hdl",
            ValidationFailure::TotalBelowHdl { .. } => "total_below_hdl",
            ValidationFailure::NonPositiveNonHdl { .. } => "non_positive_non_hdl",
            ValidationFailure::MissingSystolicBp => "missing_systolic_bp",
            ValidationFailure::NonPositiveSystolicBp { .. } => "non_positive_systolic_bp",
            ValidationFailure::ProbableMgDl { .. } => "probable_mg_dl",
            ValidationFailure::HdlBelowMinimum { .. } => "hdl_below_minimum",
        }
    }
}

/// Validate `raw` for `method`, resolving a missing region key to `default_region`
pub fn validate(
    raw: &RawProfile,
    method: Method,
    default_region: Region,
) -> Result<ClinicalProfile, ValidationFailure> {
    let age = raw.age.ok_or(ValidationFailure::MissingAge)?;
    let (min, max) = method.age_range();
    if age < min as i32 || age > max as i32 {
        return Err(ValidationFailure::AgeOutOfRange { age, min, max });
    }

    let total = to_mmol(raw.total_cholesterol, raw.cholesterol_unit)
        .ok_or(ValidationFailure::MissingTotalCholesterol)?;
    if total <= 0.0 {
        return Err(ValidationFailure::NonPositiveTotalCholesterol { value: total });
    }

    let hdl = to_mmol(raw.hdl_cholesterol, raw.cholesterol_unit)
        .ok_or(ValidationFailure::MissingHdl)?;
    let hdl_ok = match method {
        Method::Framingham => hdl > 0.0,
        Method::Score2 => hdl >= 0.0,
    };
    if !hdl_ok {
        return Err(ValidationFailure::InvalidHdl { value: hdl });
    }

    if total < hdl {
        return Err(ValidationFailure::TotalBelowHdl { total, hdl });
    }
    if method == Method::Score2 && total == hdl {
        return Err(ValidationFailure::NonPositiveNonHdl { total });
    }

    let sbp = raw.systolic_bp.ok_or(ValidationFailure::MissingSystolicBp)?;
    if sbp <= 0 {
        return Err(ValidationFailure::NonPositiveSystolicBp { value: sbp });
    }

    if method == Method::Score2 {
        if total > MAX_PLAUSIBLE_TOTAL_MMOL || hdl > MAX_PLAUSIBLE_HDL_MMOL {
            return Err(ValidationFailure::ProbableMgDl { total, hdl });
        }

        let minimum = hdl_minimum(raw.sex);
        if hdl < minimum {
            return Err(ValidationFailure::HdlBelowMinimum {
                sex: raw.sex,
                hdl,
                minimum,
            });
        }
    }

    let region = raw
        .region
        .as_deref()
        .map(Region::from_key)
        .unwrap_or(default_region);

    Ok(ClinicalProfile {
        age: age as u32,
        sex: raw.sex,
        systolic_bp: sbp as u32,
        total_cholesterol: total,
        hdl_cholesterol: hdl,
        smoker: raw.smoker,
        bp_treated: raw.bp_treated,
        region,
    })
}

/// Normalize a cholesterol reading to mmol/L; non-finite readings count as missing
fn to_mmol(value: Option<f64>, unit: CholesterolUnit) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    Some(match unit {
        CholesterolUnit::MmolPerL => value,
        CholesterolUnit::MgPerDl => value / MGDL_PER_MMOL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(age: i32, sex: Sex, sbp: i32, total: f64, hdl: f64) -> RawProfile {
        RawProfile {
            age: Some(age),
            sex,
            systolic_bp: Some(sbp),
            total_cholesterol: Some(total),
            hdl_cholesterol: Some(hdl),
            smoker: false,
            bp_treated: false,
            region: None,
            cholesterol_unit: CholesterolUnit::MmolPerL,
        }
    }

    fn score2(raw: &RawProfile) -> Result<ClinicalProfile, ValidationFailure> {
        validate(raw, Method::Score2, Region::Moderate)
    }

    fn framingham(raw: &RawProfile) -> Result<ClinicalProfile, ValidationFailure> {
        validate(raw, Method::Framingham, Region::Moderate)
    }

    #[test]
    fn test_valid_score2_profile() {
        let mut input = raw(55, Sex::Male, 120, 4.2, 1.6);
        input.region = Some("Low".into());

        let profile = score2(&input).unwrap();
        assert_eq!(profile.age, 55);
        assert_eq!(profile.region, Region::Low);
    }

    #[test]
    fn test_missing_region_uses_default() {
        let input = raw(55, Sex::Female, 140, 5.0, 1.3);
        let profile = validate(&input, Method::Score2, Region::High).unwrap();
        assert_eq!(profile.region, Region::High);
    }

    #[test]
    fn test_age_ranges_per_method() {
        for age in [39, 70] {
            let err = score2(&raw(age, Sex::Male, 120, 5.0, 1.3)).unwrap_err();
            assert_eq!(err.code(), "age_out_of_range");
        }
        for age in [40, 69] {
            assert!(score2(&raw(age, Sex::Male, 120, 5.0, 1.3)).is_ok());
        }
        for age in [19, 80] {
            let err = framingham(&raw(age, Sex::Male, 120, 5.0, 1.3)).unwrap_err();
            assert_eq!(err.code(), "age_out_of_range");
        }
        for age in [20, 79] {
            assert!(framingham(&raw(age, Sex::Male, 120, 5.0, 1.3)).is_ok());
        }
    }

    #[test]
    fn test_first_failing_rule_is_reported() {
        let input = RawProfile {
            age: None,
            total_cholesterol: None,
            systolic_bp: None,
            ..raw(55, Sex::Male, 120, 5.0, 1.3)
        };
        assert_eq!(score2(&input).unwrap_err(), ValidationFailure::MissingAge);

        let input = RawProfile {
            total_cholesterol: None,
            systolic_bp: None,
            ..raw(55, Sex::Male, 120, 5.0, 1.3)
        };
        assert_eq!(
            score2(&input).unwrap_err(),
            ValidationFailure::MissingTotalCholesterol
        );
    }

    #[test]
    fn test_cholesterol_rules() {
        let err = score2(&raw(55, Sex::Male, 120, 0.0, 1.3)).unwrap_err();
        assert_eq!(err.code(), "non_positive_total_cholesterol");

        let err = score2(&raw(55, Sex::Male, 120, 5.0, -0.1)).unwrap_err();
        assert_eq!(err.code(), "invalid_hdl");

        // Framingham also rejects a zero HDL
        let err = framingham(&raw(55, Sex::Male, 120, 5.0, 0.0)).unwrap_err();
        assert_eq!(err.code(), "invalid_hdl");

        let err = score2(&raw(55, Sex::Male, 120, 1.2, 1.3)).unwrap_err();
        assert_eq!(err.code(), "total_below_hdl");

        let err = score2(&raw(55, Sex::Male, 120, 1.3, 1.3)).unwrap_err();
        assert_eq!(err.code(), "non_positive_non_hdl");
    }

    #[test]
    fn test_non_finite_values_count_as_missing() {
        let err = score2(&raw(55, Sex::Male, 120, f64::NAN, 1.3)).unwrap_err();
        assert_eq!(err, ValidationFailure::MissingTotalCholesterol);

        let err = score2(&raw(55, Sex::Male, 120, 5.0, f64::INFINITY)).unwrap_err();
        assert_eq!(err, ValidationFailure::MissingHdl);
    }

    #[test]
    fn test_systolic_bp_rules() {
        let input = RawProfile {
            systolic_bp: None,
            ..raw(55, Sex::Male, 120, 5.0, 1.3)
        };
        assert_eq!(
            score2(&input).unwrap_err(),
            ValidationFailure::MissingSystolicBp
        );

        let err = score2(&raw(55, Sex::Male, 0, 5.0, 1.3)).unwrap_err();
        assert_eq!(err.code(), "non_positive_systolic_bp");
    }

    #[test]
    fn test_probable_mg_dl_input() {
        let err = score2(&raw(55, Sex::Male, 120, 51.0, 1.3)).unwrap_err();
        assert_eq!(err.code(), "probable_mg_dl");

        let err = score2(&raw(55, Sex::Male, 120, 200.0, 45.0)).unwrap_err();
        assert_eq!(err.code(), "probable_mg_dl");

        // Framingham has no unit plausibility rule
        assert!(framingham(&raw(55, Sex::Male, 120, 51.0, 1.3)).is_ok());
    }

    #[test]
    fn test_declared_mg_dl_is_converted() {
        let mut input = raw(55, Sex::Male, 120, 200.0, 50.0);
        input.cholesterol_unit = CholesterolUnit::MgPerDl;

        let profile = score2(&input).unwrap();
        assert!((profile.total_cholesterol - 200.0 / MGDL_PER_MMOL).abs() < 1e-9);
        assert!((profile.hdl_cholesterol - 50.0 / MGDL_PER_MMOL).abs() < 1e-9);
    }

    #[test]
    fn test_hdl_minimum_boundaries() {
        assert!(score2(&raw(55, Sex::Male, 120, 5.0, 1.04)).is_ok());
        let err = score2(&raw(55, Sex::Male, 120, 5.0, 1.03)).unwrap_err();
        assert_eq!(err.code(), "hdl_below_minimum");

        assert!(score2(&raw(55, Sex::Female, 120, 5.0, 1.29)).is_ok());
        let err = score2(&raw(55, Sex::Female, 120, 5.0, 1.28)).unwrap_err();
        assert_eq!(
            err,
            ValidationFailure::HdlBelowMinimum {
                sex: Sex::Female,
                hdl: 1.28,
                minimum: 1.29
            }
        );

        // Framingham has no sex-specific HDL minimum
        assert!(framingham(&raw(55, Sex::Female, 120, 5.0, 0.9)).is_ok());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let input = raw(65, Sex::Male, 160, 6.5, 1.10);
        assert_eq!(score2(&input), score2(&input));

        let bad = raw(70, Sex::Male, 160, 6.5, 1.10);
        assert_eq!(score2(&bad), score2(&bad));
    }
}
