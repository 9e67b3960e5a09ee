//! Engine facade: validation followed by one of the two scoring pipelines.
//!
//! - Framingham: validate → point tables → categorize by points
//! - SCORE2: validate → calibrated model (+ fallback) → categorize by percent
//!
//! The engine owns the coefficient repository; everything else is pure.

use crate::coefficients::CoefficientRepository;
use crate::validation::{validate, ValidationFailure};
use crate::{framingham, score2};
use crate::{CalculationResult, CholesterolUnit, Config, Method, RawProfile, Region, Sex};

/// Validated calculation entry point for callers
#[derive(Debug, Default)]
pub struct RiskEngine {
    repository: CoefficientRepository,
    default_region: Region,
}

impl RiskEngine {
    pub fn new(repository: CoefficientRepository) -> Self {
        Self {
            repository,
            default_region: Region::Moderate,
        }
    }

    /// Engine wired from configuration; the coefficient file loads lazily
    pub fn from_config(config: &Config) -> Self {
        Self::new(CoefficientRepository::from_path(&config.coefficients.path))
            .with_default_region(config.score2.default_region)
    }

    /// Region used when a SCORE2 profile has no region key
    pub fn with_default_region(mut self, region: Region) -> Self {
        self.default_region = region;
        self
    }

    pub fn repository(&self) -> &CoefficientRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut CoefficientRepository {
        &mut self.repository
    }

    /// Validate and score with the given method
    pub fn calculate(
        &self,
        method: Method,
        raw: &RawProfile,
    ) -> Result<CalculationResult, ValidationFailure> {
        let profile = validate(raw, method, self.default_region)?;

        let result = match method {
            Method::Framingham => framingham::calculate(&profile),
            Method::Score2 => score2::calculate(&profile, profile.region, &self.repository),
        };

        tracing::debug!(
            ?method,
            category = %result.category,
            fallback = result.is_fallback(),
            "Calculated risk"
        );
        Ok(result)
    }

    /// Run the three reference calibration examples
    pub fn calibration_examples(&self) -> Vec<CalibrationExample> {
        calibration_example_profiles()
            .into_iter()
            .map(|(title, profile)| CalibrationExample {
                title,
                outcome: self.calculate(Method::Score2, &profile),
                profile,
            })
            .collect()
    }
}

/// One calibration example with its outcome
#[derive(Clone, Debug)]
pub struct CalibrationExample {
    pub title: Region,
    pub profile: RawProfile,
    pub outcome: Result<CalculationResult, ValidationFailure>,
}

/// Reference SCORE2 profiles for the Low, Moderate and High regions
pub fn calibration_example_profiles() -> Vec<(Region, RawProfile)> {
    let example = |age, sex, sbp, total, hdl, smoker, region: Region| RawProfile {
        age: Some(age),
        sex,
        systolic_bp: Some(sbp),
        total_cholesterol: Some(total),
        hdl_cholesterol: Some(hdl),
        smoker,
        bp_treated: false,
        region: Some(region.to_string()),
        cholesterol_unit: CholesterolUnit::MmolPerL,
    };

    vec![
        (
            Region::Low,
            example(55, Sex::Male, 120, 4.2, 1.6, false, Region::Low),
        ),
        (
            Region::Moderate,
            example(55, Sex::Female, 140, 5.0, 1.3, false, Region::Moderate),
        ),
        (
            Region::High,
            example(65, Sex::Male, 160, 6.5, 1.10, true, Region::High),
        ),
    ]
}
