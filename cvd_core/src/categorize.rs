//! Score to category mapping for both methods.

use crate::{AdviceKey, RiskCategory};

fn advice_for(category: RiskCategory) -> AdviceKey {
    match category {
        RiskCategory::Low => AdviceKey::ReinforcePrevention,
        RiskCategory::Medium => AdviceKey::ConsiderIntervention,
        RiskCategory::High => AdviceKey::IntensiveAction,
    }
}

/// SCORE2: below 5% Low, below 10% Medium, otherwise High
pub fn categorize_percent(risk_percent: f64) -> (RiskCategory, AdviceKey) {
    let category = if risk_percent < 5.0 {
        RiskCategory::Low
    } else if risk_percent < 10.0 {
        RiskCategory::Medium
    } else {
        RiskCategory::High
    };
    (category, advice_for(category))
}

/// Framingham: up to 10 points Low, up to 20 Medium, otherwise High
pub fn categorize_points(points: i32) -> (RiskCategory, AdviceKey) {
    let category = match points {
        i32::MIN..=10 => RiskCategory::Low,
        11..=20 => RiskCategory::Medium,
        _ => RiskCategory::High,
    };
    (category, advice_for(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_breakpoints() {
        assert_eq!(categorize_percent(0.0).0, RiskCategory::Low);
        assert_eq!(categorize_percent(4.999).0, RiskCategory::Low);
        assert_eq!(categorize_percent(5.0).0, RiskCategory::Medium);
        assert_eq!(categorize_percent(9.999).0, RiskCategory::Medium);
        assert_eq!(
            categorize_percent(10.0),
            (RiskCategory::High, AdviceKey::IntensiveAction)
        );
        assert_eq!(categorize_percent(100.0).0, RiskCategory::High);
    }

    #[test]
    fn test_points_breakpoints() {
        assert_eq!(
            categorize_points(-12),
            (RiskCategory::Low, AdviceKey::ReinforcePrevention)
        );
        assert_eq!(categorize_points(10).0, RiskCategory::Low);
        assert_eq!(
            categorize_points(11),
            (RiskCategory::Medium, AdviceKey::ConsiderIntervention)
        );
        assert_eq!(categorize_points(20).0, RiskCategory::Medium);
        assert_eq!(categorize_points(21).0, RiskCategory::High);
    }

    #[test]
    fn test_points_category_is_monotonic() {
        let mut previous = RiskCategory::Low;
        for points in -15..40 {
            let (category, _) = categorize_points(points);
            assert!(category >= previous);
            previous = category;
        }
    }
}
