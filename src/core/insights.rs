use crate::models::{
    Category, CategoryBreakdown, Confidence, MatchQuality, MatchSummary, TownRecord,
};

/// Category score from which an insight line is emitted
const INSIGHT_SCORE: u8 = 80;
/// Category score from which a top category counts as a highlight
const HIGHLIGHT_SCORE: u8 = 70;
const MAX_HIGHLIGHTS: usize = 3;
const MAX_REASONS: usize = 5;

/// Town ratings (0-10) below this earn a warning
const WARNING_RATING: f64 = 5.0;

/// Cost score floors and the value rating they earn
const VALUE_TIERS: [(u8, u8); 3] = [(80, 5), (60, 4), (40, 3)];
const LOWEST_VALUE: u8 = 2;

/// Explain a scored match: verdict, confidence, value and the notable lines
pub fn summarize(town: &TownRecord, breakdown: &CategoryBreakdown, total_score: u8) -> MatchSummary {
    MatchSummary {
        quality: MatchQuality::from_score(total_score),
        confidence: confidence(breakdown),
        value_rating: value_rating(breakdown.cost.score),
        appeal: appeal(breakdown),
        insights: insights(town, breakdown),
        warnings: warnings(town),
        highlights: highlights(breakdown),
        match_reasons: match_reasons(breakdown),
    }
}

/// Mean category score: 80+ is high, 60+ medium
pub fn confidence(breakdown: &CategoryBreakdown) -> Confidence {
    let total: u32 = Category::ALL
        .iter()
        .map(|&c| breakdown.get(c).score as u32)
        .sum();
    let mean = total as f64 / Category::ALL.len() as f64;

    if mean >= 80.0 {
        Confidence::High
    } else if mean >= 60.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn value_rating(cost_score: u8) -> u8 {
    VALUE_TIERS
        .iter()
        .find(|(floor, _)| cost_score >= *floor)
        .map(|(_, rating)| *rating)
        .unwrap_or(LOWEST_VALUE)
}

fn display_name(category: Category) -> &'static str {
    match category {
        Category::Region => "Region",
        Category::Climate => "Climate",
        Category::Culture => "Culture",
        Category::Hobbies => "Hobbies",
        Category::Admin => "Admin",
        Category::Cost => "Costs",
    }
}

/// Best category as "<Name> Match: <score>%"; the earlier category wins a tie
fn appeal(breakdown: &CategoryBreakdown) -> String {
    let mut best = Category::Region;
    for category in Category::ALL {
        if breakdown.get(category).score > breakdown.get(best).score {
            best = category;
        }
    }
    format!("{} Match: {}%", display_name(best), breakdown.get(best).score)
}

fn insights(town: &TownRecord, breakdown: &CategoryBreakdown) -> Vec<String> {
    Category::ALL
        .iter()
        .filter(|&&c| breakdown.get(c).score >= INSIGHT_SCORE)
        .map(|&c| match c {
            Category::Region => match town.country.as_deref().map(str::trim) {
                Some(country) if !country.is_empty() => {
                    format!("Excellent location match in {}", country)
                }
                _ => "Excellent location match".to_string(),
            },
            Category::Climate => "Climate aligns well with your preferences".to_string(),
            Category::Culture => "Cultural fit matches your lifestyle".to_string(),
            Category::Hobbies => "Many activities you enjoy are available".to_string(),
            Category::Admin => "Healthcare and safety meet your standards".to_string(),
            Category::Cost => "Very affordable for your budget".to_string(),
        })
        .collect()
}

fn warnings(town: &TownRecord) -> Vec<String> {
    let mut warnings = Vec::new();
    if town.safety_score.is_some_and(|s| s < WARNING_RATING) {
        warnings.push("Safety concerns may need investigation".to_string());
    }
    if town.healthcare_score.is_some_and(|s| s < WARNING_RATING) {
        warnings.push("Healthcare may be limited".to_string());
    }
    warnings
}

/// Up to three strongest categories scoring 70 or more
fn highlights(breakdown: &CategoryBreakdown) -> Vec<String> {
    let mut ranked: Vec<(Category, u8)> = Category::ALL
        .iter()
        .map(|&c| (c, breakdown.get(c).score))
        .collect();
    // stable, so ties keep category order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(MAX_HIGHLIGHTS)
        .filter(|(_, score)| *score >= HIGHLIGHT_SCORE)
        .map(|(category, score)| format!("Strong {} match ({}%)", category, score))
        .collect()
}

/// Labels of the highest-earning factors across all categories
fn match_reasons(breakdown: &CategoryBreakdown) -> Vec<String> {
    let mut factors: Vec<_> = Category::ALL
        .iter()
        .flat_map(|&c| breakdown.get(c).factors.iter())
        .filter(|f| f.points > 0)
        .collect();
    factors.sort_by(|a, b| b.points.cmp(&a.points));

    factors
        .into_iter()
        .take(MAX_REASONS)
        .map(|f| f.label.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Factor, ScoreResult};

    fn breakdown(scores: [u8; 6]) -> CategoryBreakdown {
        let result = |category: Category, score: u8| {
            ScoreResult::from_factors(category, vec![Factor::new(format!("{} factor", category), score as i32)])
        };
        CategoryBreakdown {
            region: result(Category::Region, scores[0]),
            climate: result(Category::Climate, scores[1]),
            culture: result(Category::Culture, scores[2]),
            hobbies: result(Category::Hobbies, scores[3]),
            admin: result(Category::Admin, scores[4]),
            cost: result(Category::Cost, scores[5]),
        }
    }

    #[test]
    fn test_confidence_from_mean() {
        assert_eq!(confidence(&breakdown([80; 6])), Confidence::High);
        assert_eq!(confidence(&breakdown([100, 100, 100, 40, 40, 40])), Confidence::Medium);
        assert_eq!(confidence(&breakdown([60, 60, 60, 60, 60, 59])), Confidence::Low);
    }

    #[test]
    fn test_value_rating_tiers() {
        assert_eq!(value_rating(100), 5);
        assert_eq!(value_rating(80), 5);
        assert_eq!(value_rating(79), 4);
        assert_eq!(value_rating(40), 3);
        assert_eq!(value_rating(39), 2);
        assert_eq!(value_rating(0), 2);
    }

    #[test]
    fn test_appeal_names_best_category() {
        assert_eq!(appeal(&breakdown([50, 92, 60, 10, 70, 80])), "Climate Match: 92%");
        assert_eq!(appeal(&breakdown([50, 60, 60, 10, 70, 95])), "Costs Match: 95%");
        // tie goes to the earlier category
        assert_eq!(appeal(&breakdown([90, 90, 60, 10, 70, 80])), "Region Match: 90%");
    }

    #[test]
    fn test_highlights_top_three_above_seventy() {
        let lines = highlights(&breakdown([100, 69, 85, 70, 90, 75]));
        assert_eq!(
            lines,
            vec![
                "Strong region match (100%)",
                "Strong admin match (90%)",
                "Strong culture match (85%)",
            ]
        );

        let weak = highlights(&breakdown([72, 50, 40, 30, 20, 10]));
        assert_eq!(weak, vec!["Strong region match (72%)"]);
    }

    #[test]
    fn test_insights_and_warnings() {
        let town = TownRecord {
            country: Some("Portugal".into()),
            safety_score: Some(4.2),
            healthcare_score: Some(8.0),
            ..Default::default()
        };
        let summary = summarize(&town, &breakdown([85, 40, 40, 40, 40, 90]), 55);

        assert_eq!(
            summary.insights,
            vec!["Excellent location match in Portugal", "Very affordable for your budget"]
        );
        assert_eq!(summary.warnings, vec!["Safety concerns may need investigation"]);
        assert_eq!(summary.quality, MatchQuality::Partial);
        assert_eq!(summary.value_rating, 5);

        let unknown = summarize(&TownRecord::default(), &breakdown([85, 40, 40, 40, 40, 40]), 50);
        assert_eq!(unknown.insights, vec!["Excellent location match"]);
        assert!(unknown.warnings.is_empty());
    }

    #[test]
    fn test_match_reasons_skip_empty_factors() {
        let mut scores = breakdown([30, 0, 90, 0, 50, 10]);
        scores.region.factors.push(Factor::new("Vegetation match 0/2", 0));

        let reasons = match_reasons(&scores);
        assert_eq!(
            reasons,
            vec!["culture factor", "admin factor", "region factor", "cost factor"]
        );
    }
}
