use crate::models::{Category, Factor, ScoreResult, TownRecord, UserPreference};

const OPEN_POINTS: i32 = 100;
const BASE_POINTS: i32 = 70;
const UNKNOWN_COST_POINTS: i32 = 35;
const RENT_POINTS: i32 = 20;
const RENT_NEAR_POINTS: i32 = 10;
const HEALTHCARE_POINTS: i32 = 10;
const TAX_POINTS: i32 = 15;
const TAX_NEUTRAL_POINTS: i32 = 8;

/// Rent within this multiple of the ceiling still earns partial credit
const RENT_TOLERANCE: f64 = 1.25;

/// Budget-to-cost ratio floors and the base points they earn
const AFFORDABILITY_TIERS: [(f64, i32); 7] = [
    (2.0, 70),
    (1.5, 65),
    (1.2, 60),
    (1.0, 55),
    (0.9, 45),
    (0.8, 30),
    (0.7, 15),
];
const UNAFFORDABLE_POINTS: i32 = 5;

/// Upper bounds (percent) for tax tiers 5, 4, 3, 2; anything higher is tier 1
const INCOME_TAX_BOUNDS: [f64; 4] = [10.0, 20.0, 30.0, 40.0];
const PROPERTY_TAX_BOUNDS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
const SALES_TAX_BOUNDS: [f64; 4] = [10.0, 17.0, 22.0, 27.0];

const TAX_TIER_POINTS: f64 = 12.0;
const TAX_TREATY_BONUS: f64 = 1.2;
const TAX_HAVEN_BONUS: f64 = 1.5;
const FOREIGN_INCOME_BONUS: f64 = 0.9;

/// Score affordability against the user's budgets and tax sensitivities
///
/// The overall budget drives the base; rent and healthcare ceilings can only
/// add to it. With nothing but sub-budgets the category stays open, and the
/// sub-budgets are reported without pulling the score below 100.
pub fn score_cost(prefs: &UserPreference, town: &TownRecord) -> ScoreResult {
    if !prefs.has_cost_preferences() {
        return ScoreResult::open(Category::Cost, "Open to any cost of living");
    }

    if prefs.total_monthly_budget.is_none() && !prefs.is_tax_sensitive() {
        let mut factors = vec![Factor::new("Flexible on overall cost", OPEN_POINTS)];
        factors.extend(sub_budget_factors(prefs, town));
        return ScoreResult::from_factors(Category::Cost, factors);
    }

    let mut factors = vec![base_factor(prefs.total_monthly_budget, required_budget(town))];
    factors.extend(sub_budget_factors(prefs, town));
    factors.push(tax_factor(prefs, town));

    ScoreResult::from_factors(Category::Cost, factors)
}

fn sub_budget_factors(prefs: &UserPreference, town: &TownRecord) -> Vec<Factor> {
    let mut factors = Vec::with_capacity(2);

    if let (Some(ceiling), Some(rent)) = (prefs.max_monthly_rent, town.typical_rent_1bed) {
        factors.push(rent_factor(ceiling, rent));
    }

    if let (Some(budget), Some(cost)) = (prefs.monthly_healthcare_budget, town.healthcare_cost_monthly) {
        factors.push(if cost <= budget {
            Factor::new(format!("Healthcare within budget (${:.0})", cost), HEALTHCARE_POINTS)
        } else {
            Factor::new(format!("Healthcare over budget (${:.0})", cost), 0)
        });
    }

    factors
}

/// Monthly cost of living in a town, most granular data first
pub fn required_budget(town: &TownRecord) -> Option<f64> {
    let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);

    let itemized = match (
        positive(town.typical_rent_1bed),
        positive(town.groceries_cost),
        positive(town.utilities_cost),
    ) {
        (Some(rent), Some(groceries), Some(utilities)) => Some(rent + groceries + utilities),
        _ => None,
    };

    itemized
        .or_else(|| positive(town.typical_monthly_living_cost))
        .or_else(|| positive(town.cost_of_living_usd))
}

fn base_factor(budget: Option<f64>, required: Option<f64>) -> Factor {
    let budget = match budget {
        Some(budget) => budget,
        None => return Factor::new("Flexible on overall budget", BASE_POINTS),
    };
    let required = match required {
        Some(required) => required,
        None => return Factor::new("Cost data unavailable", UNKNOWN_COST_POINTS),
    };

    let ratio = budget / required;
    let points = affordability_points(ratio);
    let label = if ratio >= 1.0 {
        format!("Budget covers cost of living (${:.0} vs ${:.0})", budget, required)
    } else {
        format!("Budget short of cost of living (${:.0} vs ${:.0})", budget, required)
    };
    Factor::new(label, points)
}

pub fn affordability_points(ratio: f64) -> i32 {
    AFFORDABILITY_TIERS
        .iter()
        .find(|(floor, _)| ratio >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(UNAFFORDABLE_POINTS)
}

fn rent_factor(ceiling: f64, rent: f64) -> Factor {
    if rent <= ceiling {
        Factor::new(format!("Rent within budget (${:.0})", rent), RENT_POINTS)
    } else if rent <= ceiling * RENT_TOLERANCE {
        Factor::new(format!("Rent slightly over budget (${:.0})", rent), RENT_NEAR_POINTS)
    } else {
        Factor::new(format!("Rent over budget (${:.0})", rent), 0)
    }
}

fn tax_factor(prefs: &UserPreference, town: &TownRecord) -> Factor {
    if !prefs.is_tax_sensitive() {
        return Factor::new("Tax neutral", TAX_NEUTRAL_POINTS);
    }

    let rated = [
        (prefs.income_tax_sensitive, town.income_tax_rate_pct, INCOME_TAX_BOUNDS),
        (prefs.property_tax_sensitive, town.property_tax_rate_pct, PROPERTY_TAX_BOUNDS),
        (prefs.sales_tax_sensitive, town.sales_tax_rate_pct, SALES_TAX_BOUNDS),
    ];
    let tiers: Vec<u8> = rated
        .iter()
        .filter(|(sensitive, _, _)| *sensitive)
        .filter_map(|(_, rate, bounds)| rate.map(|r| tax_tier(r, bounds)))
        .collect();

    if tiers.is_empty() {
        return Factor::new("Tax data unavailable", TAX_NEUTRAL_POINTS);
    }

    let average = tiers.iter().map(|&t| t as f64).sum::<f64>() / tiers.len() as f64;
    let mut points = average / 5.0 * TAX_TIER_POINTS;
    if town.tax_treaty_us == Some(true) {
        points += TAX_TREATY_BONUS;
    }
    if town.tax_haven_status == Some(true) {
        points += TAX_HAVEN_BONUS;
    }
    if town.foreign_income_taxed == Some(false) {
        points += FOREIGN_INCOME_BONUS;
    }
    let points = (points.round() as i32).min(TAX_POINTS);

    let label = match average {
        a if a >= 4.5 => "Excellent tax rates",
        a if a >= 3.5 => "Good tax rates",
        a if a >= 2.5 => "Fair tax rates",
        _ => "High tax rates",
    };
    Factor::new(label, points)
}

/// Tier 5 (best) to 1 (worst) for a rate against its bounds
pub fn tax_tier(rate: f64, bounds: &[f64; 4]) -> u8 {
    bounds
        .iter()
        .position(|bound| rate <= *bound)
        .map(|i| 5 - i as u8)
        .unwrap_or(1)
}
