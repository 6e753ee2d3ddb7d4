//! Savings-plan allocation heuristic. Pure text processing, entirely
//! independent of the on-chain data pipeline: a free-text goal in, a
//! percentage allocation out.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "medium-high")]
    MediumHigh,
    #[serde(rename = "high")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub stable: i32,
    pub real_estate_hedge: i32,
    pub equity_hedge: i32,
    pub bond_hedge: i32,
    pub weth: i32,
    pub cb_eth: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub timeline: String,
    pub risk_level: RiskLevel,
    pub allocation: Allocation,
    pub goal: String,
}

/// Reads an investment horizon in years out of a free-text goal.
/// `"3-5 years"` averages the bounds, `"10 years"` and `"next 10"` read the
/// number, and short/medium/long-term phrasing maps to 1/5/15. Defaults to
/// a 5-year horizon.
pub fn parse_timeline(goal: &str) -> f64 {
    let lower = goal.to_lowercase();

    if let Some(years) = years_before_keyword(&lower) {
        return years;
    }
    if let Some(years) = number_after_word(&lower, "next") {
        return years;
    }

    if contains_any(&lower, &["short-term", "short term", "soon", "immedia"]) {
        return 1.0;
    }
    if contains_any(&lower, &["medium-term", "medium term"]) {
        return 5.0;
    }
    if contains_any(&lower, &["long-term", "long term", "retire"]) {
        return 15.0;
    }

    5.0
}

pub fn determine_risk_level(years: f64) -> RiskLevel {
    if years < 2.0 {
        RiskLevel::Low
    } else if years < 5.0 {
        RiskLevel::Medium
    } else if years < 10.0 {
        RiskLevel::MediumHigh
    } else {
        RiskLevel::High
    }
}

/// Base allocation by horizon, nudged by goal keywords, clamped to
/// [0, 100] per leg and rescaled so the legs sum to exactly 100.
pub fn compute_allocation(years: f64, goal: &str) -> Allocation {
    let mut alloc = if years < 2.0 {
        Allocation { stable: 60, real_estate_hedge: 5, equity_hedge: 5, bond_hedge: 10, weth: 10, cb_eth: 10 }
    } else if years < 5.0 {
        Allocation { stable: 35, real_estate_hedge: 10, equity_hedge: 10, bond_hedge: 10, weth: 20, cb_eth: 15 }
    } else if years < 10.0 {
        Allocation { stable: 20, real_estate_hedge: 10, equity_hedge: 15, bond_hedge: 5, weth: 30, cb_eth: 20 }
    } else {
        Allocation { stable: 10, real_estate_hedge: 10, equity_hedge: 15, bond_hedge: 5, weth: 35, cb_eth: 25 }
    };

    let lower = goal.to_lowercase();

    if contains_any(
        &lower,
        &["house", "home", "real estate", "realestate", "property", "apartment", "condo"],
    ) {
        alloc.real_estate_hedge += 10;
        alloc.stable -= 10;
    }
    if contains_any(&lower, &["safe", "conservat", "low risk", "low-risk", "preserv"]) {
        alloc.bond_hedge += 10;
        alloc.equity_hedge -= 10;
    }
    if contains_any(&lower, &["grow", "aggress", "high return", "high-return", "maxim"]) {
        alloc.equity_hedge += 10;
        alloc.stable -= 10;
    }

    for leg in legs_mut(&mut alloc) {
        *leg = (*leg).clamp(0, 100);
    }

    // Rescale so the legs sum to exactly 100, folding the rounding
    // remainder into the stable leg.
    let total: i32 = legs_mut(&mut alloc).into_iter().map(|leg| *leg).sum();
    if total != 100 && total > 0 {
        let scale = 100.0 / total as f64;
        for leg in legs_mut(&mut alloc) {
            *leg = (*leg as f64 * scale).round() as i32;
        }
        let new_total: i32 = legs_mut(&mut alloc).into_iter().map(|leg| *leg).sum();
        alloc.stable += 100 - new_total;
    }

    alloc
}

pub fn generate_plan(goal: &str) -> Plan {
    let years = parse_timeline(goal);
    let risk_level = determine_risk_level(years);
    let allocation = compute_allocation(years, goal);

    let timeline = if years < 2.0 {
        "< 2 years"
    } else if years < 5.0 {
        "2-5 years"
    } else if years < 10.0 {
        "5-10 years"
    } else {
        "10+ years"
    };

    Plan {
        timeline: timeline.to_string(),
        risk_level,
        allocation,
        goal: goal.to_string(),
    }
}

fn legs_mut(alloc: &mut Allocation) -> [&mut i32; 6] {
    [
        &mut alloc.stable,
        &mut alloc.real_estate_hedge,
        &mut alloc.equity_hedge,
        &mut alloc.bond_hedge,
        &mut alloc.weth,
        &mut alloc.cb_eth,
    ]
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Matches `N years` and `N-M years`, returning N or the range midpoint.
fn years_before_keyword(lower: &str) -> Option<f64> {
    let idx = lower.find("year")?;
    let before = lower[..idx].trim_end();
    let (high, rest) = trailing_number(before)?;
    let rest = rest.trim_end();
    if let Some(rest) = rest.strip_suffix('-') {
        if let Some((low, _)) = trailing_number(rest.trim_end()) {
            return Some((low + high) / 2.0);
        }
    }
    Some(high)
}

/// First number directly following `word`, as in `next 10`.
fn number_after_word(lower: &str, word: &str) -> Option<f64> {
    let idx = lower.find(word)?;
    let rest = lower[idx + word.len()..].trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok()
}

/// Splits a trailing run of digits off `s`, if any.
fn trailing_number(s: &str) -> Option<(f64, &str)> {
    let start = s
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    if start == s.len() {
        return None;
    }
    s[start..].parse().ok().map(|n| (n, &s[..start]))
}
