//! Deduplication and fairness ranking of complete weekly schedules.
//!
//! Schedules are ordered by two population variances, lowest first:
//!
//! | Key | Over | Meaning |
//! |-----|------|---------|
//! | red-day variance | members | how evenly weekend and holiday shifts are shared |
//! | team-strength variance | days | how steady the mean team score is across the week |
//!
//! Ties on both keys keep the order in which the search found the schedules.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::member::Member;

use super::demand::is_red_day;
use super::teams::Candidate;
use super::types::{DayIndex, Team, WeeklySchedule, DAYS_IN_WEEK};

/// A schedule together with the metrics it was ranked by
#[derive(Debug, Clone, Serialize)]
pub struct RankedSchedule {
    pub schedule: WeeklySchedule,
    pub red_day_variance: f64,
    pub team_strength_variance: f64,
}

/// Population variance (divisor N). Empty input has zero variance.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Per-day member names, sorted, identifying a schedule independently of
/// how the search reached it.
pub fn dedup_key<'m>(
    members: &'m [Member],
    pools: &[Vec<Candidate>],
    choice: &[usize; DAYS_IN_WEEK],
) -> Vec<Vec<&'m str>> {
    choice
        .iter()
        .enumerate()
        .map(|(day, &index)| {
            let mut names: Vec<&str> = pools[day][index]
                .members
                .iter()
                .map(|&m| members[m].name.as_str())
                .collect();
            names.sort_unstable();
            names
        })
        .collect()
}

fn red_day_variance(
    members: &[Member],
    pools: &[Vec<Candidate>],
    choice: &[usize; DAYS_IN_WEEK],
    holidays: &BTreeSet<DayIndex>,
) -> f64 {
    let mut red_shifts = vec![0u32; members.len()];
    for day in DayIndex::week().filter(|d| is_red_day(*d, holidays)) {
        for &member in &pools[day.index()][choice[day.index()]].members {
            red_shifts[member] += 1;
        }
    }
    let values: Vec<f64> = red_shifts.into_iter().map(f64::from).collect();
    population_variance(&values)
}

fn resolve(
    members: &[Member],
    pools: &[Vec<Candidate>],
    choice: &[usize; DAYS_IN_WEEK],
) -> WeeklySchedule {
    let teams = choice
        .iter()
        .enumerate()
        .map(|(day, &index)| Team {
            members: pools[day][index]
                .members
                .iter()
                .map(|&m| members[m].clone())
                .collect(),
        })
        .collect();
    WeeklySchedule { teams }
}

fn compare(a: &RankedSchedule, b: &RankedSchedule) -> Ordering {
    a.red_day_variance
        .total_cmp(&b.red_day_variance)
        .then(a.team_strength_variance.total_cmp(&b.team_strength_variance))
}

/// Drops duplicate schedules, ranks the rest and keeps the best `top_n`.
pub fn rank_schedules(
    members: &[Member],
    pools: &[Vec<Candidate>],
    found: &[[usize; DAYS_IN_WEEK]],
    holidays: &BTreeSet<DayIndex>,
    top_n: usize,
) -> Vec<RankedSchedule> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<RankedSchedule> = Vec::new();

    for choice in found {
        if !seen.insert(dedup_key(members, pools, choice)) {
            continue;
        }

        let schedule = resolve(members, pools, choice);
        let strengths: Vec<f64> = schedule.teams.iter().map(Team::strength).collect();
        ranked.push(RankedSchedule {
            red_day_variance: red_day_variance(members, pools, choice, holidays),
            team_strength_variance: population_variance(&strengths),
            schedule,
        });
    }

    // stable, so equal keys stay in discovery order
    ranked.sort_by(compare);
    ranked.truncate(top_n);
    ranked
}
