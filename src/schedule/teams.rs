//! Candidate teams for a single day.
//!
//! Every subset of the available members is generated for each allowed size
//! and then filtered, so the pool grows combinatorially with the number of
//! members available that day. That is fine for a kitchen roster (up to
//! roughly 15-20 people a day) but not beyond.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use itertools::Itertools;

use crate::member::{Member, SkillTier};

use super::types::{DayIndex, OffDaysMap};

/// Members able to run the main station a valid team needs
pub const MIN_MAIN_CAPABLE: usize = 2;
/// Members able to place orders a valid team needs
pub const MIN_ORDERING_CAPABLE: usize = 1;

/// A valid team for one day, as positions in the member list (ascending)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub members: Vec<usize>,
}

/// Coverage rule every team must satisfy
pub fn is_valid_team(team: &[&Member], needs_dishwasher: bool) -> bool {
    let main_capable = team.iter().filter(|m| m.can_do(SkillTier::Main)).count();
    let ordering_capable = team.iter().filter(|m| m.can_do(SkillTier::Ordering)).count();

    if needs_dishwasher && !team.iter().any(|m| m.can_dishwash) {
        return false;
    }

    main_capable >= MIN_MAIN_CAPABLE && ordering_capable >= MIN_ORDERING_CAPABLE
}

/// Enumerates every valid team for `day`, smallest sizes first.
pub fn enumerate_teams(
    members: &[Member],
    day: DayIndex,
    off_days: &OffDaysMap,
    allowed_sizes: RangeInclusive<usize>,
    no_dishwasher_days: &BTreeSet<DayIndex>,
) -> Vec<Candidate> {
    let available: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|(_, m)| !off_days.get(&m.name).is_some_and(|off| off.contains(&day)))
        .map(|(i, _)| i)
        .collect();

    let needs_dishwasher = no_dishwasher_days.contains(&day);
    let mut candidates = Vec::new();

    for size in allowed_sizes {
        if available.len() < size {
            continue;
        }

        for combo in available.iter().copied().combinations(size) {
            let team: Vec<&Member> = combo.iter().map(|&i| &members[i]).collect();
            if is_valid_team(&team, needs_dishwasher) {
                candidates.push(Candidate { members: combo });
            }
        }
    }

    candidates
}
