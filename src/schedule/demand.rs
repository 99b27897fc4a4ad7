use std::collections::BTreeSet;

use crate::error::ScheduleError;
use crate::member::Member;

use super::types::{DayIndex, DayRequirement, OffDaysMap, DAYS_IN_WEEK};

/// Members requesting at least this many days off get the reduced target
pub const LEAVE_THRESHOLD: usize = 3;
pub const REDUCED_TARGET: u32 = 4;
pub const FULL_TARGET: u32 = 5;

pub const WEEKDAY_BASE_SIZE: u32 = 3;
pub const RED_DAY_BASE_SIZE: u32 = 4;

/// Target shift count for a member asking for `off_count` days off
pub fn target_for(off_count: usize) -> u32 {
    if off_count >= LEAVE_THRESHOLD {
        REDUCED_TARGET
    } else {
        FULL_TARGET
    }
}

/// Per-member targets, in the same order as `members`
pub fn compute_targets(members: &[Member], off_days: &OffDaysMap) -> Vec<u32> {
    members
        .iter()
        .map(|m| target_for(off_days.get(&m.name).map_or(0, BTreeSet::len)))
        .collect()
}

/// Weekend days and declared holidays
pub fn is_red_day(day: DayIndex, holidays: &BTreeSet<DayIndex>) -> bool {
    day.is_weekend() || holidays.contains(&day)
}

/// Minimum team size for each day of the week
pub fn compute_day_requirements(
    holidays: &BTreeSet<DayIndex>,
    no_dishwasher_days: &BTreeSet<DayIndex>,
) -> [u32; DAYS_IN_WEEK] {
    let mut base = [0; DAYS_IN_WEEK];
    for day in DayIndex::week() {
        let mut size = if is_red_day(day, holidays) {
            RED_DAY_BASE_SIZE
        } else {
            WEEKDAY_BASE_SIZE
        };
        if no_dishwasher_days.contains(&day) {
            size += 1;
        }
        base[day.index()] = size;
    }
    base
}

pub fn check_feasibility(total_supply: u32, total_base_demand: u32) -> Result<(), ScheduleError> {
    if total_supply < total_base_demand {
        return Err(ScheduleError::InsufficientSupply {
            demand: total_base_demand,
            supply: total_supply,
        });
    }
    Ok(())
}

/// Extra team members any single day may take on top of its minimum.
///
/// The slack is spread uniformly, so the daily maxima can add up to more than
/// the total supply; the weekly search prunes those branches.
pub fn max_daily_extra(extra_shifts: u32) -> u32 {
    extra_shifts.div_ceil(DAYS_IN_WEEK as u32)
}

/// Everything the search needs to know about demand and supply for one week
#[derive(Debug, Clone)]
pub struct DemandPlan {
    pub targets: Vec<u32>,
    pub requirements: [DayRequirement; DAYS_IN_WEEK],
    pub total_supply: u32,
    pub total_base_demand: u32,
    pub extra_shifts: u32,
}

impl DemandPlan {
    pub fn build(
        members: &[Member],
        off_days: &OffDaysMap,
        holidays: &BTreeSet<DayIndex>,
        no_dishwasher_days: &BTreeSet<DayIndex>,
    ) -> Result<Self, ScheduleError> {
        let targets = compute_targets(members, off_days);
        let total_supply: u32 = targets.iter().sum();

        let base = compute_day_requirements(holidays, no_dishwasher_days);
        let total_base_demand: u32 = base.iter().sum();

        check_feasibility(total_supply, total_base_demand)?;

        let extra_shifts = total_supply - total_base_demand;
        let extra = max_daily_extra(extra_shifts);
        let requirements = base.map(|base_min_size| DayRequirement {
            base_min_size,
            max_size: base_min_size + extra,
        });

        Ok(Self {
            targets,
            requirements,
            total_supply,
            total_base_demand,
            extra_shifts,
        })
    }
}
