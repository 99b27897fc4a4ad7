use super::teams::Candidate;
use super::types::{DayRequirement, DAYS_IN_WEEK};

/// Complete schedules collected before the search gives up on finding more
pub const SEARCH_CAP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_schedules: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_schedules: SEARCH_CAP,
        }
    }
}

/// Complete schedules found by the search, as a candidate index per day.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub schedules: Vec<[usize; DAYS_IN_WEEK]>,
    /// The cap was reached, so `schedules` is only part of the feasible set
    pub capped: bool,
}

/// Depth-first search over one team choice per day.
///
/// Per-member counts are updated in place when a team is chosen and undone on
/// the way back up, so sibling branches never observe each other's state.
pub struct WeeklySearch<'a> {
    pools: &'a [Vec<Candidate>],
    targets: &'a [u32],
    total_supply: u32,
    limits: SearchLimits,
    /// Sum of base minimums from a day to the end of the week
    min_suffix: [u32; DAYS_IN_WEEK + 1],
    /// Sum of maximum sizes from a day to the end of the week
    max_suffix: [u32; DAYS_IN_WEEK + 1],
    counts: Vec<u32>,
    assigned: u32,
    chosen: [usize; DAYS_IN_WEEK],
    found: Vec<[usize; DAYS_IN_WEEK]>,
}

impl<'a> WeeklySearch<'a> {
    pub fn new(
        pools: &'a [Vec<Candidate>],
        targets: &'a [u32],
        requirements: &[DayRequirement; DAYS_IN_WEEK],
        total_supply: u32,
        limits: SearchLimits,
    ) -> Self {
        let mut min_suffix = [0; DAYS_IN_WEEK + 1];
        let mut max_suffix = [0; DAYS_IN_WEEK + 1];
        for day in (0..DAYS_IN_WEEK).rev() {
            min_suffix[day] = min_suffix[day + 1] + requirements[day].base_min_size;
            max_suffix[day] = max_suffix[day + 1] + requirements[day].max_size;
        }

        Self {
            pools,
            targets,
            total_supply,
            limits,
            min_suffix,
            max_suffix,
            counts: vec![0; targets.len()],
            assigned: 0,
            chosen: [0; DAYS_IN_WEEK],
            found: Vec::new(),
        }
    }

    pub fn run(mut self) -> SearchOutcome {
        if self.pools.len() == DAYS_IN_WEEK {
            self.solve(0);
        }
        let capped = self.found.len() >= self.limits.max_schedules;
        SearchOutcome {
            schedules: self.found,
            capped,
        }
    }

    fn is_full(&self) -> bool {
        self.found.len() >= self.limits.max_schedules
    }

    /// False when no completion of the current partial week can hit every target.
    fn is_viable(&self, day: usize) -> bool {
        let remaining = (DAYS_IN_WEEK - day) as u32;

        // overshoot
        if self.counts.iter().zip(self.targets).any(|(&c, &t)| c > t) {
            return false;
        }
        // working every remaining day still falls short
        if self.counts.iter().zip(self.targets).any(|(&c, &t)| c + remaining < t) {
            return false;
        }
        // minimum staffing alone would use more shifts than members have
        if self.assigned + self.min_suffix[day] > self.total_supply {
            return false;
        }
        // maximum staffing still leaves shifts unused
        if self.assigned + self.max_suffix[day] < self.total_supply {
            return false;
        }
        true
    }

    fn solve(&mut self, day: usize) {
        if self.is_full() || !self.is_viable(day) {
            return;
        }

        if day == DAYS_IN_WEEK {
            if self.counts.iter().zip(self.targets).all(|(c, t)| c == t) {
                self.found.push(self.chosen);
            }
            return;
        }

        let pools = self.pools;
        for (index, candidate) in pools[day].iter().enumerate() {
            self.assign(candidate);
            self.chosen[day] = index;
            self.solve(day + 1);
            self.unassign(candidate);

            if self.is_full() {
                return;
            }
        }
    }

    fn assign(&mut self, candidate: &Candidate) {
        for &member in &candidate.members {
            self.counts[member] += 1;
        }
        self.assigned += candidate.members.len() as u32;
    }

    fn unassign(&mut self, candidate: &Candidate) {
        for &member in &candidate.members {
            self.counts[member] -= 1;
        }
        self.assigned -= candidate.members.len() as u32;
    }
}
