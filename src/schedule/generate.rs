use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ScheduleError;
use crate::member::Member;

use super::demand::{target_for, DemandPlan};
use super::ranking::{rank_schedules, RankedSchedule};
use super::search::{SearchLimits, WeeklySearch};
use super::teams::enumerate_teams;
use super::types::{DayIndex, OffDaysMap, WeeklySchedule};

pub const DEFAULT_TOP_N: usize = 5;
pub const SUCCESS_MESSAGE: &str = "success";

/// Everything needed to generate one week's schedules.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub members: Vec<Member>,
    pub off_days: OffDaysMap,
    pub no_dishwasher_days: BTreeSet<DayIndex>,
    /// Weekday holidays. Weekend entries are accepted but change nothing.
    pub public_holidays: BTreeSet<DayIndex>,
    pub top_n: usize,
}

impl GenerationRequest {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            off_days: OffDaysMap::new(),
            no_dishwasher_days: BTreeSet::new(),
            public_holidays: BTreeSet::new(),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_off_days(
        mut self,
        name: impl Into<String>,
        days: impl IntoIterator<Item = DayIndex>,
    ) -> Self {
        self.off_days.entry(name.into()).or_default().extend(days);
        self
    }

    pub fn with_public_holidays(mut self, days: impl IntoIterator<Item = DayIndex>) -> Self {
        self.public_holidays.extend(days);
        self
    }

    pub fn with_no_dishwasher_days(mut self, days: impl IntoIterator<Item = DayIndex>) -> Self {
        self.no_dishwasher_days.extend(days);
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Rejects requests the generator cannot interpret.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.top_n == 0 {
            return Err(ScheduleError::InvalidTopN);
        }

        let mut names = HashSet::new();
        for member in &self.members {
            if !names.insert(member.name.as_str()) {
                return Err(ScheduleError::DuplicateMember(member.name.clone()));
            }
        }

        // deterministic error when several names are unknown
        let mut unknown: Vec<&String> = self
            .off_days
            .keys()
            .filter(|name| !names.contains(name.as_str()))
            .collect();
        unknown.sort();
        if let Some(name) = unknown.first() {
            return Err(ScheduleError::UnknownMember((*name).clone()));
        }

        Ok(())
    }

    /// Target shift count of the member called `name`
    pub fn target_of(&self, name: &str) -> u32 {
        target_for(self.off_days.get(name).map_or(0, BTreeSet::len))
    }
}

/// Ranked schedules produced by a successful run
#[derive(Debug, Clone)]
pub struct Generated {
    pub schedules: Vec<RankedSchedule>,
    pub extra_shifts: u32,
    /// The search stopped at its cap; the ranking covers only what was found
    pub search_capped: bool,
}

impl Generated {
    pub fn message(&self) -> String {
        if self.extra_shifts == 0 {
            SUCCESS_MESSAGE.to_string()
        } else {
            format!(
                "{} spare shift(s) were distributed flexibly across the week",
                self.extra_shifts
            )
        }
    }
}

/// Runs the full pipeline with the default search cap.
pub fn try_generate(request: &GenerationRequest) -> Result<Generated, ScheduleError> {
    try_generate_with(request, SearchLimits::default())
}

pub fn try_generate_with(
    request: &GenerationRequest,
    limits: SearchLimits,
) -> Result<Generated, ScheduleError> {
    request.validate()?;
    // a zero cap would report every request as having no joint schedule
    let limits = SearchLimits {
        max_schedules: limits.max_schedules.max(1),
    };

    let plan = DemandPlan::build(
        &request.members,
        &request.off_days,
        &request.public_holidays,
        &request.no_dishwasher_days,
    )?;
    debug!(
        supply = plan.total_supply,
        demand = plan.total_base_demand,
        extra = plan.extra_shifts,
        "demand planned"
    );

    let mut pools = Vec::with_capacity(plan.requirements.len());
    for day in DayIndex::week() {
        let requirement = plan.requirements[day.index()];
        let teams = enumerate_teams(
            &request.members,
            day,
            &request.off_days,
            requirement.sizes(),
            &request.no_dishwasher_days,
        );
        debug!(%day, candidates = teams.len(), "enumerated daily teams");
        if teams.is_empty() {
            return Err(ScheduleError::DayInfeasible { day });
        }
        pools.push(teams);
    }

    let outcome = WeeklySearch::new(
        &pools,
        &plan.targets,
        &plan.requirements,
        plan.total_supply,
        limits,
    )
    .run();

    if outcome.capped {
        warn!(
            cap = limits.max_schedules,
            "search stopped at its cap; ranking a partial set of schedules"
        );
    }
    if outcome.schedules.is_empty() {
        return Err(ScheduleError::NoJointSchedule);
    }

    let schedules = rank_schedules(
        &request.members,
        &pools,
        &outcome.schedules,
        &request.public_holidays,
        request.top_n,
    );
    info!(
        found = outcome.schedules.len(),
        returned = schedules.len(),
        "generated weekly schedules"
    );

    Ok(Generated {
        schedules,
        extra_shifts: plan.extra_shifts,
        search_capped: outcome.capped,
    })
}

/// Flat result handed to callers that only display messages.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub success: bool,
    pub message: String,
    pub schedules: Vec<RankedSchedule>,
    pub extra_shifts: u32,
    pub search_capped: bool,
}

impl From<Result<Generated, ScheduleError>> for GenerationOutcome {
    fn from(result: Result<Generated, ScheduleError>) -> Self {
        match result {
            Ok(generated) => Self {
                success: true,
                message: generated.message(),
                extra_shifts: generated.extra_shifts,
                search_capped: generated.search_capped,
                schedules: generated.schedules,
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
                schedules: Vec::new(),
                extra_shifts: 0,
                search_capped: false,
            },
        }
    }
}

pub fn generate_best_schedules(request: &GenerationRequest) -> GenerationOutcome {
    try_generate(request).into()
}

/// One line of the per-member check shown under each schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRow {
    pub name: String,
    pub target: u32,
    pub actual: u32,
    /// Reduced target applied for three or more days off
    pub on_leave: bool,
}

pub fn verify_schedule(request: &GenerationRequest, schedule: &WeeklySchedule) -> Vec<VerificationRow> {
    request
        .members
        .iter()
        .map(|m| {
            let target = request.target_of(&m.name);
            VerificationRow {
                name: m.name.clone(),
                target,
                actual: schedule.shifts_for(&m.name) as u32,
                on_leave: target < target_for(0),
            }
        })
        .collect()
}
