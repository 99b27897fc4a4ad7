use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::member::Member;

pub const DAYS_IN_WEEK: usize = 7;

const DAY_NAMES: [&str; DAYS_IN_WEEK] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Day of the week, 0 = Monday through 6 = Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayIndex(u8);

impl DayIndex {
    pub const MONDAY: DayIndex = DayIndex(0);
    pub const WEDNESDAY: DayIndex = DayIndex(2);
    pub const SATURDAY: DayIndex = DayIndex(5);
    pub const SUNDAY: DayIndex = DayIndex(6);

    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < DAYS_IN_WEEK).then_some(DayIndex(index))
    }

    /// All seven days in week order
    pub fn week() -> impl Iterator<Item = DayIndex> {
        (0..DAYS_IN_WEEK as u8).map(DayIndex)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn is_weekend(self) -> bool {
        self.0 >= 5
    }

    pub fn name(self) -> &'static str {
        DAY_NAMES[self.index()]
    }
}

impl fmt::Display for DayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl TryFrom<u8> for DayIndex {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayIndex::new(value).ok_or(ScheduleError::InvalidDay(value))
    }
}

impl From<DayIndex> for u8 {
    fn from(day: DayIndex) -> u8 {
        day.0
    }
}

impl FromStr for DayIndex {
    type Err = ScheduleError;

    /// Accepts a numeric index ("2") or an English day name or prefix ("wed").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return DayIndex::try_from(index);
        }
        let lower = trimmed.to_lowercase();
        if lower.len() >= 3 {
            if let Some(pos) = DAY_NAMES
                .iter()
                .position(|name| name.to_lowercase().starts_with(&lower))
            {
                return Ok(DayIndex(pos as u8));
            }
        }
        Err(ScheduleError::UnknownDay(trimmed.to_string()))
    }
}

/// Requested days off, keyed by member name
pub type OffDaysMap = HashMap<String, BTreeSet<DayIndex>>;

/// Staffing bounds for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRequirement {
    pub base_min_size: u32,
    pub max_size: u32,
}

impl DayRequirement {
    /// Team sizes allowed on this day, smallest first
    pub fn sizes(&self) -> RangeInclusive<usize> {
        self.base_min_size as usize..=self.max_size as usize
    }
}

/// The members working one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub members: Vec<Member>,
}

impl Team {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Mean skill score of the team
    pub fn strength(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let total: u32 = self.members.iter().map(Member::score).sum();
        f64::from(total) / self.members.len() as f64
    }
}

/// One team per day, Monday first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    pub teams: Vec<Team>,
}

impl WeeklySchedule {
    pub fn team(&self, day: DayIndex) -> &Team {
        &self.teams[day.index()]
    }

    pub fn days(&self) -> impl Iterator<Item = (DayIndex, &Team)> {
        DayIndex::week().zip(self.teams.iter())
    }

    /// Number of days `name` is scheduled to work
    pub fn shifts_for(&self, name: &str) -> usize {
        self.teams.iter().filter(|t| t.contains(name)).count()
    }
}
