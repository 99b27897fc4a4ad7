pub mod types;
pub mod demand;
pub mod teams;
pub mod search;
pub mod ranking;
pub mod generate;

pub use types::{DayIndex, DayRequirement, OffDaysMap, Team, WeeklySchedule, DAYS_IN_WEEK};
pub use demand::DemandPlan;
pub use search::{SearchLimits, SEARCH_CAP};
pub use ranking::RankedSchedule;
pub use generate::{
    generate_best_schedules, try_generate, try_generate_with, verify_schedule, GenerationOutcome,
    GenerationRequest, Generated, VerificationRow, DEFAULT_TOP_N, SUCCESS_MESSAGE,
};
