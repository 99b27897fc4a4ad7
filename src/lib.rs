//! Weekly kitchen shift scheduling.
//!
//! Members declare days off; the generator finds every week in which each
//! member works exactly their target number of days with a qualified team on
//! every day, then ranks those weeks by how fairly weekend and holiday shifts
//! are shared.

pub mod display;
pub mod error;
pub mod logging;
pub mod member;
pub mod registry;
pub mod schedule;
pub mod web;

pub use error::{RegistryError, ScheduleError};
pub use member::{Member, SkillTier};
pub use registry::MemberRegistry;
