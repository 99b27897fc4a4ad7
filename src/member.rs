use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Highest kitchen role a member can cover, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Sub,
    Noodle,
    Main,
    Ordering,
}

impl SkillTier {
    pub const ALL: [SkillTier; 4] = [
        SkillTier::Sub,
        SkillTier::Noodle,
        SkillTier::Main,
        SkillTier::Ordering,
    ];

    /// Capability score used both for role checks and team strength
    pub fn score(self) -> u32 {
        match self {
            SkillTier::Ordering => 4,
            SkillTier::Main => 3,
            SkillTier::Noodle => 2,
            SkillTier::Sub => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SkillTier::Sub => "sub",
            SkillTier::Noodle => "noodle",
            SkillTier::Main => "main",
            SkillTier::Ordering => "ordering",
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for SkillTier {
    type Err = RegistryError;

    /// Accepts the English labels as well as the labels used by the kitchen's
    /// own member sheet (서브, 면말이, 메인, 발주).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sub" | "서브" => Ok(SkillTier::Sub),
            "noodle" | "면말이" => Ok(SkillTier::Noodle),
            "main" | "메인" => Ok(SkillTier::Main),
            "ordering" | "발주" => Ok(SkillTier::Ordering),
            _ => Err(RegistryError::UnknownTier(s.trim().to_string())),
        }
    }
}

/// One kitchen staff record. The score is always derived from the tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub top_tier: SkillTier,
    pub can_dishwash: bool,
}

impl Member {
    pub fn new(name: impl Into<String>, top_tier: SkillTier, can_dishwash: bool) -> Self {
        Self {
            name: name.into(),
            top_tier,
            can_dishwash,
        }
    }

    pub fn score(&self) -> u32 {
        self.top_tier.score()
    }

    /// True when the member's tier is at or above `role`
    pub fn can_do(&self, role: SkillTier) -> bool {
        self.score() >= role.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_follow_tier_order() {
        let scores: Vec<u32> = SkillTier::ALL.iter().map(|t| t.score()).collect();
        assert_eq!(scores, vec![1, 2, 3, 4]);
        assert!(SkillTier::Ordering > SkillTier::Main);
    }

    #[test]
    fn same_tier_means_same_score() {
        let a = Member::new("a", SkillTier::Noodle, true);
        let b = Member::new("b", SkillTier::Noodle, false);
        assert_eq!(a.score(), b.score());
    }

    #[test]
    fn can_do_covers_lower_roles() {
        let orderer = Member::new("o", SkillTier::Ordering, false);
        let main = Member::new("m", SkillTier::Main, false);
        assert!(orderer.can_do(SkillTier::Main));
        assert!(orderer.can_do(SkillTier::Ordering));
        assert!(main.can_do(SkillTier::Main));
        assert!(!main.can_do(SkillTier::Ordering));
    }

    #[test]
    fn parses_english_and_sheet_labels() {
        assert_eq!("Main".parse::<SkillTier>().unwrap(), SkillTier::Main);
        assert_eq!(" ordering ".parse::<SkillTier>().unwrap(), SkillTier::Ordering);
        assert_eq!("발주".parse::<SkillTier>().unwrap(), SkillTier::Ordering);
        assert_eq!("면말이".parse::<SkillTier>().unwrap(), SkillTier::Noodle);
        assert!(matches!(
            "chef".parse::<SkillTier>(),
            Err(RegistryError::UnknownTier(t)) if t == "chef"
        ));
    }
}
