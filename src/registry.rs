use std::path::{Path, PathBuf};

use csv::{Reader, Writer};
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::member::{Member, SkillTier};

const HEADERS: [&str; 4] = ["name", "top_tier", "can_dishwash", "score"];

/// Parses the dishwashing column ("O"/"X" in the kitchen sheet)
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "o" || lower == "yes" || lower == "true" || lower == "1"
}

/// Loads members from a CSV file.
///
/// Columns are found by header name; both the English headers written by
/// [`save_members`] and the kitchen sheet's own headers (이름, 최고 역량,
/// 설거지 가능여부) are recognised. The score column is ignored since it is
/// derived from the tier. A repeated name replaces the earlier row in place.
pub fn load_members<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Member>, RegistryError> {
    let mut reader = Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();

    let column = |names: &[&str], fallback: usize| {
        headers
            .iter()
            .position(|h| names.contains(&h.trim()))
            .unwrap_or(fallback)
    };
    let name_col = column(&["name", "이름"], 0);
    let tier_col = column(&["top_tier", "최고 역량"], 1);
    let dishwash_col = column(&["can_dishwash", "설거지 가능여부"], 2);

    let mut members: Vec<Member> = Vec::new();
    for result in reader.records() {
        let record = result?;

        let name = record.get(name_col).unwrap_or("").trim().to_string();
        // blank rows are common at the end of hand-edited sheets
        if name.is_empty() {
            continue;
        }

        let top_tier: SkillTier = record.get(tier_col).unwrap_or("").parse()?;
        let can_dishwash = parse_bool(record.get(dishwash_col).unwrap_or(""));
        let member = Member::new(name, top_tier, can_dishwash);

        if let Some(existing) = members.iter_mut().find(|m| m.name == member.name) {
            warn!(name = %member.name, "member listed twice; keeping the later row");
            *existing = member;
        } else {
            members.push(member);
        }
    }

    Ok(members)
}

/// Overwrites `csv_path` with the given members.
pub fn save_members<P: AsRef<Path>>(csv_path: P, members: &[Member]) -> Result<(), RegistryError> {
    let mut writer = Writer::from_path(csv_path)?;
    writer.write_record(HEADERS)?;
    for member in members {
        let score = member.score().to_string();
        writer.write_record([
            member.name.as_str(),
            member.top_tier.label(),
            if member.can_dishwash { "O" } else { "X" },
            score.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// File-backed list of kitchen members. Order is insertion order.
#[derive(Debug, Clone)]
pub struct MemberRegistry {
    path: PathBuf,
    members: Vec<Member>,
}

impl MemberRegistry {
    /// Opens the registry at `path`; a missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let members = if path.exists() {
            load_members(&path)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), count = members.len(), "member registry loaded");
        Ok(Self { path, members })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn add(&mut self, member: Member) -> Result<(), RegistryError> {
        if self.get(&member.name).is_some() {
            return Err(RegistryError::DuplicateMember(member.name));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Member, RegistryError> {
        let position = self
            .members
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| RegistryError::UnknownMember(name.to_string()))?;
        Ok(self.members.remove(position))
    }

    pub fn save(&self) -> Result<(), RegistryError> {
        save_members(&self.path, &self.members)
    }

    /// Adds `member` and writes the file. A failed write leaves the registry unchanged.
    pub fn add_and_save(&mut self, member: Member) -> Result<(), RegistryError> {
        self.add(member)?;
        if let Err(e) = self.save() {
            self.members.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Removes `name` and writes the file. A failed write puts the member back in place.
    pub fn remove_and_save(&mut self, name: &str) -> Result<Member, RegistryError> {
        let position = self
            .members
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| RegistryError::UnknownMember(name.to_string()))?;
        let member = self.members.remove(position);
        if let Err(e) = self.save() {
            self.members.insert(position, member);
            return Err(e);
        }
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let registry = MemberRegistry::open(tmp.path().join("members.csv")).unwrap();
        assert!(registry.members().is_empty());
    }

    #[test]
    fn add_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("members.csv");

        let mut registry = MemberRegistry::open(&path).unwrap();
        registry.add(Member::new("Jisoo", SkillTier::Ordering, true)).unwrap();
        registry.add(Member::new("Minho", SkillTier::Noodle, false)).unwrap();
        registry.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,top_tier,can_dishwash,score"));
        assert!(content.contains("Jisoo,ordering,O,4"));

        let reloaded = MemberRegistry::open(&path).unwrap();
        assert_eq!(reloaded.members(), registry.members());
    }

    #[test]
    fn duplicate_and_unknown_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut registry = MemberRegistry::open(tmp.path().join("m.csv")).unwrap();
        registry.add(Member::new("a", SkillTier::Main, false)).unwrap();

        assert!(matches!(
            registry.add(Member::new("a", SkillTier::Sub, true)),
            Err(RegistryError::DuplicateMember(n)) if n == "a"
        ));
        assert!(matches!(
            registry.remove("b"),
            Err(RegistryError::UnknownMember(n)) if n == "b"
        ));
        assert_eq!(registry.remove("a").unwrap().top_tier, SkillTier::Main);
        assert!(registry.members().is_empty());
    }

    #[test]
    fn failed_write_leaves_members_unchanged() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("sheets");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("members.csv");

        let mut registry = MemberRegistry::open(&path).unwrap();
        registry.add_and_save(Member::new("a", SkillTier::Main, false)).unwrap();
        registry.add_and_save(Member::new("b", SkillTier::Sub, true)).unwrap();
        let before = registry.members().to_vec();

        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            registry.add_and_save(Member::new("c", SkillTier::Noodle, false)),
            Err(RegistryError::Io(_)) | Err(RegistryError::Csv(_))
        ));
        assert_eq!(registry.members(), before.as_slice());

        assert!(registry.remove_and_save("a").is_err());
        assert_eq!(registry.members(), before.as_slice());
    }

    #[test]
    fn reads_kitchen_sheet_headers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sheet.csv");
        fs::write(
            &path,
            "이름,최고 역량,설거지 가능여부,역량 점수\n지수,발주,O,4\n민호,서브,X,1\n,,,\n",
        )
        .unwrap();

        let members = load_members(&path).unwrap();
        assert_eq!(
            members,
            vec![
                Member::new("지수", SkillTier::Ordering, true),
                Member::new("민호", SkillTier::Sub, false),
            ]
        );
    }

    #[test]
    fn unknown_tier_fails_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.csv");
        fs::write(&path, "name,top_tier,can_dishwash\nkim,chef,X\n").unwrap();
        assert!(matches!(load_members(&path), Err(RegistryError::UnknownTier(t)) if t == "chef"));
    }

    #[test]
    fn later_row_replaces_earlier() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dup.csv");
        fs::write(&path, "name,top_tier,can_dishwash\nkim,sub,X\nlee,main,O\nkim,main,O\n").unwrap();
        let members = load_members(&path).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0], Member::new("kim", SkillTier::Main, true));
    }
}
