//! CSV export of groups with members

use std::path::Path;

use crate::error::{Error, Result};
use crate::groups::GroupWithMembers;

pub const CSV_HEADER: [&str; 6] = [
    "group_id",
    "group_name",
    "member_name",
    "member_phone",
    "member_college",
    "member_interest",
];

/// Serialize a snapshot of groups-with-members: the header row plus one row
/// per membership.
pub fn groups_to_csv(groups: &[GroupWithMembers]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for entry in groups {
        for member in &entry.members {
            writer.write_record([
                entry.group.id.to_string(),
                entry.group.name.clone(),
                member.name.clone(),
                member.phone.clone(),
                member.college.clone().unwrap_or_default(),
                member.interest.to_string(),
            ])?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Io(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the CSV to a file, prefixed with a UTF-8 BOM so spreadsheet apps
/// pick up the Arabic text encoding.
pub fn write_csv_file(path: &Path, groups: &[GroupWithMembers]) -> Result<()> {
    let csv = groups_to_csv(groups)?;
    std::fs::write(path, format!("\u{feff}{csv}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Group, Interest, Registrant};
    use chrono::Utc;
    use uuid::Uuid;

    fn member(name: &str, phone: &str, group_id: Uuid) -> Registrant {
        Registrant {
            id: Uuid::new_v4(),
            name: name.into(),
            college: Some("كلية الهندسة".into()),
            phone: phone.into(),
            interest: Interest::Software,
            assigned: true,
            group_id: Some(group_id),
            is_dummy: false,
            created_at: Utc::now(),
        }
    }

    fn group(name: &str, member_names: &[(&str, &str)]) -> GroupWithMembers {
        let id = Uuid::new_v4();
        let members: Vec<Registrant> = member_names
            .iter()
            .map(|(name, phone)| member(name, phone, id))
            .collect();
        GroupWithMembers {
            group: Group {
                id,
                name: name.into(),
                members: members.iter().map(|m| m.id).collect(),
                member_count: members.len(),
                created_at: Utc::now(),
            },
            members,
        }
    }

    #[test]
    fn one_row_per_membership_plus_header() {
        let groups = vec![
            group("🎯 Tech Titans #1", &[("Sara", "01012345678"), ("Ali", "01112345678")]),
            group("🎯 Innovation Squad #2", &[("Omar", "01212345678")]),
        ];
        let csv = groups_to_csv(&groups).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADER.join(","));

        // Each data row pairs the member with its own group's id and name.
        let first_id = groups[0].group.id.to_string();
        let second_id = groups[1].group.id.to_string();
        assert!(lines[1].starts_with(&first_id) && lines[1].contains("Sara"));
        assert!(lines[2].starts_with(&first_id) && lines[2].contains("Ali"));
        assert!(lines[3].starts_with(&second_id) && lines[3].contains("Omar"));
    }

    #[test]
    fn empty_snapshot_is_header_only() {
        let csv = groups_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), CSV_HEADER.join(","));
    }

    #[test]
    fn file_export_carries_a_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teamup-export.csv");
        write_csv_file(&path, &[group("🎯 Dream Team #1", &[("Sara", "01012345678")])])
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with('\u{feff}'));
        assert!(contents.contains("Sara"));
    }
}
