//! Which paths were reached through which descriptor
//!
//! Descriptor numbers are only unique within a process, so activity is keyed
//! by the `(process, descriptor)` pair. Two processes both using fd 5 always
//! produce two separate groups.

use crate::entry::{LogEntry, TimeOfDay};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Process-scoped descriptor identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DescriptorKey {
    pub process: String,
    pub file_descriptor: String,
}

/// One path observed through a descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathActivity {
    pub path: String,
    pub count: u64,
    pub first_seen: TimeOfDay,
    pub last_seen: TimeOfDay,
}

/// Paths per `(process, descriptor)`, each list sorted by descending count
pub type DescriptorActivity = BTreeMap<DescriptorKey, Vec<PathActivity>>;

/// Group entries carrying both a descriptor and a path by `(process, descriptor)`
///
/// Within a group, paths are ordered by descending count; ties keep the order
/// in which the paths were first encountered.
pub fn map_descriptor_paths<'a, I>(entries: I) -> DescriptorActivity
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut groups: BTreeMap<DescriptorKey, (HashMap<&'a str, usize>, Vec<PathActivity>)> =
        BTreeMap::new();

    for entry in entries {
        let (Some(fd), Some(path)) = (entry.file_descriptor.as_deref(), entry.path.as_deref())
        else {
            continue;
        };
        let key = DescriptorKey {
            process: entry.process.clone(),
            file_descriptor: fd.to_string(),
        };
        let (positions, activity) = groups.entry(key).or_default();
        match positions.get(path) {
            Some(&pos) => {
                let seen = &mut activity[pos];
                seen.count += 1;
                seen.first_seen = seen.first_seen.min(entry.timestamp);
                seen.last_seen = seen.last_seen.max(entry.timestamp);
            }
            None => {
                positions.insert(path, activity.len());
                activity.push(PathActivity {
                    path: path.to_string(),
                    count: 1,
                    first_seen: entry.timestamp,
                    last_seen: entry.timestamp,
                });
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, (_, mut activity))| {
            activity.sort_by(|a, b| b.count.cmp(&a.count));
            (key, activity)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(millis: u32, process: &str, fd: Option<&str>, path: Option<&str>) -> LogEntry {
        LogEntry {
            timestamp: TimeOfDay::from_millis(millis).unwrap(),
            operation: "read".to_string(),
            file_descriptor: fd.map(str::to_string),
            bytes: None,
            device: None,
            path: path.map(str::to_string),
            duration: 0.0,
            process: process.to_string(),
        }
    }

    fn key(process: &str, fd: &str) -> DescriptorKey {
        DescriptorKey {
            process: process.to_string(),
            file_descriptor: fd.to_string(),
        }
    }

    #[test]
    fn test_same_fd_different_process_not_merged() {
        let entries = vec![
            entry(0, "A", Some("5"), Some("/a")),
            entry(1, "B", Some("5"), Some("/b")),
        ];
        let map = map_descriptor_paths(&entries);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&key("A", "5")][0].path, "/a");
        assert_eq!(map[&key("B", "5")][0].path, "/b");
    }

    #[test]
    fn test_counts_and_seen_range() {
        let entries = vec![
            entry(300, "A", Some("3"), Some("/x")),
            entry(100, "A", Some("3"), Some("/x")),
            entry(200, "A", Some("3"), Some("/y")),
            entry(400, "A", Some("3"), Some("/x")),
        ];
        let map = map_descriptor_paths(&entries);
        let activity = &map[&key("A", "3")];
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].path, "/x");
        assert_eq!(activity[0].count, 3);
        assert_eq!(activity[0].first_seen.as_millis(), 100);
        assert_eq!(activity[0].last_seen.as_millis(), 400);
        assert_eq!(activity[1].path, "/y");
        assert_eq!(activity[1].count, 1);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let entries = vec![
            entry(0, "A", Some("3"), Some("/second-alpha")),
            entry(1, "A", Some("3"), Some("/first-beta")),
        ];
        let map = map_descriptor_paths(&entries);
        let paths: Vec<_> = map[&key("A", "3")].iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["/second-alpha", "/first-beta"]);
    }

    #[test]
    fn test_entries_without_fd_or_path_skipped() {
        let entries = vec![
            entry(0, "A", None, Some("/a")),
            entry(1, "A", Some("4"), None),
        ];
        assert!(map_descriptor_paths(&entries).is_empty());
    }
}
