use std::collections::HashMap;

use serde::Serialize;

use crate::models::FileRecord;

/// Characters that end the grouping prefix of a filename.
const DELIMITERS: [char; 5] = [' ', '_', '-', ':', '.'];

/// Files bucketed by filename prefix.
///
/// Groups keep the order in which their keys were first seen, and files keep
/// their input order within a group. Prefixes shared by only one file are not
/// kept as groups; those files end up in `ungrouped`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileGroups<T> {
    pub groups: Vec<FileGroup<T>>,
    pub ungrouped: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileGroup<T> {
    pub key: String,
    pub files: Vec<T>,
}

impl<T> FileGroups<T> {
    /// Files for a key. `None` is the ungrouped bucket, which always exists.
    pub fn get(&self, key: Option<&str>) -> Option<&[T]> {
        match key {
            None => Some(&self.ungrouped),
            Some(key) => self
                .groups
                .iter()
                .find(|g| g.key == key)
                .map(|g| g.files.as_slice()),
        }
    }

    /// Keyed groups in encounter order, then the ungrouped bucket.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &[T])> {
        self.groups
            .iter()
            .map(|g| (Some(g.key.as_str()), g.files.as_slice()))
            .chain(std::iter::once((None, self.ungrouped.as_slice())))
    }

    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum::<usize>() + self.ungrouped.len()
    }
}

/// The grouping prefix of a filename: everything before the first delimiter.
pub fn group_key(filename: &str) -> &str {
    filename.split(DELIMITERS).next().unwrap_or(filename)
}

/// Group files by [`group_key`], collapsing singleton groups into `ungrouped`.
pub fn group<T: FileRecord>(files: impl IntoIterator<Item = T>) -> FileGroups<T> {
    let mut buckets: Vec<FileGroup<T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in files {
        let key = group_key(file.filename()).to_string();
        match index.get(&key) {
            Some(&i) => buckets[i].files.push(file),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(FileGroup {
                    key,
                    files: vec![file],
                });
            }
        }
    }

    let mut groups = Vec::with_capacity(buckets.len());
    let mut ungrouped = Vec::new();
    for bucket in buckets {
        if bucket.files.len() == 1 {
            ungrouped.extend(bucket.files);
        } else {
            groups.push(bucket);
        }
    }

    FileGroups { groups, ungrouped }
}
