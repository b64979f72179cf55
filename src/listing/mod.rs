//! Parsing of detailed (`LIST` style) directory listings.
//!
//! Servers print `ls -l` like lines with no formal grammar:
//!
//! ```text
//! drwxr-xr-x   2 user group  4096 Jan  1 12:00 dirname
//! -rw-r--r--   1 user group  1234 Jan  1  2025 file with spaces.txt
//! lrwxrwxrwx   1 user group    42 Jan  1 12:00 link -> target
//! ./sub:
//! ```
//!
//! Lines are split on whitespace into nine columns, the ninth column and
//! everything after it being the name.

mod entry;

use std::collections::HashMap;

pub use entry::{Entry, EntryKinds, EntryType, RawTimestamp};

use crate::utils;

const COLUMNS: usize = 9;
const LINK_ARROW: &str = " ->";

/// Outcome of parsing a single raw listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Entry(Entry),
    /// A `path:` header announcing the directory of the following lines.
    Directory(String),
    /// Blank lines, `total N` summaries, `.` and `..`.
    Ignored,
}

/// Parses one line. The entry path is the bare name as printed;
/// [`RawListParser`] qualifies it with the listed directory.
#[must_use]
pub fn parse_line(raw: &str) -> ParsedLine {
    let line = raw.trim();
    let columns: Vec<&str> = line.split_whitespace().collect();

    if columns.len() < COLUMNS {
        return match line.strip_suffix(':') {
            Some(dir) if !dir.is_empty() => ParsedLine::Directory(dir.to_owned()),
            _ => ParsedLine::Ignored,
        };
    }

    let name = columns[COLUMNS - 1..].join(" ");
    if name == "." || name == ".." {
        return ParsedLine::Ignored;
    }

    let permissions = columns[0];
    let kind = EntryType::classify(permissions);

    let (name, link_target) = match kind {
        EntryType::Link => match name.split_once(LINK_ARROW) {
            Some((own, target)) => {
                let target = target.trim_start();
                (
                    own.trim_end().to_owned(),
                    (!target.is_empty()).then(|| target.to_owned()),
                )
            }
            None => (name, None),
        },
        _ => (name, None),
    };

    ParsedLine::Entry(Entry {
        path: name,
        kind,
        permissions: permissions.to_owned(),
        links: columns[1].to_owned(),
        owner: columns[2].to_owned(),
        group: columns[3].to_owned(),
        size: columns[4].parse().ok(),
        timestamp: RawTimestamp {
            month: columns[5].to_owned(),
            day: columns[6].to_owned(),
            time: columns[7].to_owned(),
        },
        link_target,
    })
}

/// Entries keyed by [`Entry::key`].
///
/// Keeps first-seen order. When two lines produce the same key the later
/// one replaces the earlier in place.
#[derive(Debug, Clone, Default)]
pub struct EntryMap {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl EntryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry that was replaced, if any.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        match self.index.get(&entry.key()) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            None => {
                let _ = self.index.insert(entry.key(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = Entry>>(&mut self, entries: I) {
        for entry in entries {
            let _ = self.insert(entry);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl IntoIterator for EntryMap {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parses the lines of one listing of `directory`.
///
/// Entry paths are `directory/name`, or `header/name` after a `header:`
/// line. Relative headers are resolved against `directory`.
#[derive(Debug, Clone)]
pub struct RawListParser {
    directory: String,
    prefix: String,
}

impl RawListParser {
    pub fn new<P: Into<String>>(directory: P) -> Self {
        let directory = utils::normalize(&directory.into());
        Self {
            prefix: directory.clone(),
            directory,
        }
    }

    /// Feeds one line, returning the qualified entry if the line has one.
    pub fn feed(&mut self, raw: &str) -> Option<Entry> {
        match parse_line(raw) {
            ParsedLine::Entry(mut entry) => {
                entry.path = utils::join(&self.prefix, &entry.path);
                Some(entry)
            }
            ParsedLine::Directory(header) => {
                trace!("listing header {header}");
                self.prefix = utils::join(&self.directory, &header);
                None
            }
            ParsedLine::Ignored => None,
        }
    }

    pub fn parse<I, S>(mut self, lines: I) -> EntryMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = EntryMap::new();
        for line in lines {
            if let Some(entry) = self.feed(line.as_ref()) {
                if let Some(old) = map.insert(entry) {
                    debug!("duplicate listing entry {}", old.key());
                }
            }
        }
        map
    }
}
