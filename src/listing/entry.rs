use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a remote object, taken from the first permission character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Link,
    Unknown,
}

impl EntryType {
    /// Classifies a permission string such as `drwx---r-x`.
    /// Only the first character is used; any input maps to a type.
    #[must_use]
    pub fn classify(permissions: &str) -> Self {
        match permissions.chars().next() {
            Some('-') => Self::File,
            Some('d') => Self::Directory,
            Some('l') => Self::Link,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Link => "link",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of entry types, used to filter counts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryKinds: u8 {
        const FILE = 0b0001;
        const DIRECTORY = 0b0010;
        const LINK = 0b0100;
        const UNKNOWN = 0b1000;
    }
}

impl EntryKinds {
    #[must_use]
    pub fn matches(self, kind: EntryType) -> bool {
        self.contains(kind.into())
    }
}

impl From<EntryType> for EntryKinds {
    fn from(kind: EntryType) -> Self {
        match kind {
            EntryType::File => Self::FILE,
            EntryType::Directory => Self::DIRECTORY,
            EntryType::Link => Self::LINK,
            EntryType::Unknown => Self::UNKNOWN,
        }
    }
}

/// Timestamp fields exactly as the server printed them.
///
/// Servers disagree on the format, so nothing is canonicalized here;
/// see [`RawTimestamp::resolve`] for a best-effort conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimestamp {
    pub month: String,
    pub day: String,
    /// Either `HH:MM` (recent files) or a four digit year.
    pub time: String,
}

impl RawTimestamp {
    /// Best-effort conversion. `Jan 1 12:00` is placed in `year`,
    /// `Jan 1 2021` resolves to midnight of that day.
    #[must_use]
    pub fn resolve(&self, year: i32) -> Option<NaiveDateTime> {
        if self.time.contains(':') {
            let text = format!("{year} {} {} {}", self.month, self.day, self.time);
            return NaiveDateTime::parse_from_str(&text, "%Y %b %d %H:%M").ok();
        }

        let text = format!("{} {} {}", self.month, self.day, self.time);
        NaiveDate::parse_from_str(&text, "%b %d %Y")
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    }
}

/// One object reported by a detailed listing.
///
/// Entries are snapshots produced fresh by each listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Normalized path, qualified with the listed directory when known.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub permissions: String,
    /// Hard link count column, passed through verbatim.
    pub links: String,
    pub owner: String,
    pub group: String,
    /// Reported size, `None` when the column is not a number.
    pub size: Option<u64>,
    pub timestamp: RawTimestamp,
    /// Present only for links.
    pub link_target: Option<String>,
}

impl Entry {
    /// Map key combining type and path, so that a link and a file sharing
    /// a display name stay distinct.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}#{}", self.kind, self.path)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        crate::utils::basename(&self.path)
    }

    /// Returns the reported size, `0` when it could not be read.
    #[must_use]
    pub fn reported_size(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Directory
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryType::File
    }

    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryType::Link
    }
}
