use chrono::{DateTime, Utc};
use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Converts a unix timestamp reported by the server, `-1` or any other
/// negative value meaning "unknown".
pub fn unix(secs: i64) -> Option<DateTime<Utc>> {
    if secs < 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// Collapses repeated separators, drops `.` segments, resolves `..` against
/// the preceding segment and strips the trailing separator.
/// A `..` that climbs above the start of a relative path is kept.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_owned(),
        (false, false) => joined,
    }
}

/// Joins `name` under `dir` and normalizes the result.
pub fn join(dir: &str, name: &str) -> String {
    if name.starts_with('/') {
        return normalize(name);
    }
    normalize(&format!("{dir}/{name}"))
}

/// Last segment of a path, as servers may report children either bare or
/// qualified with the listed directory.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
