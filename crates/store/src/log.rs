//! The append-only, line-oriented log file backing a store node.
//!
//! Each record is `"<key>:<value>\n"`, where `<value>` is either a decimal
//! counter value or the tombstone sentinel [`TOMBSTONE`]. Parsing splits on
//! the first `:` only, so values themselves may contain `:` (keys may not —
//! that constraint is enforced by the caller, not here). Blank lines are
//! ignored. The log is the sole source of truth for crash recovery: there is
//! exactly one durability mode, unlike a general-purpose WAL that might offer
//! strict/batched/async tiers, because every caller here needs the record on
//! disk before the response goes out.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Tombstone value marking a key as deleted.
pub const TOMBSTONE: &str = "__deleted__";

/// Replay `path` from the beginning, applying each record in order, and
/// return the resulting key→value map. A missing file replays as empty.
pub fn replay(path: &Path) -> std::io::Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(map),
        Err(e) => return Err(e),
    };

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if value == TOMBSTONE {
            map.remove(key);
        } else {
            map.insert(key.to_string(), value.to_string());
        }
    }
    Ok(map)
}

/// Open `path` for appending, creating it if it does not exist. The file is
/// never truncated: [`replay`] must see every record written in a prior run.
pub fn open_for_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Append a single record and flush it to disk before returning. Must be
/// called from inside the same critical section as the in-memory mutation
/// it records, so replay and the live map never diverge.
pub fn append_record(file: &mut File, key: &str, value: &str) -> std::io::Result<()> {
    writeln!(file, "{key}:{value}")?;
    file.sync_data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replay_of_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.log");
        let map = replay(&path).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn replay_applies_records_in_order_last_write_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "a:1\nb:2\na:__deleted__\na:7\n").unwrap();

        let map = replay(&path).unwrap();
        assert_eq!(map.get("a"), Some(&"7".to_string()));
        assert_eq!(map.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn replay_ignores_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "a:1\n\nb:2\n\n").unwrap();

        let map = replay(&path).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn value_may_contain_colons() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "a:12:34\n").unwrap();

        let map = replay(&path).unwrap();
        assert_eq!(map.get("a"), Some(&"12:34".to_string()));
    }

    #[test]
    fn append_then_replay_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let mut file = open_for_append(&path).unwrap();
        append_record(&mut file, "k", "1").unwrap();
        append_record(&mut file, "k", "2").unwrap();
        append_record(&mut file, "k", TOMBSTONE).unwrap();
        drop(file);

        let map = replay(&path).unwrap();
        assert!(map.get("k").is_none());
    }
}
