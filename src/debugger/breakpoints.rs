//! Breakpoint tables
//!
//! Three kinds of breakpoints are tracked independently:
//!
//! - **Source** breakpoints, per source path, keyed by line. They carry an id and a
//!   verified flag, and may be moved once when verified (see [`Breakpoint::verify`]).
//! - **Instruction** breakpoints: raw instruction-unit addresses.
//! - **Data** breakpoints: a register or label watched for reads and/or writes.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cpu::{Access, AccessKind, Location};
use crate::EngineConfig;

// ========== Source breakpoints ==========

/// A source breakpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Unique per debugger, starting at 1
    pub id: u32,

    /// Target line (0-indexed); may change once during verification
    pub line: usize,

    /// True once the breakpoint is known to sit on an executable line
    pub verified: bool,

    /// Set after the line adjustment pass has run
    #[serde(skip)]
    adjusted: bool,
}

impl Breakpoint {
    pub fn new(id: u32, line: usize) -> Self {
        Self {
            id,
            line,
            verified: false,
            adjusted: false,
        }
    }

    /// Verify the breakpoint against the program lines
    ///
    /// Only lines inside the program are inspected, by their trimmed text:
    ///
    /// - an empty line, or one starting with the continuation marker, moves the
    ///   breakpoint to the next line
    /// - a line starting with the predecessor marker moves it to the previous line
    /// - unless the line contains the lazy marker, the breakpoint becomes verified
    ///
    /// The move happens at most once per breakpoint. Returns true if the breakpoint
    /// became verified by this call.
    ///
    /// ```
    /// use lc2k::{Breakpoint, EngineConfig};
    ///
    /// let lines = vec!["\tnoop".to_string(), "".to_string(), "\thalt".to_string()];
    /// let mut bp = Breakpoint::new(1, 1);
    ///
    /// assert!(bp.verify(&lines, &EngineConfig::default()));
    /// assert_eq!(bp.line, 2);
    ///
    /// // Already verified: nothing moves
    /// assert!(!bp.verify(&lines, &EngineConfig::default()));
    /// assert_eq!(bp.line, 2);
    /// ```
    pub fn verify(&mut self, lines: &[String], config: &EngineConfig) -> bool {
        if self.verified {
            return false;
        }
        let Some(text) = lines.get(self.line).map(|line| line.trim()) else {
            return false;
        };

        // An empty marker disables lazy breakpoints
        let lazy = !config.lazy_marker.is_empty() && text.contains(config.lazy_marker.as_str());

        if !self.adjusted {
            if text.is_empty() || text.starts_with(config.continuation_marker) {
                self.line += 1;
            } else if text.starts_with(config.predecessor_marker) {
                self.line = self.line.saturating_sub(1);
            }
            self.adjusted = true;
        }

        if lazy {
            return false;
        }
        self.verified = true;
        true
    }

    /// Mark the breakpoint verified; returns true if it was not already
    pub fn mark_verified(&mut self) -> bool {
        !std::mem::replace(&mut self.verified, true)
    }
}

/// Source breakpoints for every path, plus the id counter
#[derive(Debug)]
pub struct SourceBreakpoints {
    by_path: HashMap<String, Vec<Breakpoint>>,
    next_id: u32,
}

impl Default for SourceBreakpoints {
    fn default() -> Self {
        Self {
            by_path: HashMap::new(),
            next_id: 1,
        }
    }
}

impl SourceBreakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unverified breakpoint and return a handle to it
    pub fn set(&mut self, path: &str, line: usize) -> &mut Breakpoint {
        let id = self.next_id;
        self.next_id += 1;

        let list = self.by_path.entry(path.to_string()).or_default();
        list.push(Breakpoint::new(id, line));
        let index = list.len() - 1;
        &mut list[index]
    }

    /// Remove the first breakpoint currently on `line`
    pub fn clear(&mut self, path: &str, line: usize) -> Option<Breakpoint> {
        let list = self.by_path.get_mut(path)?;
        let index = list.iter().position(|bp| bp.line == line)?;
        Some(list.remove(index))
    }

    /// Remove every breakpoint of `path`
    pub fn clear_all(&mut self, path: &str) {
        self.by_path.remove(path);
    }

    /// Breakpoints of `path`, in creation order
    pub fn for_path(&self, path: &str) -> &[Breakpoint] {
        self.by_path.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable breakpoints of `path`
    pub fn for_path_mut(&mut self, path: &str) -> &mut [Breakpoint] {
        self.by_path
            .get_mut(path)
            .map(Vec::as_mut_slice)
            .unwrap_or(&mut [])
    }

    /// First breakpoint of `path` on `line`
    pub fn at_line_mut(&mut self, path: &str, line: usize) -> Option<&mut Breakpoint> {
        self.by_path
            .get_mut(path)?
            .iter_mut()
            .find(|bp| bp.line == line)
    }
}

// ========== Instruction breakpoints ==========

/// Instruction-unit addresses to stop at
#[derive(Debug, Default)]
pub struct InstructionBreakpoints {
    addresses: BTreeSet<usize>,
}

impl InstructionBreakpoints {
    /// Add an address; any address is accepted
    pub fn set(&mut self, address: usize) -> bool {
        self.addresses.insert(address);
        true
    }

    pub fn contains(&self, address: usize) -> bool {
        self.addresses.contains(&address)
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
    }
}

// ========== Data breakpoints ==========

/// Which accesses a data breakpoint reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessType {
    Read,
    Write,
    ReadWrite,
}

impl AccessType {
    /// Combine two modes; differing modes promote to read-write
    pub fn merge(self, other: AccessType) -> AccessType {
        if self == other {
            self
        } else {
            AccessType::ReadWrite
        }
    }

    /// True if an access of `kind` triggers this mode
    pub fn matches(self, kind: AccessKind) -> bool {
        matches!(
            (self, kind),
            (AccessType::ReadWrite, _)
                | (AccessType::Read, AccessKind::Read)
                | (AccessType::Write, AccessKind::Write)
        )
    }
}

impl From<AccessKind> for AccessType {
    fn from(kind: AccessKind) -> Self {
        match kind {
            AccessKind::Read => AccessType::Read,
            AccessKind::Write => AccessType::Write,
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AccessType::Read => "read",
            AccessType::Write => "write",
            AccessType::ReadWrite => "readWrite",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(AccessType::Read),
            "write" => Ok(AccessType::Write),
            "readWrite" => Ok(AccessType::ReadWrite),
            other => Err(format!("unknown access type: {}", other)),
        }
    }
}

/// A watched register or memory cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataWatch {
    /// Identifier as given (`r3`, or a label)
    pub name: String,

    /// What the identifier resolved to
    pub location: Location,

    pub access: AccessType,
}

/// Data breakpoint table, in insertion order
#[derive(Debug, Default)]
pub struct DataBreakpoints {
    watches: Vec<DataWatch>,
}

impl DataBreakpoints {
    /// Watch `location` under `name`; re-setting a name merges the modes
    pub fn set(&mut self, name: &str, location: Location, access: AccessType) {
        match self.watches.iter_mut().find(|watch| watch.name == name) {
            Some(watch) => {
                watch.location = location;
                watch.access = watch.access.merge(access);
            }
            None => self.watches.push(DataWatch {
                name: name.to_string(),
                location,
                access,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.watches.clear();
    }

    pub fn watches(&self) -> &[DataWatch] {
        &self.watches
    }

    /// Resolve every watch again; watches whose name no longer resolves are
    /// removed and their names returned
    pub fn relocate(&mut self, mut resolve: impl FnMut(&str) -> Option<Location>) -> Vec<String> {
        let mut dropped = Vec::new();
        self.watches.retain_mut(|watch| match resolve(&watch.name) {
            Some(location) => {
                watch.location = location;
                true
            }
            None => {
                dropped.push(watch.name.clone());
                false
            }
        });
        dropped
    }

    /// Find the watch triggered by a line's accesses
    ///
    /// Writes are checked before reads, so a line that both reads and writes a
    /// watched location reports the write.
    pub fn check(&self, accesses: &[Access]) -> Option<(String, AccessType)> {
        [AccessKind::Write, AccessKind::Read]
            .into_iter()
            .find_map(|kind| {
                accesses
                    .iter()
                    .filter(|access| access.kind == kind)
                    .find_map(|access| {
                        self.watches.iter().find(|watch| {
                            watch.location == access.location && watch.access.matches(kind)
                        })
                    })
                    .map(|watch| (watch.name.clone(), AccessType::from(kind)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut table = SourceBreakpoints::new();
        assert_eq!(table.set("a.as", 3).id, 1);
        assert_eq!(table.set("b.as", 3).id, 2);
        assert_eq!(table.set("a.as", 5).id, 3);
        assert_eq!(table.for_path("a.as").len(), 2);
    }

    #[test]
    fn test_clear_first_on_line() {
        let mut table = SourceBreakpoints::new();
        table.set("a.as", 2);
        table.set("a.as", 2);

        let removed = table.clear("a.as", 2).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(table.for_path("a.as").len(), 1);
        assert!(table.clear("a.as", 9).is_none());
        assert!(table.clear("missing.as", 2).is_none());

        table.clear_all("a.as");
        assert!(table.for_path("a.as").is_empty());
    }

    #[test]
    fn test_verify_predecessor_marker() {
        let program = lines(&["\tnoop", "-\tnoop"]);
        let mut bp = Breakpoint::new(1, 1);
        assert!(bp.verify(&program, &EngineConfig::default()));
        assert_eq!(bp.line, 0);
    }

    #[test]
    fn test_verify_continuation_marker() {
        let program = lines(&["  + continued", "\thalt"]);
        let mut bp = Breakpoint::new(1, 0);
        assert!(bp.verify(&program, &EngineConfig::default()));
        assert_eq!(bp.line, 1);
    }

    #[test]
    fn test_lazy_breakpoint_stays_unverified() {
        let program = lines(&["\tnoop", "- lazy", "\thalt"]);
        let config = EngineConfig::default();
        let mut bp = Breakpoint::new(1, 0);
        let mut lazy = Breakpoint::new(2, 1);

        assert!(bp.verify(&program, &config));
        assert!(!lazy.verify(&program, &config));
        assert_eq!(lazy.line, 0);
        assert!(!lazy.verified);

        assert!(lazy.mark_verified());
        assert!(!lazy.mark_verified());
    }

    #[test]
    fn test_empty_lazy_marker_disables_lazy_breakpoints() {
        let program = lines(&["\tnoop", "\thalt"]);
        let config = EngineConfig {
            lazy_marker: String::new(),
            ..EngineConfig::default()
        };
        let mut bp = Breakpoint::new(1, 1);

        assert!(bp.verify(&program, &config));
        assert!(bp.verified);
    }

    #[test]
    fn test_adjustment_happens_once() {
        let program = lines(&["\tnoop", "lazy", "+ continued", "\thalt"]);
        let config = EngineConfig::default();
        let mut bp = Breakpoint::new(1, 2);

        assert!(bp.verify(&program, &config));
        assert_eq!(bp.line, 3);

        // Re-running verification on a lazy line never moves it twice
        let program = lines(&["+ lazy", "+ lazy again", "\thalt"]);
        let mut lazy = Breakpoint::new(2, 0);
        assert!(!lazy.verify(&program, &config));
        assert_eq!(lazy.line, 1);
        assert!(!lazy.verify(&program, &config));
        assert_eq!(lazy.line, 1);
    }

    #[test]
    fn test_verify_out_of_range_stays_unverified() {
        let program = lines(&["\thalt"]);
        let mut bp = Breakpoint::new(1, 4);
        assert!(!bp.verify(&program, &EngineConfig::default()));
        assert_eq!(bp.line, 4);
    }

    #[test]
    fn test_access_type_merge() {
        assert_eq!(AccessType::Read.merge(AccessType::Read), AccessType::Read);
        assert_eq!(AccessType::Read.merge(AccessType::Write), AccessType::ReadWrite);
        assert_eq!("readWrite".parse::<AccessType>(), Ok(AccessType::ReadWrite));
        assert!("execute".parse::<AccessType>().is_err());
    }

    #[test]
    fn test_data_check_prefers_writes() {
        let mut table = DataBreakpoints::default();
        table.set("r1", Location::Register(1), AccessType::Read);
        table.set("r1", Location::Register(1), AccessType::Write);
        table.set("r2", Location::Register(2), AccessType::Read);

        let accesses = [
            Access {
                location: Location::Register(2),
                kind: AccessKind::Read,
            },
            Access {
                location: Location::Register(1),
                kind: AccessKind::Write,
            },
        ];

        assert_eq!(
            table.check(&accesses),
            Some(("r1".to_string(), AccessType::Write))
        );
        assert_eq!(table.watches().len(), 2);
    }

    #[test]
    fn test_data_check_respects_mode() {
        let mut table = DataBreakpoints::default();
        table.set("ten", Location::Memory(7), AccessType::Write);

        let read = [Access {
            location: Location::Memory(7),
            kind: AccessKind::Read,
        }];
        assert_eq!(table.check(&read), None);

        table.clear();
        assert!(table.watches().is_empty());
    }

    #[test]
    fn test_relocate_moves_and_drops_watches() {
        let mut table = DataBreakpoints::default();
        table.set("r1", Location::Register(1), AccessType::Read);
        table.set("ten", Location::Memory(3), AccessType::Write);
        table.set("gone", Location::Memory(4), AccessType::Write);

        let dropped = table.relocate(|name| match name {
            "r1" => Some(Location::Register(1)),
            "ten" => Some(Location::Memory(1)),
            _ => None,
        });

        assert_eq!(dropped, vec!["gone".to_string()]);
        assert_eq!(table.watches().len(), 2);
        assert_eq!(table.watches()[1].location, Location::Memory(1));
        assert_eq!(table.watches()[1].access, AccessType::Write);
    }
}
