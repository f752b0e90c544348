//! Engine configuration
//!
//! Debug adapters usually receive these values as launch arguments, so the struct
//! deserializes from camelCase JSON with every field optional.

use serde::{Deserialize, Serialize};

/// Tunables for the debugger
///
/// # Examples
///
/// ```
/// use lc2k::EngineConfig;
///
/// let config = EngineConfig {
///     max_steps: Some(10_000),
///     ..Default::default()
/// };
/// assert_eq!(config.memory_window, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of cells, from address 0, reported by `Debugger::memory()`
    pub memory_window: usize,

    /// Words strictly longer than this are suggested as breakpoint columns
    pub breakpoint_column_min_len: usize,

    /// A breakpoint on a line starting with this moves to the next line
    pub continuation_marker: char,

    /// A breakpoint on a line starting with this moves to the previous line
    pub predecessor_marker: char,

    /// A breakpoint on a line containing this stays unverified until hit
    pub lazy_marker: String,

    /// Upper bound on lines executed by a single continue (None = unlimited)
    pub max_steps: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memory_window: 256,
            breakpoint_column_min_len: 8,
            continuation_marker: '+',
            predecessor_marker: '-',
            lazy_marker: "lazy".to_string(),
            max_steps: None,
        }
    }
}
