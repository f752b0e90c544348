//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from a specific
//! memory implementation, plus the line-addressed memory every loaded program uses.
//!
//! ## Design Principles
//!
//! - One word per source line: the address space size is the program's line count
//! - Addresses are line numbers, so they arrive as signed values computed from
//!   register arithmetic and are range-checked here
//! - A cell is undefined until written; reading it is an error, never zero
//! - Failed accesses leave memory untouched

use crate::ExecutionError;

/// Memory bus trait for the CPU to read and write words.
///
/// # Examples
///
/// ```
/// use lc2k::{ExecutionError, LineMemory, MemoryBus};
///
/// let mut mem = LineMemory::new(4);
///
/// mem.write(2, -7).unwrap();
/// assert_eq!(mem.read(2), Ok(-7));
///
/// // Never written
/// assert_eq!(mem.read(1), Err(ExecutionError::InvalidMemory { address: 1 }));
///
/// // Outside the program
/// assert!(mem.write(4, 1).is_err());
/// ```
pub trait MemoryBus {
    /// Number of addressable cells.
    fn size(&self) -> usize;

    /// Reads the word at `addr`.
    ///
    /// Fails with `InvalidMemory` when the address is outside `[0, size)` or the
    /// cell was never written.
    fn read(&self, addr: i64) -> Result<i32, ExecutionError>;

    /// Writes `value` at `addr`.
    ///
    /// Fails with `InvalidMemory` when the address is outside `[0, size)`.
    fn write(&mut self, addr: i64, value: i32) -> Result<(), ExecutionError>;

    /// Inspects a cell without range errors; `None` for undefined or absent cells.
    fn peek(&self, addr: usize) -> Option<i32>;
}

/// Line-addressed memory: one optional word per source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMemory {
    cells: Vec<Option<i32>>,
}

impl LineMemory {
    /// Creates `size` undefined cells.
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![None; size],
        }
    }

    /// Defined cells in `[start, start + len)`, in address order.
    ///
    /// # Examples
    ///
    /// ```
    /// use lc2k::{LineMemory, MemoryBus};
    ///
    /// let mut mem = LineMemory::new(8);
    /// mem.write(1, 10).unwrap();
    /// mem.write(6, 60).unwrap();
    ///
    /// assert_eq!(mem.defined_cells(0, 4), vec![(1, 10)]);
    /// assert_eq!(mem.defined_cells(0, 100), vec![(1, 10), (6, 60)]);
    /// ```
    pub fn defined_cells(&self, start: usize, len: usize) -> Vec<(usize, i32)> {
        self.cells
            .iter()
            .enumerate()
            .skip(start)
            .take(len)
            .filter_map(|(addr, cell)| cell.map(|value| (addr, value)))
            .collect()
    }

    fn index(&self, addr: i64) -> Result<usize, ExecutionError> {
        usize::try_from(addr)
            .ok()
            .filter(|&index| index < self.cells.len())
            .ok_or(ExecutionError::InvalidMemory { address: addr })
    }
}

impl From<Vec<Option<i32>>> for LineMemory {
    fn from(cells: Vec<Option<i32>>) -> Self {
        Self { cells }
    }
}

impl MemoryBus for LineMemory {
    fn size(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, addr: i64) -> Result<i32, ExecutionError> {
        let index = self.index(addr)?;
        self.cells[index].ok_or(ExecutionError::InvalidMemory { address: addr })
    }

    fn write(&mut self, addr: i64, value: i32) -> Result<(), ExecutionError> {
        let index = self.index(addr)?;
        self.cells[index] = Some(value);
        Ok(())
    }

    fn peek(&self, addr: usize) -> Option<i32> {
        self.cells.get(addr).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_memory_starts_undefined() {
        let mem = LineMemory::new(3);

        assert_eq!(mem.size(), 3);
        for addr in 0..3 {
            assert_eq!(mem.peek(addr), None);
            assert!(mem.read(addr as i64).is_err());
        }
    }

    #[test]
    fn test_line_memory_bounds() {
        let mut mem = LineMemory::new(2);

        assert_eq!(
            mem.write(-1, 5),
            Err(ExecutionError::InvalidMemory { address: -1 })
        );
        assert_eq!(
            mem.write(2, 5),
            Err(ExecutionError::InvalidMemory { address: 2 })
        );

        // Boundary addresses
        mem.write(0, i32::MIN).unwrap();
        mem.write(1, i32::MAX).unwrap();
        assert_eq!(mem.read(0), Ok(i32::MIN));
        assert_eq!(mem.read(1), Ok(i32::MAX));
        assert_eq!(mem.peek(2), None);
    }

    #[test]
    fn test_empty_memory() {
        let mem = LineMemory::new(0);
        assert_eq!(mem.read(0), Err(ExecutionError::InvalidMemory { address: 0 }));
        assert!(mem.defined_cells(0, 10).is_empty());
    }
}
