//! Symbol table management for labels

use crate::assembler::Symbol;

/// Symbol table for managing label definitions
///
/// Labels are unique by first occurrence: a later declaration of the same name is
/// ignored and lookups always return the first one.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a new empty symbol table
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Add a symbol to the table
    ///
    /// Returns false (and keeps the existing entry) if the name was already declared.
    pub fn add_symbol(&mut self, name: String, line: usize) -> bool {
        if self.lookup_symbol(&name).is_some() {
            return false;
        }

        self.symbols.push(Symbol { name, line });
        true
    }

    /// Look up a symbol by name
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Line on which `name` is declared
    pub fn line_of(&self, name: &str) -> Option<usize> {
        self.lookup_symbol(name).map(|s| s.line)
    }

    /// Get all symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_table_add_lookup() {
        let mut table = SymbolTable::new();

        assert!(table.add_symbol("start".to_string(), 0));
        assert!(table.add_symbol("loop".to_string(), 5));

        let start = table.lookup_symbol("start").unwrap();
        assert_eq!(start.name, "start");
        assert_eq!(start.line, 0);

        assert_eq!(table.line_of("loop"), Some(5));
        assert!(table.lookup_symbol("undefined").is_none());
    }

    #[test]
    fn test_symbol_table_first_occurrence_wins() {
        let mut table = SymbolTable::new();

        assert!(table.add_symbol("start".to_string(), 1));
        assert!(!table.add_symbol("start".to_string(), 10));

        // Original symbol should still be there
        assert_eq!(table.line_of("start"), Some(1));
        assert_eq!(table.symbols().len(), 1);
    }
}
