// Module registry
//
// Classification of enumerated module records by type. Rebuilt wholesale on
// every enumeration pass and never patched in place, so it cannot drift
// from remote state older than the last pass. Slot order inside a type is
// preserved because removal addresses modules by slot index.

use std::collections::HashMap;

use serde::Serialize;

use tokendesk_ledger::ModuleHandle;
use tokendesk_types::{Address, ModuleType};

/// One attached module instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRecord {
    /// Decoded module name
    pub name: String,
    /// Classification of the module
    pub module_type: ModuleType,
    /// Module contract address; never the zero sentinel inside a registry
    pub address: Address,
    /// Whether the remote registry has locked the module
    pub locked: bool,
    /// Pause flag; always false for non-pausable types
    pub paused: bool,
    /// Capability for further calls against this instance
    pub handle: ModuleHandle,
}

/// A flattened-listing position resolved back to its concrete record
#[derive(Debug, Clone, Copy)]
pub struct FlatEntry<'a> {
    /// Type of the resolved module
    pub module_type: ModuleType,
    /// Slot index of the module within its type
    pub slot: u64,
    /// The record itself
    pub record: &'a ModuleRecord,
}

/// Modules attached to the active token, grouped by type
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<ModuleType, Vec<ModuleRecord>>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the records of one type. Called once per type by the
    /// enumerator while rebuilding.
    pub fn insert(&mut self, module_type: ModuleType, records: Vec<ModuleRecord>) {
        self.modules.insert(module_type, records);
    }

    /// Number of attached modules of one type
    pub fn count_of(&self, module_type: ModuleType) -> usize {
        self.modules.get(&module_type).map_or(0, Vec::len)
    }

    /// Records of one type, in slot order
    pub fn of_type(&self, module_type: ModuleType) -> &[ModuleRecord] {
        self.modules.get(&module_type).map_or(&[], Vec::as_slice)
    }

    /// Record at a specific slot of a specific type
    pub fn at(&self, module_type: ModuleType, slot: u64) -> Option<&ModuleRecord> {
        self.of_type(module_type).get(slot as usize)
    }

    /// Total number of attached modules across all types
    pub fn total(&self) -> usize {
        ModuleType::ALL.iter().map(|ty| self.count_of(*ty)).sum()
    }

    /// All records as one listing: Permission, Transfer, Offering,
    /// Checkpoint, each in slot order. The shell presents this listing and
    /// selections against it resolve through [`ModuleRegistry::resolve`].
    pub fn flattened(&self) -> Vec<&ModuleRecord> {
        ModuleType::ALL
            .iter()
            .flat_map(|ty| self.of_type(*ty).iter())
            .collect()
    }

    /// Map a flattened-listing position back to `(type, slot, record)`.
    /// Stable within one enumeration pass by the fixed flattening order.
    pub fn resolve(&self, position: usize) -> Option<FlatEntry<'_>> {
        let mut remaining = position;
        for ty in ModuleType::ALL {
            let records = self.of_type(ty);
            if remaining < records.len() {
                return Some(FlatEntry {
                    module_type: ty,
                    slot: remaining as u64,
                    record: &records[remaining],
                });
            }
            remaining -= records.len();
        }
        None
    }
}
