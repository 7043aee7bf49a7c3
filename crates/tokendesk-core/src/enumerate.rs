// Module enumeration
//
// Probes the remote registry slot-by-slot per module type. The remote list
// is append-only and carries no length; the scan ends at the zero-address
// sentinel, at the first failed query, or at the session's slot cap. All
// three endings produce the same observable outcome: a finite list of the
// records gathered so far. Only the trace output tells them apart.

use tracing::debug;

use tokendesk_ledger::{LedgerClient, ModuleHandle};
use tokendesk_types::ModuleType;

use crate::registry::{ModuleRecord, ModuleRegistry};
use crate::session::Session;

/// Probe one module type. Infallible by design: a truncated scan and an
/// exhausted scan are equally actionable for the console.
pub async fn enumerate(
    client: &dyn LedgerClient,
    session: &Session,
    module_type: ModuleType,
) -> Vec<ModuleRecord> {
    let token = session.token.address;
    let mut records = Vec::new();
    let mut index = 0u64;
    while index < session.max_slots {
        let slot = match client.module_slot(token, module_type, index).await {
            Ok(slot) => slot,
            Err(err) => {
                debug!(%module_type, index, %err, "module scan ended by query failure");
                return records;
            }
        };
        if slot.is_sentinel() {
            return records;
        }
        let name = slot.raw_name.decode_utf8();
        let handle = ModuleHandle::bind(module_type, slot.address);
        let paused = if module_type.is_pausable() {
            match client.module_paused(&handle).await {
                Ok(paused) => paused,
                Err(err) => {
                    debug!(%module_type, index, %err, "module scan ended by pause query failure");
                    return records;
                }
            }
        } else {
            false
        };
        records.push(ModuleRecord {
            name,
            module_type,
            address: slot.address,
            locked: slot.locked,
            paused,
            handle,
        });
        index += 1;
    }
    debug!(%module_type, cap = session.max_slots, "module scan ended by slot cap");
    records
}

/// Rebuild the full registry: one scan per module type, in canonical order
pub async fn enumerate_all(client: &dyn LedgerClient, session: &Session) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for module_type in ModuleType::ALL {
        let records = enumerate(client, session, module_type).await;
        registry.insert(module_type, records);
    }
    registry
}
