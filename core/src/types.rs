//! Shared primitive types used across the workshop.

/// Stable identifier of an elf (e.g. `E010`).
pub type ElfId = String;

/// Stable identifier of a station (e.g. `S003`).
pub type StationId = String;

/// Stable identifier of an order in the queue.
pub type OrderId = String;

/// Identifier of a burnout alert (`alert-{elf_id}[-{n}]`).
pub type AlertId = String;

/// Identifier of a shift assignment (`shift-{elf_id}-{station_id}-{date}`).
pub type AssignmentId = String;

/// The canonical session identifier used by the audit store.
pub type SessionId = String;

/// Monotonic regeneration counter within one session.
pub type Generation = u64;
