//! elfshift-core: shift scheduling and burnout-risk rotation for a
//! holiday workshop.
//!
//! Pure scheduling logic (`risk`, `scheduler`, `rotation`) never touches
//! I/O. `workshop` owns the state, `store` the audit trail, `shared` the
//! locking, and `notify` the outbound channel.

pub mod alert;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod name_generator;
pub mod notify;
pub mod rng;
pub mod risk;
pub mod roster;
pub mod rotation;
pub mod scheduler;
pub mod shared;
pub mod snapshot;
pub mod store;
pub mod synthetic;
pub mod types;
pub mod workshop;

pub use command::{CommandResponse, WorkshopCommand};
pub use error::{ShiftError, ShiftResult};
pub use shared::SharedWorkshop;
pub use workshop::Workshop;
