//! Protocol types shared between the execution queue and its hosts.
//!
//! - [`CellId`] and [`ExecutionOrder`] identify a cell and one run of it
//! - [`OutputMessage`] is the streaming `data` / `finished` protocol
//! - [`CellOutput`] is the item type of a per-execution output stream

pub mod cell;
pub mod output;

pub use cell::CellId;
pub use cell::ExecutionOrder;
pub use output::CellOutput;
pub use output::DataMessage;
pub use output::FinishedMessage;
pub use output::OutputMessage;
