//! Execution queue for shell cells.
//!
//! Cells are submitted as text, normalized to one command line each and run
//! strictly one at a time against a shared [`ProcessDriver`]. Every
//! submission gets an [`ExecutionHandle`] for cancellation and completion,
//! plus an [`OutputStream`] carrying live `data` chunks, a `finished`
//! message and the ANSI-stripped transcript that replaces them.
//!
//! ```text
//! submit ──► queue (FIFO) ──► transform ──► driver.run_command
//!                                              │ chunks
//!                                              ▼
//!              OutputStream ◄── data … finished, transcript
//! ```
//!
//! [`ProcessDriver`]: shellbook_shell::ProcessDriver

pub mod error;
pub mod handle;
pub mod manager;
pub mod output;
pub mod request;
pub mod transcript;
pub mod transform;

pub use error::QueueError;
pub use error::TransformError;
pub use handle::ExecutionHandle;
pub use handle::ExecutionState;
pub use manager::QueueManager;
pub use manager::Submission;
pub use output::OutputStream;
pub use request::ExecutionRequest;
pub use request::normalize_cell_text;
pub use transcript::Transcript;
pub use transform::CommandTransform;
pub use transform::ExecutionContext;
pub use transform::IdentityTransform;
pub use transform::TemplateTransform;
