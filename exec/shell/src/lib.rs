//! Persistent shell process for shellbook.
//!
//! [`ProcessDriver`] is the interface the execution queue talks to: run one
//! command line at a time, stream its output, forward input, interrupt it.
//! [`PtyShell`] implements it with a single interactive shell living in a
//! pseudo-terminal, so `cd`, exported variables and shell functions carry
//! over from one command to the next.
//!
//! ## Completion detection
//!
//! The shell's prompt hook (`PROMPT_COMMAND` for bash, `precmd` for zsh)
//! prints `\x1eSB<nonce>;<status>;<pwd>\x1e` after every command. The
//! reader thread strips these markers from the output stream and uses them
//! to settle the pending command with its exit status and working
//! directory. Shells without a hook get the marker appended to each
//! command line.

pub mod driver;
pub mod error;
pub mod marker;
pub mod pty;
pub mod shell_types;
pub mod utf8;

pub use driver::ChunkSender;
pub use driver::CommandOutcome;
pub use driver::ProcessDriver;
pub use error::DriverError;
pub use pty::PtyShell;
pub use pty::PtyShellOptions;
pub use shell_types::ShellType;
pub use shell_types::detect_shell_type;
