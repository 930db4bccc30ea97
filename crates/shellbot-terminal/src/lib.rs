//! Shell-side plumbing: the PTY running the shell, plus the text
//! processing applied to everything it prints.

pub mod decoder;
pub mod escape;
pub mod pty;

pub use decoder::IncrementalDecoder;
pub use escape::strip_escape_codes;
pub use pty::{spawn_shell, OutputEvent, PtyError, ShellInput, ShellOutput, ShellProcess};
