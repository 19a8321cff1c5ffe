//! Tape VM
//!
//! A virtual machine for the eight-operator tape language `> < + - . , [ ]`.
//! The single-step interpreter skips any other character; the compiler
//! rejects them.
//!
//! # Architecture
//!
//! - **Tape**: fixed-size cell array with a data pointer, governed by a
//!   pointer policy (clamp, wrap, error) and a cell policy (wrap, unlimited,
//!   error)
//! - **Compiler**: validates program text and emits instructions with merged
//!   runs and resolved jump targets
//! - **Engines**: a single-step interpreter over the raw text, a bulk runner
//!   over compiled instructions, and a chunked runner that can be interrupted
//!   and resumed
//! - **I/O**: a preloaded input queue backed by an optional pull callback, and
//!   an append-only output log
//!
//! # Example Usage
//!
//! ```ignore
//! use tapevm::{Machine, DEFAULT_MAX_STEPS};
//!
//! let mut machine = Machine::new(30000).unwrap();
//! machine.load(",[.,]", "echo");
//! machine.run_fast(DEFAULT_MAX_STEPS).unwrap();
//! assert_eq!(machine.output_text(), "echo");
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod executor;
pub mod io;
pub mod machine;
pub mod opcodes;
pub mod program;
pub mod pseudocode;
pub mod stepper;
pub mod tape;

// Parser
pub mod parser;

// Language-specific bindings
#[cfg(feature = "python")]
pub mod python_bindings;
#[cfg(feature = "python")]
pub mod python_input;

// Re-export main types for convenience
pub use config::{ConfigError, VmConfig};
pub use error::{VmError, VmResult};
pub use executor::{Cursor, Executor};
pub use io::{InputSource, Io};
pub use machine::Machine;
pub use opcodes::{Instruction, Op};
pub use program::{CompileStats, CompiledProgram};
pub use tape::{CellPolicy, PointerPolicy, Tape};

/// Cells allocated when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 30_000;

/// Step budget for bulk and chunked runs
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Instructions per chunked-runner call
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;
