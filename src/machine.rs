//! The VM instance
//!
//! A [`Machine`] exclusively owns its tape, program text, compiled program,
//! input queue and output log. Hosts drive it with one of three engines:
//!
//! - [`Machine::step`] / [`Machine::run_until_end`]: raw text, one character
//!   per step, for debugging
//! - [`Machine::run_fast`]: compiled program, to completion or a step budget
//! - [`Machine::run_chunk`]: compiled program in bounded slices, resumable
//!
//! All access is single-threaded; callers serialize use of an instance.

use tracing::{debug, trace, warn};

use crate::config::VmConfig;
use crate::error::VmResult;
use crate::executor::{Cursor, Executor};
use crate::io::{InputSource, Io};
use crate::parser::{self, CompileError, SyntaxViolation};
use crate::program::{CompileStats, CompiledProgram};
use crate::pseudocode;
use crate::stepper::Stepper;
use crate::tape::{CellPolicy, PointerPolicy, Tape};

pub struct Machine {
    /// Memory cells and data pointer
    tape: Tape,

    /// Program text as loaded
    source: String,

    /// Program text indexed by character, for the single-step interpreter
    text: Vec<char>,

    /// Lazily built by the fast engines, dropped on reset/load
    compiled: Option<CompiledProgram>,

    /// Input queue, pull callback and output log
    io: Io,

    /// Single-step position in `text`
    pc: usize,

    running: bool,

    /// Chunked runner position, kept between calls
    cursor: Cursor,
}

impl Machine {
    /// Create a machine with `capacity` zeroed cells and default policies
    pub fn new(capacity: usize) -> VmResult<Self> {
        Self::with_policies(capacity, PointerPolicy::default(), CellPolicy::default())
    }

    pub fn with_policies(
        capacity: usize,
        pointer_policy: PointerPolicy,
        cell_policy: CellPolicy,
    ) -> VmResult<Self> {
        Ok(Machine {
            tape: Tape::new(capacity, pointer_policy, cell_policy)?,
            source: String::new(),
            text: Vec::new(),
            compiled: None,
            io: Io::new(),
            pc: 0,
            running: false,
            cursor: Cursor::default(),
        })
    }

    pub fn from_config(config: &VmConfig) -> VmResult<Self> {
        config.validate()?;
        Self::with_policies(config.capacity, config.pointer_policy, config.cell_policy)
    }

    /// Replace the overflow policies. State is left untouched.
    pub fn configure(&mut self, pointer_policy: PointerPolicy, cell_policy: CellPolicy) {
        self.tape.set_policies(pointer_policy, cell_policy);
    }

    /// Install the callback used when `,` finds the input queue empty
    ///
    /// The callback survives `reset` and `load`.
    pub fn set_input_source<S: InputSource + 'static>(&mut self, source: S) {
        self.io.set_source(Box::new(source));
    }

    pub fn clear_input_source(&mut self) {
        self.io.clear_source();
    }

    /// Return every piece of mutable state to its initial configuration
    ///
    /// Capacity, policies and the input callback are kept.
    pub fn reset(&mut self) {
        self.tape.reset();
        self.source.clear();
        self.text.clear();
        self.compiled = None;
        self.io.clear();
        self.pc = 0;
        self.running = false;
        self.cursor = Cursor::default();
    }

    /// Install program text and preloaded input, and mark the machine running
    ///
    /// Memory and pointer are not touched; call [`Machine::reset`] first for a
    /// clean run. Each byte of `input` becomes one queued value.
    pub fn load(&mut self, program: &str, input: &str) {
        self.source = program.to_string();
        self.text = program.chars().collect();
        self.compiled = None;
        self.io.clear();
        self.io.queue_text(input);
        self.pc = 0;
        self.cursor = Cursor::default();
        self.running = true;
        debug!(chars = self.text.len(), input = input.len(), "program loaded");
    }

    /// Append raw values to the input queue
    pub fn queue_input<I: IntoIterator<Item = i64>>(&mut self, values: I) {
        self.io.queue_values(values);
    }

    /// Every illegal character in the loaded program
    pub fn check_syntax(&self) -> Vec<SyntaxViolation> {
        parser::check_syntax(&self.source)
    }

    /// Compile the loaded program, reusing the cached result if present
    pub fn compile(&mut self) -> VmResult<&CompiledProgram> {
        if self.source.is_empty() {
            return Err(CompileError::EmptyProgram.into());
        }
        self.ensure_compiled()?;
        match &self.compiled {
            Some(program) => Ok(program),
            None => Err(CompileError::EmptyProgram.into()),
        }
    }

    /// Statistics for the compiled form of the loaded program
    pub fn compile_stats(&mut self) -> VmResult<CompileStats> {
        self.ensure_compiled()?;
        match &self.compiled {
            Some(program) => Ok(program.stats(&self.source)),
            None => Err(CompileError::EmptyProgram.into()),
        }
    }

    /// Pseudocode for the loaded program
    pub fn describe(&self) -> String {
        pseudocode::describe(
            &self.source,
            self.tape.capacity(),
            self.tape.pointer(),
            self.tape.cell_policy(),
        )
    }

    /// Execute one character of the raw program text
    ///
    /// Returns `Ok(false)` without doing anything if the machine is not
    /// running or the text is exhausted. Running is cleared as soon as the
    /// cursor moves past the last character, and on any error.
    pub fn step(&mut self) -> VmResult<bool> {
        if !self.running || self.pc >= self.text.len() {
            self.running = false;
            return Ok(false);
        }

        let result = Stepper::new(&self.text, &mut self.tape, &mut self.io).step_at(self.pc);
        match result {
            Ok(next) => {
                self.pc = next;
                if self.pc >= self.text.len() {
                    self.running = false;
                }
                Ok(true)
            }
            Err(e) => {
                self.running = false;
                Err(e)
            }
        }
    }

    /// Single-step until the program ends or `max_steps` steps have run
    ///
    /// Returns the number of steps taken.
    pub fn run_until_end(&mut self, max_steps: usize) -> VmResult<usize> {
        let mut steps = 0;
        while self.running && steps < max_steps {
            if !self.step()? {
                break;
            }
            steps += 1;
        }
        if self.running {
            warn!(steps, pc = self.pc, "step budget exhausted");
        }
        Ok(steps)
    }

    /// Run the compiled program from the start until it ends or `max_steps`
    /// instructions have executed
    ///
    /// Returns the number of instructions executed. Clears running.
    pub fn run_fast(&mut self, max_steps: usize) -> VmResult<usize> {
        if let Err(e) = self.ensure_compiled() {
            self.running = false;
            return Err(e);
        }
        let Some(program) = self.compiled.as_ref() else {
            self.running = false;
            return Ok(0);
        };

        let mut cursor = Cursor::default();
        let mut executor = Executor::new(program.instructions(), &mut self.tape, &mut self.io);
        let result = executor.advance(&mut cursor, usize::MAX, max_steps);
        let finished = executor.is_finished(&cursor);
        self.running = false;

        let steps = result?;
        if !finished {
            warn!(steps, pc = cursor.pc, "step budget exhausted");
        }
        debug!(steps, output = self.io.output().len(), "fast run finished");
        Ok(steps)
    }

    /// Run at most `chunk_size` compiled instructions, continuing where the
    /// previous call stopped
    ///
    /// Returns `true` while more work remains. Returns `false` once the
    /// program has ended or the cumulative step count reached `max_steps`;
    /// the cursor is then rewound and running cleared. On error the cursor
    /// stays on the failing instruction. A chunk size of zero runs one
    /// instruction per call.
    pub fn run_chunk(&mut self, chunk_size: usize, max_steps: usize) -> VmResult<bool> {
        if let Err(e) = self.ensure_compiled() {
            self.running = false;
            return Err(e);
        }
        let Some(program) = self.compiled.as_ref() else {
            self.running = false;
            return Ok(false);
        };

        let mut executor = Executor::new(program.instructions(), &mut self.tape, &mut self.io);
        let result = executor.advance(&mut self.cursor, chunk_size.max(1), max_steps);
        let finished = executor.is_finished(&self.cursor);

        let executed = match result {
            Ok(executed) => executed,
            Err(e) => {
                self.running = false;
                return Err(e);
            }
        };
        trace!(executed, pc = self.cursor.pc, total = self.cursor.steps, "chunk executed");

        if finished || self.cursor.steps >= max_steps {
            if !finished {
                warn!(steps = self.cursor.steps, "step budget exhausted");
            }
            debug!(steps = self.cursor.steps, "chunked run finished");
            self.cursor = Cursor::default();
            self.running = false;
            return Ok(false);
        }

        Ok(true)
    }

    fn ensure_compiled(&mut self) -> VmResult<()> {
        if self.compiled.is_none() {
            self.compiled = Some(parser::compile(&self.source)?);
        }
        Ok(())
    }

    pub fn pointer(&self) -> usize {
        self.tape.pointer()
    }

    /// Single-step position in the raw program text
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn memory(&self) -> &[i64] {
        self.tape.cells()
    }

    pub fn capacity(&self) -> usize {
        self.tape.capacity()
    }

    /// Every byte emitted so far
    pub fn output(&self) -> &[u8] {
        self.io.output()
    }

    /// Output log decoded as UTF-8, with invalid sequences replaced
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(self.io.output()).into_owned()
    }

    /// Chunked runner position in the compiled program
    pub fn fast_pc(&self) -> usize {
        self.cursor.pc
    }

    /// Instructions executed by the chunked runner in the current run
    pub fn fast_steps(&self) -> usize {
        self.cursor.steps
    }

    pub fn program(&self) -> &str {
        &self.source
    }

    /// Compiled program, if one has been built since the last reset/load
    pub fn compiled(&self) -> Option<&CompiledProgram> {
        self.compiled.as_ref()
    }

    pub fn pointer_policy(&self) -> PointerPolicy {
        self.tape.pointer_policy()
    }

    pub fn cell_policy(&self) -> CellPolicy {
        self.tape.cell_policy()
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("capacity", &self.tape.capacity())
            .field("pointer", &self.tape.pointer())
            .field("pc", &self.pc)
            .field("running", &self.running)
            .field("cursor", &self.cursor)
            .field("compiled", &self.compiled.as_ref().map(|p| p.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmError;

    fn machine() -> Machine {
        Machine::new(30000).unwrap()
    }

    #[test]
    fn test_new_machine_is_idle() {
        let m = machine();
        assert!(!m.is_running());
        assert_eq!(m.pointer(), 0);
        assert_eq!(m.capacity(), 30000);
        assert!(m.memory().iter().all(|&c| c == 0));
        assert!(m.output().is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(Machine::new(0), Err(VmError::Config(_))));
    }

    #[test]
    fn test_load_marks_running() {
        let mut m = machine();
        m.load("+", "");
        assert!(m.is_running());
        assert_eq!(m.program(), "+");
    }

    #[test]
    fn test_step_clears_running_at_end() {
        let mut m = machine();
        m.load("++", "");
        assert!(m.step().unwrap());
        assert!(m.is_running());
        assert!(m.step().unwrap());
        assert!(!m.is_running());
        assert!(!m.step().unwrap());
        assert_eq!(m.memory()[0], 2);
        assert_eq!(m.pc(), 2);
    }

    #[test]
    fn test_step_not_loaded() {
        let mut m = machine();
        assert!(!m.step().unwrap());
    }

    #[test]
    fn test_run_until_end_counts_characters() {
        let mut m = machine();
        m.load("+a+", "");
        assert_eq!(m.run_until_end(100).unwrap(), 3);
        assert_eq!(m.memory()[0], 2);
    }

    #[test]
    fn test_run_until_end_budget() {
        let mut m = machine();
        m.load("+[]", "");
        assert_eq!(m.run_until_end(10).unwrap(), 10);
        assert!(m.is_running());
    }

    #[test]
    fn test_step_error_freezes_state() {
        let mut m = Machine::with_policies(2, PointerPolicy::Error, CellPolicy::Wrap).unwrap();
        m.load("+>>", "");
        m.step().unwrap();
        m.step().unwrap();
        let err = m.step().unwrap_err();
        assert!(err.is_pointer_overflow());
        assert!(!m.is_running());
        assert_eq!(m.pc(), 2);
        assert_eq!(m.pointer(), 1);
    }

    #[test]
    fn test_step_unmatched_bracket() {
        let mut m = machine();
        m.load("[", "");
        let err = m.step().unwrap_err();
        assert!(matches!(err, VmError::UnmatchedBracket { bracket: '[', position: 0 }));
        assert!(!m.is_running());
    }

    #[test]
    fn test_run_fast_lazily_compiles() {
        let mut m = machine();
        m.load("+++.", "");
        assert!(m.compiled().is_none());
        assert_eq!(m.run_fast(1000).unwrap(), 2);
        assert!(m.compiled().is_some());
        assert_eq!(m.output(), &[3]);
        assert!(!m.is_running());
    }

    #[test]
    fn test_run_fast_compile_error() {
        let mut m = machine();
        m.load("+x", "");
        let err = m.run_fast(1000).unwrap_err();
        assert!(matches!(err, VmError::Compile(CompileError::Syntax(_))));
        assert!(!m.is_running());
        assert_eq!(m.memory()[0], 0);
    }

    #[test]
    fn test_run_chunk_resumes_and_rewinds() {
        let mut m = machine();
        m.load("++++++++[-]", "");
        assert!(m.run_chunk(2, 1000).unwrap());
        assert_eq!(m.fast_steps(), 2);
        assert!(m.is_running());

        while m.run_chunk(2, 1000).unwrap() {}
        assert!(!m.is_running());
        assert_eq!(m.fast_pc(), 0);
        assert_eq!(m.fast_steps(), 0);
        assert_eq!(m.memory()[0], 0);
    }

    #[test]
    fn test_run_chunk_budget_stops() {
        let mut m = machine();
        m.load("+[]", "");
        let mut calls = 0;
        while m.run_chunk(7, 50).unwrap() {
            calls += 1;
        }
        // 50 steps in chunks of 7: seven calls return true, the eighth false
        assert_eq!(calls, 7);
        assert!(!m.is_running());
    }

    #[test]
    fn test_run_chunk_error_keeps_cursor() {
        let mut m = Machine::with_policies(4, PointerPolicy::Clamp, CellPolicy::Error).unwrap();
        m.load("+.--", "");
        let err = m.run_chunk(10, 100).unwrap_err();
        assert!(err.is_cell_overflow());
        assert_eq!(m.fast_pc(), 2);
        assert_eq!(m.memory()[0], 1);
        assert!(!m.is_running());
    }

    #[test]
    fn test_reset_preserves_configuration() {
        let mut m = Machine::with_policies(16, PointerPolicy::Wrap, CellPolicy::Unlimited).unwrap();
        m.load("+>+.", "abc");
        m.run_fast(100).unwrap();
        m.reset();

        assert_eq!(m.capacity(), 16);
        assert_eq!(m.pointer_policy(), PointerPolicy::Wrap);
        assert_eq!(m.cell_policy(), CellPolicy::Unlimited);
        assert_eq!(m.pointer(), 0);
        assert!(m.memory().iter().all(|&c| c == 0));
        assert!(m.output().is_empty());
        assert!(m.program().is_empty());
        assert!(m.compiled().is_none());
        assert!(!m.is_running());
    }

    #[test]
    fn test_load_invalidates_bytecode() {
        let mut m = machine();
        m.load("+", "");
        m.run_fast(10).unwrap();
        assert_eq!(m.compiled().map(|p| p.len()), Some(1));

        m.load("++>+", "");
        assert!(m.compiled().is_none());
        m.run_fast(10).unwrap();
        assert_eq!(m.compiled().map(|p| p.len()), Some(3));
    }

    #[test]
    fn test_load_keeps_memory() {
        let mut m = machine();
        m.load("+++", "");
        m.run_fast(10).unwrap();
        m.load(".", "");
        m.run_fast(10).unwrap();
        assert_eq!(m.output(), &[3]);
    }

    #[test]
    fn test_compile_requires_program() {
        let mut m = machine();
        let err = m.compile().unwrap_err();
        assert!(matches!(err, VmError::Compile(CompileError::EmptyProgram)));

        m.load("[]", "");
        assert_eq!(m.compile().unwrap().len(), 2);
    }

    #[test]
    fn test_compile_stats() {
        let mut m = machine();
        m.load("+++>>", "");
        let stats = m.compile_stats().unwrap();
        assert_eq!(stats.ops_saved, 3);
    }

    #[test]
    fn test_configure_changes_policies_only() {
        let mut m = machine();
        m.load("-", "");
        m.configure(PointerPolicy::Error, CellPolicy::Unlimited);
        m.run_fast(10).unwrap();
        assert_eq!(m.memory()[0], -1);
        assert_eq!(m.output_text(), "");
    }

    #[test]
    fn test_queue_input_out_of_range() {
        let mut m = Machine::with_policies(4, PointerPolicy::Clamp, CellPolicy::Error).unwrap();
        m.load(",", "");
        m.queue_input([300]);
        let err = m.run_fast(10).unwrap_err();
        assert_eq!(err.to_string(), "Input value 300 out of range (0-255)");
        assert_eq!(m.memory()[0], 0);
    }

    #[test]
    fn test_input_callback_survives_reset() {
        let mut m = machine();
        m.set_input_source(|| "A".to_string());
        m.reset();
        m.load(",.", "");
        m.run_fast(10).unwrap();
        assert_eq!(m.output(), b"A");
    }

    #[test]
    fn test_describe_uses_machine_state() {
        let mut m = Machine::with_policies(100, PointerPolicy::Clamp, CellPolicy::Unlimited).unwrap();
        m.load("+", "");
        let text = m.describe();
        assert!(text.contains("Memory initialized with 100 cells."));
        assert!(text.contains("memory[pointer] += 1 (unlimited)"));
    }

    #[test]
    fn test_zero_chunk_size_still_progresses() {
        let mut machine = Machine::new(4).unwrap();
        machine.load("+++.", "");

        assert!(machine.run_chunk(0, 100).unwrap());
        assert_eq!(machine.fast_pc(), 1);
        assert_eq!(machine.memory()[0], 3);

        let mut calls = 1;
        while machine.run_chunk(0, 100).unwrap() {
            calls += 1;
        }
        assert_eq!(calls, 1);
        assert_eq!(machine.output(), &[3]);
    }
}
