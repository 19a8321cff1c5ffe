//! Python bindings for the tape VM
//!
//! This module exposes [`Machine`] to Python using PyO3.

use pyo3::exceptions::{PyOverflowError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::error::VmError;
use crate::machine::Machine;
use crate::parser;
use crate::python_input::PyInputSource;
use crate::tape::{CellPolicy, PointerPolicy};
use crate::{DEFAULT_CAPACITY, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_STEPS};

/// Pointer and cell overflows raise OverflowError, everything else ValueError
fn to_py_err(err: VmError) -> PyErr {
    match err {
        VmError::PointerOverflow { .. } | VmError::CellOverflow { .. } => {
            PyOverflowError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_policies(pointer: &str, cell: &str) -> PyResult<(PointerPolicy, CellPolicy)> {
    let pointer = pointer
        .parse::<PointerPolicy>()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let cell = cell
        .parse::<CellPolicy>()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((pointer, cell))
}

/// Check program text for illegal characters
///
/// Args:
///     source (str): Program text
///
/// Returns:
///     list[tuple[int, str]]: (position, character) for every violation
///
/// Example:
///     >>> check_syntax("+a-")
///     [(1, 'a')]
#[pyfunction]
fn check_syntax(source: &str) -> Vec<(usize, char)> {
    parser::check_syntax(source)
        .into_iter()
        .map(|v| (v.position, v.character))
        .collect()
}

/// Compile program text into (operator, operand) pairs
///
/// Raises:
///     ValueError: On illegal characters or unbalanced brackets
#[pyfunction]
fn compile(source: &str) -> PyResult<Vec<(char, usize)>> {
    parser::compile(source)
        .map(|program| {
            program
                .instructions()
                .iter()
                .map(|i| (i.op.as_char(), i.operand))
                .collect()
        })
        .map_err(|e| to_py_err(e.into()))
}

/// A tape VM instance
///
/// Example:
///     >>> m = Machine(capacity=100, pointer="wrap")
///     >>> m.load(",[.,]", "hi")
///     >>> m.run_fast()
///     >>> m.output
///     b'hi'
#[pyclass(name = "Machine", unsendable)]
struct PyMachine {
    inner: Machine,
}

#[pymethods]
impl PyMachine {
    #[new]
    #[pyo3(signature = (capacity = DEFAULT_CAPACITY, pointer = "clamp", cell = "wrap"))]
    fn new(capacity: usize, pointer: &str, cell: &str) -> PyResult<Self> {
        let (pointer, cell) = parse_policies(pointer, cell)?;
        Machine::with_policies(capacity, pointer, cell)
            .map(|inner| PyMachine { inner })
            .map_err(to_py_err)
    }

    /// Load program text and preloaded input. Memory is not cleared.
    #[pyo3(signature = (program, input = ""))]
    fn load(&mut self, program: &str, input: &str) {
        self.inner.load(program, input);
    }

    /// Clear memory, program, I/O and run state
    fn reset(&mut self) {
        self.inner.reset();
    }

    /// Replace the pointer and cell policies
    fn configure(&mut self, pointer: &str, cell: &str) -> PyResult<()> {
        let (pointer, cell) = parse_policies(pointer, cell)?;
        self.inner.configure(pointer, cell);
        Ok(())
    }

    /// Install a zero-argument callable returning str, or None to remove it
    fn set_input_callback(&mut self, callback: Option<Py<PyAny>>) {
        match callback {
            Some(callback) => self.inner.set_input_source(PyInputSource::new(callback)),
            None => self.inner.clear_input_source(),
        }
    }

    /// Execute one character of the program text
    ///
    /// Returns:
    ///     bool: False if nothing was executed
    fn step(&mut self) -> PyResult<bool> {
        self.inner.step().map_err(to_py_err)
    }

    #[pyo3(signature = (max_steps = DEFAULT_MAX_STEPS))]
    fn run_until_end(&mut self, max_steps: usize) -> PyResult<usize> {
        self.inner.run_until_end(max_steps).map_err(to_py_err)
    }

    /// Run the compiled program to completion or until the step budget
    #[pyo3(signature = (max_steps = DEFAULT_MAX_STEPS))]
    fn run_fast(&mut self, max_steps: usize) -> PyResult<usize> {
        self.inner.run_fast(max_steps).map_err(to_py_err)
    }

    /// Run one chunk of the compiled program
    ///
    /// Returns:
    ///     bool: True while more work remains
    #[pyo3(signature = (chunk_size = DEFAULT_CHUNK_SIZE, max_steps = DEFAULT_MAX_STEPS))]
    fn run_chunk(&mut self, chunk_size: usize, max_steps: usize) -> PyResult<bool> {
        self.inner.run_chunk(chunk_size, max_steps).map_err(to_py_err)
    }

    fn check_syntax(&self) -> Vec<(usize, char)> {
        self.inner
            .check_syntax()
            .into_iter()
            .map(|v| (v.position, v.character))
            .collect()
    }

    fn compile(&mut self) -> PyResult<Vec<(char, usize)>> {
        self.inner
            .compile()
            .map(|program| {
                program
                    .instructions()
                    .iter()
                    .map(|i| (i.op.as_char(), i.operand))
                    .collect()
            })
            .map_err(to_py_err)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    #[getter]
    fn pointer(&self) -> usize {
        self.inner.pointer()
    }

    #[getter]
    fn pc(&self) -> usize {
        self.inner.pc()
    }

    #[getter]
    fn running(&self) -> bool {
        self.inner.is_running()
    }

    #[getter]
    fn memory(&self) -> Vec<i64> {
        self.inner.memory().to_vec()
    }

    #[getter]
    fn output<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, self.inner.output())
    }

    #[getter]
    fn fast_steps(&self) -> usize {
        self.inner.fast_steps()
    }

    fn __repr__(&self) -> String {
        format!(
            "<Machine capacity={} pointer={} pc={} running={}>",
            self.inner.capacity(),
            self.inner.pointer(),
            self.inner.pc(),
            self.inner.is_running()
        )
    }
}

#[pymodule]
fn _tapevm_rust(m: &Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
    // Add functions
    m.add_function(wrap_pyfunction!(check_syntax, m)?)?;
    m.add_function(wrap_pyfunction!(compile, m)?)?;

    // Add classes
    m.add_class::<PyMachine>()?;
    m.add("DEFAULT_CAPACITY", DEFAULT_CAPACITY)?;

    Ok(())
}
