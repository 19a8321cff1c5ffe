use pyo3::prelude::*;
use tracing::warn;

use crate::io::InputSource;

/// Input callback backed by a Python callable
///
/// The callable takes no arguments and returns a `str`. Every byte of the
/// returned text is queued as one input value. An exception or a non-string
/// result is logged and treated as "no more input".
pub struct PyInputSource {
    callback: Py<PyAny>,
}

impl PyInputSource {
    pub fn new(callback: Py<PyAny>) -> Self {
        PyInputSource { callback }
    }
}

impl InputSource for PyInputSource {
    fn pull(&mut self) -> String {
        Python::attach(|py| {
            let result = self
                .callback
                .bind(py)
                .call0()
                .and_then(|value| value.extract::<String>().map_err(Into::into));

            match result {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "input callback failed, treating as end of input");
                    String::new()
                }
            }
        })
    }
}
