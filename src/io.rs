//! Input queue, input pull callback and output log

use std::collections::VecDeque;
use tracing::debug;

/// Source of additional input when the queue runs dry
///
/// This is the boundary to the host. An implementation may block, prompt a
/// user, or read a file. Returning an empty string means "no more input";
/// the VM then stores 0 in the current cell.
///
/// Each byte of the returned text becomes one queued input value.
pub trait InputSource {
    /// Pull more input text
    fn pull(&mut self) -> String;
}

impl<F> InputSource for F
where
    F: FnMut() -> String,
{
    fn pull(&mut self) -> String {
        self()
    }
}

/// Input queue, pull callback and output log owned by a machine
#[derive(Default)]
pub struct Io {
    input: VecDeque<i64>,
    output: Vec<u8>,
    source: Option<Box<dyn InputSource>>,
}

impl Io {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the pull callback, replacing any previous one
    pub fn set_source(&mut self, source: Box<dyn InputSource>) {
        self.source = Some(source);
    }

    pub fn clear_source(&mut self) {
        self.source = None;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Queue every byte of `text`
    pub fn queue_text(&mut self, text: &str) {
        self.input.extend(text.bytes().map(i64::from));
    }

    /// Queue raw input values
    pub fn queue_values<I: IntoIterator<Item = i64>>(&mut self, values: I) {
        self.input.extend(values);
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Next input value, pulling from the callback when the queue is empty
    ///
    /// Returns `None` when the queue is empty and the callback is absent or
    /// produced nothing.
    pub fn read(&mut self) -> Option<i64> {
        if self.input.is_empty() {
            if let Some(source) = self.source.as_mut() {
                let text = source.pull();
                debug!(bytes = text.len(), "pulled input from host");
                self.input.extend(text.bytes().map(i64::from));
            }
        }
        self.input.pop_front()
    }

    /// Append a byte to the output log
    #[inline]
    pub fn write(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Every byte emitted so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Drop queued input and the output log. The callback is kept.
    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
    }
}

impl std::fmt::Debug for Io {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Io")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("source", &self.source.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut io = Io::new();
        io.queue_text("ab");
        io.queue_values([7]);
        assert_eq!(io.read(), Some(97));
        assert_eq!(io.read(), Some(98));
        assert_eq!(io.read(), Some(7));
        assert_eq!(io.read(), None);
    }

    #[test]
    fn test_pull_only_when_empty() {
        let mut calls = 0;
        let mut io = Io::new();
        io.queue_text("x");
        io.set_source(Box::new(move || {
            calls += 1;
            format!("{}", calls)
        }));

        assert_eq!(io.read(), Some(b'x' as i64));
        assert_eq!(io.read(), Some(b'1' as i64));
        assert_eq!(io.read(), Some(b'2' as i64));
    }

    #[test]
    fn test_empty_pull_means_no_input() {
        let mut io = Io::new();
        io.set_source(Box::new(String::new));
        assert_eq!(io.read(), None);
        assert!(io.has_source());
    }

    #[test]
    fn test_multibyte_text_splits_into_bytes() {
        let mut io = Io::new();
        io.queue_text("é");
        assert_eq!(io.pending_input(), 2);
        assert_eq!(io.read(), Some(0xC3));
        assert_eq!(io.read(), Some(0xA9));
    }

    #[test]
    fn test_clear_keeps_source() {
        let mut io = Io::new();
        io.set_source(Box::new(|| "z".to_string()));
        io.queue_text("abc");
        io.write(1);
        io.clear();

        assert!(io.output().is_empty());
        assert_eq!(io.pending_input(), 0);
        assert_eq!(io.read(), Some(b'z' as i64));
    }
}
