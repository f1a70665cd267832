//! Reusable scratch storage for derivative and integral calls.

/// A growable `f64` buffer handed to the evaluation routines.
///
/// Curves keep one internally; the `*_with` methods accept a caller-owned
/// one so that a shared curve can be used from several threads, each with
/// its own `Scratch`.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    buf: Vec<f64>,
}

impl Scratch {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `len` values.
    pub fn with_capacity(len: usize) -> Self {
        Self { buf: vec![0.0; len] }
    }

    /// Current length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// A slice of exactly `len` values, growing the buffer if needed.
    pub fn buffer(&mut self, len: usize) -> &mut [f64] {
        if self.buf.len() < len {
            self.buf.resize(len, 0.0);
        }
        &mut self.buf[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_grows_but_never_shrinks() {
        let mut scratch = Scratch::new();
        assert!(scratch.is_empty());
        assert_eq!(scratch.buffer(8).len(), 8);
        assert_eq!(scratch.buffer(3).len(), 3);
        assert_eq!(scratch.len(), 8);
        assert_eq!(Scratch::with_capacity(5).len(), 5);
    }
}
