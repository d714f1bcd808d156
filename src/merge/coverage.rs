// src/merge/coverage.rs

use crate::error::{ProfileError, Result};

/// One flag per query base. Flags only ever go from unset to set.
#[derive(Debug, Clone)]
pub struct CoverageBitmap {
    covered: Vec<bool>,
}

impl CoverageBitmap {
    pub fn new(read_length: usize) -> Self {
        Self {
            covered: vec![false; read_length],
        }
    }

    pub fn len(&self) -> usize {
        self.covered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }

    /// Positions past the end of the read are never covered.
    #[inline]
    pub fn is_covered(&self, pos: usize) -> bool {
        self.covered.get(pos).copied().unwrap_or(false)
    }

    #[inline]
    pub fn mark(&mut self, pos: usize) -> Result<()> {
        let len = self.covered.len();
        let flag = self
            .covered
            .get_mut(pos)
            .ok_or_else(|| ProfileError::out_of_range("query", pos, len))?;
        *flag = true;
        Ok(())
    }

    pub fn count_covered(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }
}
