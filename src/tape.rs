//! Memory tape and pointer, governed by the overflow policies
//!
//! Every operator that moves the pointer or changes a cell goes through
//! [`Tape::move_pointer`], [`Tape::modify_cell`] or [`Tape::store_input`].
//! The executors never touch the cells directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::error::{Bound, CellWrite, VmError, VmResult};

/// Largest value a cell may hold under the wrap and error cell policies
pub const CELL_MAX: i64 = 255;

/// What happens when the pointer would leave the tape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPolicy {
    /// Stay at the boundary
    #[default]
    Clamp,
    /// Wrap around modulo the capacity
    Wrap,
    /// Fail with `PointerOverflow`
    Error,
}

/// What happens when a cell would leave `[0, 255]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellPolicy {
    /// Wrap around modulo 256
    #[default]
    Wrap,
    /// Store any signed value
    Unlimited,
    /// Fail with `CellOverflow`
    Error,
}

impl fmt::Display for PointerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerPolicy::Clamp => write!(f, "clamp"),
            PointerPolicy::Wrap => write!(f, "wrap"),
            PointerPolicy::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CellPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellPolicy::Wrap => write!(f, "wrap"),
            CellPolicy::Unlimited => write!(f, "unlimited"),
            CellPolicy::Error => write!(f, "error"),
        }
    }
}

impl FromStr for PointerPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(PointerPolicy::Clamp),
            "wrap" => Ok(PointerPolicy::Wrap),
            "error" => Ok(PointerPolicy::Error),
            _ => Err(ConfigError::UnknownPolicy {
                kind: "pointer",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for CellPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" => Ok(CellPolicy::Wrap),
            "unlimited" => Ok(CellPolicy::Unlimited),
            "error" => Ok(CellPolicy::Error),
            _ => Err(ConfigError::UnknownPolicy {
                kind: "cell",
                value: s.to_string(),
            }),
        }
    }
}

/// Fixed-capacity cell array plus the data pointer
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<i64>,
    pointer: usize,
    pointer_policy: PointerPolicy,
    cell_policy: CellPolicy,
}

impl Tape {
    /// Create a zeroed tape. `capacity` must be at least 1.
    pub fn new(capacity: usize, pointer_policy: PointerPolicy, cell_policy: CellPolicy) -> VmResult<Self> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity.into());
        }
        Ok(Tape {
            cells: vec![0; capacity],
            pointer: 0,
            pointer_policy,
            cell_policy,
        })
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    /// Value of the cell under the pointer
    #[inline]
    pub fn current(&self) -> i64 {
        self.cells[self.pointer]
    }

    pub fn pointer_policy(&self) -> PointerPolicy {
        self.pointer_policy
    }

    pub fn cell_policy(&self) -> CellPolicy {
        self.cell_policy
    }

    pub fn set_policies(&mut self, pointer_policy: PointerPolicy, cell_policy: CellPolicy) {
        self.pointer_policy = pointer_policy;
        self.cell_policy = cell_policy;
    }

    /// Zero every cell and move the pointer home. Capacity and policies are kept.
    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = 0);
        self.pointer = 0;
    }

    /// Move the pointer by `delta` cells under the active pointer policy
    pub fn move_pointer(&mut self, delta: i64) -> VmResult<()> {
        let capacity = self.cells.len() as i64;
        let target = (self.pointer as i64).saturating_add(delta);

        self.pointer = match self.pointer_policy {
            PointerPolicy::Clamp => target.clamp(0, capacity - 1) as usize,
            PointerPolicy::Wrap => target.rem_euclid(capacity) as usize,
            PointerPolicy::Error => {
                if target < 0 {
                    return Err(VmError::PointerOverflow {
                        bound: Bound::Underflow,
                        attempted: target,
                        max: self.cells.len() - 1,
                    });
                }
                if target >= capacity {
                    return Err(VmError::PointerOverflow {
                        bound: Bound::Overflow,
                        attempted: target,
                        max: self.cells.len() - 1,
                    });
                }
                target as usize
            }
        };
        Ok(())
    }

    /// Add `delta` to the current cell under the active cell policy
    pub fn modify_cell(&mut self, delta: i64) -> VmResult<()> {
        let value = self.current().saturating_add(delta);

        self.cells[self.pointer] = match self.cell_policy {
            CellPolicy::Wrap => value.rem_euclid(CELL_MAX + 1),
            CellPolicy::Unlimited => value,
            CellPolicy::Error => self.check_range(value, CellWrite::Arithmetic)?,
        };
        Ok(())
    }

    /// Store a value read from the input queue into the current cell
    ///
    /// The value is stored as-is. Only the error policy range-checks it.
    pub fn store_input(&mut self, value: i64) -> VmResult<()> {
        self.cells[self.pointer] = match self.cell_policy {
            CellPolicy::Error => self.check_range(value, CellWrite::Input)?,
            CellPolicy::Wrap | CellPolicy::Unlimited => value,
        };
        Ok(())
    }

    /// Byte emitted by `.` for the current cell
    ///
    /// Under the unlimited policy out-of-range values are clamped, otherwise
    /// the byte is the value modulo 256. The stored cell keeps its value.
    pub fn output_byte(&self) -> u8 {
        let value = self.current();
        if self.cell_policy == CellPolicy::Unlimited && !(0..=CELL_MAX).contains(&value) {
            value.clamp(0, CELL_MAX) as u8
        } else {
            value.rem_euclid(CELL_MAX + 1) as u8
        }
    }

    fn check_range(&self, value: i64, write: CellWrite) -> VmResult<i64> {
        let bound = if value < 0 {
            Bound::Underflow
        } else if value > CELL_MAX {
            Bound::Overflow
        } else {
            return Ok(value);
        };
        Err(VmError::CellOverflow {
            bound,
            cell: self.pointer,
            value,
            write,
        })
    }
}
