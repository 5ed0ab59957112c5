//! Logical-to-physical qubit mapping.

use serde::{Deserialize, Serialize};

use qpass_ir::QubitId;

use crate::error::{CompileError, CompileResult};

/// A bijection between logical and physical qubits over `0..n`.
///
/// `n` is the physical qubit count. Logical indices at or above a circuit's
/// own qubit count are idle ancillas. A layout is created by a placer and
/// advanced by routers, one SWAP at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct Layout {
    /// `logical_to_physical[l]` is the physical qubit holding logical `l`.
    logical_to_physical: Vec<u32>,
    /// Inverse of `logical_to_physical`.
    physical_to_logical: Vec<u32>,
}

impl TryFrom<Vec<u32>> for Layout {
    type Error = CompileError;

    fn try_from(physical: Vec<u32>) -> CompileResult<Self> {
        Self::from_physical(physical)
    }
}

impl From<Layout> for Vec<u32> {
    fn from(layout: Layout) -> Self {
        layout.logical_to_physical
    }
}

impl Layout {
    /// Create a trivial layout (logical qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        let identity: Vec<u32> = (0..num_qubits).collect();
        Self {
            logical_to_physical: identity.clone(),
            physical_to_logical: identity,
        }
    }

    /// Build a layout from `physical[l]`, the physical qubit of logical `l`.
    /// Fails unless `physical` is a permutation of `0..physical.len()`.
    pub fn from_physical(physical: Vec<u32>) -> CompileResult<Self> {
        let n = physical.len();
        let mut inverse = vec![u32::MAX; n];
        for (logical, &p) in physical.iter().enumerate() {
            let slot = inverse.get_mut(p as usize).ok_or_else(|| {
                CompileError::InvalidLayout(format!(
                    "physical qubit {p} out of range for {n} qubits"
                ))
            })?;
            if *slot != u32::MAX {
                return Err(CompileError::InvalidLayout(format!(
                    "physical qubit {p} assigned to logical {} and {logical}",
                    *slot
                )));
            }
            *slot = logical as u32;
        }
        Ok(Self {
            logical_to_physical: physical,
            physical_to_logical: inverse,
        })
    }

    /// Number of qubits covered by the layout.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// True for the layout over zero qubits.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Physical qubit of `logical`.
    ///
    /// # Panics
    ///
    /// Panics if `logical` is not covered by the layout.
    #[inline]
    pub fn physical(&self, logical: u32) -> u32 {
        self.logical_to_physical[logical as usize]
    }

    /// Logical qubit held by `physical`.
    ///
    /// # Panics
    ///
    /// Panics if `physical` is not covered by the layout.
    #[inline]
    pub fn logical(&self, physical: u32) -> u32 {
        self.physical_to_logical[physical as usize]
    }

    /// Physical qubit of `logical`, `None` if out of range.
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(logical.index()).copied()
    }

    /// Logical qubit held by `physical`, `None` if out of range.
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical
            .get(physical as usize)
            .map(|&l| QubitId(l))
    }

    /// Exchange the logical qubits held by two physical qubits.
    pub fn swap_physical(&mut self, p1: u32, p2: u32) {
        let l1 = self.physical_to_logical[p1 as usize];
        let l2 = self.physical_to_logical[p2 as usize];
        self.physical_to_logical.swap(p1 as usize, p2 as usize);
        self.logical_to_physical[l1 as usize] = p2;
        self.logical_to_physical[l2 as usize] = p1;
    }

    /// Exchange the physical positions of two logical qubits.
    pub fn swap_logical(&mut self, l1: u32, l2: u32) {
        let (p1, p2) = (self.physical(l1), self.physical(l2));
        self.swap_physical(p1, p2);
    }

    /// Follow this layout with `next`, which maps this layout's physical
    /// qubits onto new physical qubits.
    pub fn then(&self, next: &Layout) -> CompileResult<Self> {
        if next.len() != self.len() {
            return Err(CompileError::InvalidLayout(format!(
                "cannot compose layouts over {} and {} qubits",
                self.len(),
                next.len()
            )));
        }
        let composed = self
            .logical_to_physical
            .iter()
            .map(|&p| next.physical(p))
            .collect();
        Self::from_physical(composed)
    }

    /// The logical-to-physical permutation, indexed by logical qubit.
    pub fn as_permutation(&self) -> &[u32] {
        &self.logical_to_physical
    }

    /// The physical-to-logical permutation, indexed by physical qubit.
    pub fn inverse_permutation(&self) -> &[u32] {
        &self.physical_to_logical
    }

    /// True if every logical qubit sits on the physical qubit of the same index.
    pub fn is_trivial(&self) -> bool {
        self.logical_to_physical
            .iter()
            .enumerate()
            .all(|(l, &p)| l as u32 == p)
    }

    /// Iterate `(logical, physical)` pairs in logical order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, u32)> + '_ {
        self.logical_to_physical
            .iter()
            .enumerate()
            .map(|(l, &p)| (QubitId(l as u32), p))
    }
}
