//! Mechanic co-occurrence counts.
//!
//! Cell `(a, b)` counts the items carrying both mechanic `a` and mechanic `b`;
//! the diagonal therefore counts the items carrying each mechanic at all.

use smallvec::SmallVec;
use tracing::debug;

use crate::arena::{Arena, Pool};
use crate::ingest::{Element, MechanicCatalog};
use crate::{Error, ErrorStage, Result};

#[derive(Debug)]
pub struct CooccurrenceMatrix {
    size: usize,
    counts: Pool<u32>,
    unresolved: usize,
}

impl CooccurrenceMatrix {
    pub fn build(
        elements: &[Element<'_>],
        catalog: &MechanicCatalog<'_>,
        arena: &mut Arena,
    ) -> Result<Self> {
        let size = catalog.len();
        let cells = size.checked_mul(size).ok_or_else(|| {
            Error::exhausted(format!("{size}x{size} matrix overflows")).with_stage(ErrorStage::Index)
        })?;
        let mut counts =
            Pool::filled(arena, cells, 0u32).map_err(|err| err.with_stage(ErrorStage::Index))?;

        let mut unresolved = 0;
        for item in elements.iter().filter_map(Element::as_item) {
            let mut resolved: SmallVec<[usize; 8]> = SmallVec::new();
            for &mechanic in &item.mechanics {
                match catalog.index_of(mechanic) {
                    Some(idx) if !resolved.contains(&idx) => resolved.push(idx),
                    Some(_) => {}
                    None => {
                        unresolved += 1;
                        debug!(item = %item.name, %mechanic, "mechanic not in catalog");
                    }
                }
            }
            for &a in &resolved {
                for &b in &resolved {
                    counts[a * size + b] += 1;
                }
            }
        }

        Ok(Self {
            size,
            counts,
            unresolved,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        if i >= self.size || j >= self.size {
            return None;
        }
        Some(self.counts[i * self.size + j])
    }

    pub fn row(&self, i: usize) -> Option<&[u32]> {
        if i >= self.size {
            return None;
        }
        Some(&self.counts[i * self.size..(i + 1) * self.size])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.size).filter_map(move |i| self.row(i))
    }

    /// Mechanic mentions that matched no catalog entry.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Upper triangle as `(i, j, count)` with `i < j`, row-major.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        (0..self.size).flat_map(move |i| {
            (i + 1..self.size).map(move |j| (i, j, self.counts[i * self.size + j]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Manifest;
    use crate::text::Str;
    use crate::LoadOptions;

    fn build(mechanics: &str, manifest: &str) -> CooccurrenceMatrix {
        let mut arena = Arena::with_capacity(1 << 20);
        let catalog = MechanicCatalog::parse(Str::from(mechanics), &mut arena).unwrap();
        let manifest =
            Manifest::parse(Str::from(manifest), &mut arena, &LoadOptions::default()).unwrap();
        CooccurrenceMatrix::build(manifest.elements(), &catalog, &mut arena).unwrap()
    }

    #[rstest::rstest]
    fn test_single_item_two_mechanics() {
        let matrix = build(
            "Name\nCombat\nTrade",
            "Fate1,A,,,\nFate1,Item1,Combat,ID1,NoteA\n,,Trade,,",
        );
        assert_eq!(matrix.size(), 2);
        let rows: Vec<&[u32]> = matrix.rows().collect();
        assert_eq!(rows, [[1, 1], [1, 1]]);
        assert_eq!(matrix.unresolved(), 0);
    }

    #[rstest::rstest]
    fn test_symmetry_and_diagonal() {
        let matrix = build(
            "Name\nCombat\nTrade\nBuild",
            "F,A\nF,I1,Combat\n,,Trade\nF,I2,Trade\n,,Build\nF,I3,Build\n,,Combat\n,,Trade",
        );
        assert!(matrix.is_symmetric());
        assert_eq!(matrix.get(0, 0), Some(2));
        assert_eq!(matrix.get(1, 1), Some(3));
        assert_eq!(matrix.get(2, 2), Some(2));
        assert_eq!(matrix.get(0, 1), Some(2));
        assert_eq!(matrix.get(1, 2), Some(2));
        assert_eq!(matrix.get(0, 2), Some(1));
        assert_eq!(matrix.get(3, 0), None);
    }

    #[rstest::rstest]
    fn test_repeated_mechanic_counts_once() {
        let matrix = build("Name\nCombat", "F,A\nF,I,Combat\n,,Combat");
        assert_eq!(matrix.get(0, 0), Some(1));
    }

    #[rstest::rstest]
    fn test_unresolved_names_are_skipped() {
        let matrix = build("Name\nCombat", "F,A\nF,I,Combat\n,,Mystery\nF,J,Other");
        assert_eq!(matrix.get(0, 0), Some(1));
        assert_eq!(matrix.unresolved(), 2);
    }

    #[rstest::rstest]
    fn test_pairs_are_upper_triangle() {
        let matrix = build("Name\nA1\nB1\nC1", "F,A\nF,I,A1\n,,C1");
        let pairs: Vec<_> = matrix.pairs().collect();
        assert_eq!(pairs, [(0, 1, 0), (0, 2, 1), (1, 2, 0)]);
    }

    #[rstest::rstest]
    fn test_empty_catalog() {
        let matrix = build("Name", "F,A\nF,I,Combat");
        assert_eq!(matrix.size(), 0);
        assert_eq!(matrix.rows().count(), 0);
        assert_eq!(matrix.pairs().count(), 0);
        assert!(matrix.is_symmetric());
    }

    #[rstest::rstest]
    fn test_matrix_charges_arena() {
        let mut arena = Arena::with_capacity(1 << 12);
        let names: String = (0..40).map(|i| format!("\nM{i}")).collect();
        let mechanics = format!("Name{names}");
        let catalog = MechanicCatalog::parse(Str::from(mechanics.as_str()), &mut arena).unwrap();
        let err = CooccurrenceMatrix::build(&[], &catalog, &mut arena).unwrap_err();
        assert!(err.is_exhaustion());
        assert_eq!(err.stage, ErrorStage::Index);
    }
}
