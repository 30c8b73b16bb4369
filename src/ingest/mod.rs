//! Two-table ingestion: the mechanics catalog, then the manifest, then the
//! co-occurrence index over both.

mod catalog;
mod manifest;

pub use catalog::MechanicCatalog;
pub use manifest::{
    Act, Diagnostic, DiagnosticKind, Element, ElementId, ElementKind, Fate, GameItem, Manifest,
};

use tracing::{debug, instrument};

use crate::arena::Arena;
use crate::matrix::CooccurrenceMatrix;
use crate::text::Str;
use crate::{LoadOptions, Result};

/// Everything derived from one manifest and one mechanics table. Borrows both
/// input buffers; nothing is copied out of them.
#[derive(Debug)]
pub struct Dataset<'a> {
    catalog: MechanicCatalog<'a>,
    manifest: Manifest<'a>,
    matrix: CooccurrenceMatrix,
}

impl<'a> Dataset<'a> {
    #[instrument(
        level = "debug",
        skip_all,
        fields(manifest_bytes = manifest.len(), mechanics_bytes = mechanics.len())
    )]
    pub fn load(
        manifest: &'a [u8],
        mechanics: &'a [u8],
        arena: &mut Arena,
        options: &LoadOptions,
    ) -> Result<Self> {
        let catalog = MechanicCatalog::parse(Str::new(mechanics), arena)?;
        let manifest = Manifest::parse(Str::new(manifest), arena, options)?;
        let matrix = CooccurrenceMatrix::build(manifest.elements(), &catalog, arena)?;
        debug!(
            elements = manifest.len(),
            mechanics = catalog.len(),
            diagnostics = manifest.diagnostics().len(),
            unresolved = matrix.unresolved(),
            arena_used = arena.used(),
            "dataset loaded"
        );
        Ok(Self {
            catalog,
            manifest,
            matrix,
        })
    }

    pub fn elements(&self) -> &[Element<'a>] {
        self.manifest.elements()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element<'a>> {
        self.manifest.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = (ElementId, &GameItem<'a>)> + '_ {
        self.manifest.items()
    }

    pub fn catalog(&self) -> &MechanicCatalog<'a> {
        &self.catalog
    }

    pub fn matrix(&self) -> &CooccurrenceMatrix {
        &self.matrix
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.manifest.diagnostics()
    }

    pub fn parent_fate(&self, item: &GameItem<'_>) -> Option<&Fate<'a>> {
        item.parent_fate
            .and_then(|id| self.element(id))
            .and_then(Element::as_fate)
    }

    /// Items carrying both catalog mechanics `i` and `j`, in input order.
    /// Out-of-range indices match nothing.
    pub fn items_with(
        &self,
        i: usize,
        j: usize,
    ) -> impl Iterator<Item = (ElementId, &GameItem<'a>)> + '_ {
        let wanted = self.catalog.name(i).zip(self.catalog.name(j));
        self.items().filter(move |(_, item)| match wanted {
            Some((a, b)) => item.has_mechanic(a) && item.has_mechanic(b),
            None => false,
        })
    }

    /// Same as [`Dataset::items_with`], by mechanic name. `None` when either
    /// name is not in the catalog.
    pub fn items_with_names(
        &self,
        a: &str,
        b: &str,
    ) -> Option<impl Iterator<Item = (ElementId, &GameItem<'a>)> + '_> {
        let i = self.catalog.index_of(Str::from(a))?;
        let j = self.catalog.index_of(Str::from(b))?;
        Some(self.items_with(i, j))
    }
}
