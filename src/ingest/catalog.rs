use tracing::{debug, warn};

use crate::arena::{Arena, Pool};
use crate::constants::FIELD_DELIMITER;
use crate::text::Str;
use crate::{ErrorStage, Result};

/// Ordered, distinct mechanic names. Indices double as matrix coordinates.
#[derive(Debug)]
pub struct MechanicCatalog<'a> {
    names: Pool<Str<'a>>,
}

impl<'a> MechanicCatalog<'a> {
    /// Reads the mechanics table: a header row, then one mechanic per row in
    /// the first column. The first pass sizes the pool, the second fills it.
    pub fn parse(text: Str<'a>, arena: &mut Arena) -> Result<Self> {
        let count = rows(text).count();
        let mut names =
            Pool::with_capacity(arena, count).map_err(|err| err.with_stage(ErrorStage::Catalog))?;
        for name in rows(text) {
            if names.contains(&name) {
                warn!(%name, "duplicate mechanic skipped");
                continue;
            }
            names
                .push(name)
                .map_err(|err| err.with_stage(ErrorStage::Catalog))?;
        }
        debug!(mechanics = names.len(), "mechanic catalog parsed");
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[Str<'a>] {
        &self.names
    }

    pub fn name(&self, idx: usize) -> Option<Str<'a>> {
        self.names.get(idx).copied()
    }

    /// Exact byte match, linear scan.
    pub fn index_of(&self, name: Str<'_>) -> Option<usize> {
        self.names.iter().position(|candidate| *candidate == name)
    }
}

fn rows(text: Str<'_>) -> impl Iterator<Item = Str<'_>> {
    text.lines()
        .skip(1)
        .map(|line| line.trim_right().cut(FIELD_DELIMITER).head.trim())
        .filter(|name| !name.is_empty())
}
