pub mod arena;
pub mod constants;
pub mod error;
pub mod export;
pub mod ingest;
pub mod matrix;
pub mod options;
pub mod resource;
pub mod text;
pub mod trie;

pub use crate::arena::{Arena, Block, Checkpoint, Pool, Scratch};
pub use crate::error::{Error, ErrorKind, ErrorStage};
pub use crate::export::{
    write_items_csv, write_json, write_matrix_csv, write_pair_counts, write_pair_items,
    ItemReport, MatrixReport, PairReport,
};
pub use crate::ingest::{
    Act, Dataset, Diagnostic, DiagnosticKind, Element, ElementId, ElementKind, Fate, GameItem,
    Manifest, MechanicCatalog,
};
pub use crate::matrix::CooccurrenceMatrix;
pub use crate::options::{CacheOptions, LoadOptions};
pub use crate::resource::{FileLoader, ResourceCache, ResourceHandle, ResourceLoader};
pub use crate::text::{cut, Cut, Str};
pub use crate::trie::{TrieKey, TrieMap};

pub type Result<T> = std::result::Result<T, Error>;

pub fn load<'a>(manifest: &'a [u8], mechanics: &'a [u8], arena: &mut Arena) -> Result<Dataset<'a>> {
    load_with_options(manifest, mechanics, arena, &LoadOptions::default())
}

pub fn load_with_options<'a>(
    manifest: &'a [u8],
    mechanics: &'a [u8],
    arena: &mut Arena,
    options: &LoadOptions,
) -> Result<Dataset<'a>> {
    Dataset::load(manifest, mechanics, arena, options)
}
