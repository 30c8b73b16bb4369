//! Memoized named-resource lookup.
//!
//! Names may be registered up front (typically from a directory listing);
//! any other name gets a node on its first lookup. Either way the resource is
//! loaded on first use through a [`ResourceLoader`]. Empty names, and names
//! whose load fails, resolve to the cache's default handle.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::arena::Arena;
use crate::text::Str;
use crate::trie::TrieMap;
use crate::{CacheOptions, Error, ErrorStage, Result};

/// Opaque handle issued by a loader. `0` means "not loaded yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceHandle(pub u32);

impl ResourceHandle {
    pub const UNLOADED: Self = Self(0);

    pub fn is_loaded(self) -> bool {
        self.0 != 0
    }
}

pub trait ResourceLoader {
    fn load(&mut self, path: &str) -> Result<ResourceHandle>;
}

/// Loader that accepts any existing file and hands out sequential handles.
#[derive(Debug, Default)]
pub struct FileLoader {
    paths: Vec<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self, handle: ResourceHandle) -> Option<&Path> {
        let idx = handle.0.checked_sub(1)?;
        self.paths.get(idx as usize).map(PathBuf::as_path)
    }

    pub fn loaded(&self) -> usize {
        self.paths.len()
    }
}

impl ResourceLoader for FileLoader {
    fn load(&mut self, path: &str) -> Result<ResourceHandle> {
        let path = Path::new(path);
        if !path.is_file() {
            return Err(Error::resource(format!(
                "resource not found: {}",
                path.display()
            )));
        }
        let id = u32::try_from(self.paths.len() + 1)
            .map_err(|_| Error::exhausted("resource handle space exhausted"))?;
        self.paths.push(path.to_path_buf());
        Ok(ResourceHandle(id))
    }
}

pub struct ResourceCache<L> {
    map: TrieMap<SmolStr, ResourceHandle>,
    loader: L,
    options: CacheOptions,
}

impl<L: ResourceLoader> ResourceCache<L> {
    pub fn new(loader: L, options: CacheOptions) -> Self {
        Self {
            map: TrieMap::with_fallback(ResourceHandle::UNLOADED),
            loader,
            options,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn default_handle(&self) -> ResourceHandle {
        *self.map.fallback()
    }

    /// Loads `name` and makes it the handle every miss resolves to.
    pub fn load_default(&mut self, name: &str, arena: &mut Arena) -> Result<ResourceHandle> {
        let handle = load_named(&mut self.loader, &self.options, Str::from(name), arena)?;
        self.map.set_fallback(handle);
        Ok(handle)
    }

    /// Registers `name` without loading it.
    pub fn register(&mut self, name: &str, arena: &mut Arena) -> Result<()> {
        self.map.get_or_insert(SmolStr::new(name), arena)?;
        Ok(())
    }

    /// Registers the stem of every file in `dir` carrying the configured
    /// extension. Returns how many names were registered.
    pub fn register_dir(&mut self, dir: &Path, arena: &mut Arena) -> Result<usize> {
        let mut registered = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(self.options.extension.as_str())
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            self.register(stem, arena)?;
            registered += 1;
        }
        debug!(dir = %dir.display(), registered, "registered resources");
        Ok(registered)
    }

    /// Memoized lookup. A name is loaded on first access, inserting a node
    /// if it was never registered; the result (or the default handle, if
    /// loading failed) is cached. Only running out of arena space for the
    /// node is an error.
    pub fn get_resource(&mut self, name: Str<'_>, arena: &mut Arena) -> Result<ResourceHandle> {
        let default = self.default_handle();
        if name.is_empty() {
            return Ok(default);
        }
        match self.map.get_mut(name.as_bytes()) {
            Some(handle) if handle.is_loaded() => return Ok(*handle),
            Some(_) => {}
            None => {
                self.map
                    .get_or_insert(SmolStr::new(name.to_str_lossy()), arena)
                    .map_err(|err| err.with_stage(ErrorStage::Resource))?;
            }
        }

        let handle = match load_named(&mut self.loader, &self.options, name, arena) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(%name, error = %err, "resource load failed, using default");
                default
            }
        };
        if let Some(slot) = self.map.get_mut(name.as_bytes()) {
            *slot = handle;
        }
        Ok(handle)
    }
}

fn load_named<L: ResourceLoader>(
    loader: &mut L,
    options: &CacheOptions,
    name: Str<'_>,
    arena: &mut Arena,
) -> Result<ResourceHandle> {
    let root = options
        .root
        .to_str()
        .ok_or_else(|| Error::resource("resource root is not valid UTF-8"))?;
    let separator: &[u8] = if root.is_empty() { b"" } else { b"/" };
    let pieces: [&[u8]; 5] = [
        root.as_bytes(),
        separator,
        name.as_bytes(),
        b".",
        options.extension.as_bytes(),
    ];

    let mut scratch = arena.scratch();
    let len = pieces.iter().map(|piece| piece.len()).sum();
    let block = scratch
        .alloc(len, 1, 1)
        .map_err(|err| err.with_stage(ErrorStage::Resource))?;
    let buf = scratch.bytes_mut(block);
    let mut cursor = 0;
    for piece in pieces {
        buf[cursor..cursor + piece.len()].copy_from_slice(piece);
        cursor += piece.len();
    }

    let path = std::str::from_utf8(scratch.bytes(block))
        .map_err(|_| Error::resource(format!("resource name {name} is not valid UTF-8")))?;
    debug!(path, "loading resource");
    loader.load(path)
}
