use std::path::PathBuf;

use crate::constants::{
    DEFAULT_ARENA_CAPACITY, DEFAULT_ELEMENT_CAPACITY, DEFAULT_RESOURCE_EXTENSION,
    DEFAULT_RESOURCE_ROOT,
};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Hard byte limit for the arena; not committed up front.
    pub arena_capacity: usize,
    pub element_capacity: usize,
    pub strict: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arena_capacity(mut self, arena_capacity: usize) -> Self {
        self.arena_capacity = arena_capacity;
        self
    }

    pub fn with_element_capacity(mut self, element_capacity: usize) -> Self {
        self.element_capacity = element_capacity;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            element_capacity: DEFAULT_ELEMENT_CAPACITY,
            strict: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub root: PathBuf,
    pub extension: String,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_RESOURCE_ROOT),
            extension: DEFAULT_RESOURCE_EXTENSION.to_string(),
        }
    }
}
