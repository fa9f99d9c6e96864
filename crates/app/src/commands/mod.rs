pub mod run;
pub mod skills;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use storage::json::CurriculumBundle;
use storage::repository::{InMemoryRepository, Storage};
use storage::seed::builtin_repository;

/// Load the curriculum from `path`, or the built-in one.
pub fn load_repository(path: Option<&Path>) -> Result<InMemoryRepository> {
    match path {
        Some(path) => {
            let bundle = CurriculumBundle::from_path(path)
                .with_context(|| format!("reading curriculum {}", path.display()))?;
            bundle
                .into_repository()
                .with_context(|| format!("loading curriculum {}", path.display()))
        }
        None => builtin_repository().context("loading built-in curriculum"),
    }
}

pub fn load_storage(path: Option<&Path>) -> Result<Storage> {
    load_repository(path).map(Storage::from_repository)
}
