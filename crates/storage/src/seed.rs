//! Built-in curriculum shipped with the binary.

use crate::json::CurriculumBundle;
use crate::repository::{InMemoryRepository, StorageError, Storage};

const BUILTIN_CURRICULUM: &str = include_str!("../data/curriculum.json");

/// Skill opened when no other skill is requested.
pub const DEFAULT_SKILL: &str = "basic-reading";

/// Parse the embedded curriculum bundle.
///
/// # Errors
///
/// Returns `StorageError` if the embedded bundle is malformed.
pub fn builtin_bundle() -> Result<CurriculumBundle, StorageError> {
    CurriculumBundle::from_json(BUILTIN_CURRICULUM)
}

/// Load the embedded curriculum into a repository.
///
/// # Errors
///
/// Returns `StorageError` if any embedded exercise fails validation.
pub fn builtin_repository() -> Result<InMemoryRepository, StorageError> {
    builtin_bundle()?.into_repository()
}

/// Storage backed by the embedded curriculum.
///
/// # Errors
///
/// Returns `StorageError` if any embedded exercise fails validation.
pub fn builtin_storage() -> Result<Storage, StorageError> {
    builtin_repository().map(Storage::from_repository)
}
