#![forbid(unsafe_code)]

pub mod json;
pub mod repository;
pub mod seed;

pub use json::{CurriculumBundle, LessonBundle, load_bundle};
pub use repository::{
    CurriculumRepository, HelpRepository, InMemoryRepository, Storage, StorageError,
};
