//! The `lesson validate` command.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use lesson_core::model::{DEFAULT_PASS_MARK, HelpKey};
use storage::repository::{CurriculumRepository, HelpRepository};

use super::load_repository;

pub async fn execute(curriculum: Option<&Path>) -> Result<()> {
    // Exercise definitions are validated while loading.
    let repo = load_repository(curriculum)?;

    let known: HashSet<HelpKey> = repo
        .help_topics()
        .await?
        .into_iter()
        .map(|topic| topic.key)
        .collect();
    let has_default_help = repo.default_help().await?.is_some();

    let mut warnings = Vec::new();
    let skills = repo.list_skills().await?;
    for skill in &skills {
        let exercises = repo.exercises(skill.id()).await?;
        let supplementary = repo.supplementary_exercises(skill.id()).await?;
        let sections = repo
            .learning_content(skill.id())
            .await?
            .map_or(0, |content| content.section_count());
        println!(
            "Skill {}: {} exercises, {} supplementary, {} learning sections",
            skill.id(),
            exercises.len(),
            supplementary.len(),
            sections
        );

        if exercises.is_empty() {
            continue;
        }
        if exercises.len() < usize::try_from(DEFAULT_PASS_MARK).unwrap_or(usize::MAX) {
            warnings.push(format!(
                "[{}] only {} exercises; the default pass mark of {DEFAULT_PASS_MARK} is unreachable",
                skill.id(),
                exercises.len()
            ));
        }
        for exercise in exercises.iter().chain(&supplementary) {
            if let Some(key) = exercise.help_key() {
                if !known.contains(key) {
                    warnings.push(format!(
                        "[{}/{}] help key {key} has no topic and falls back to the default",
                        skill.id(),
                        exercise.id()
                    ));
                }
            }
        }
    }
    if !has_default_help {
        warnings.push("no default help entry; a generic one will be shown".to_owned());
    }

    for warning in &warnings {
        println!("  WARNING: {warning}");
    }
    if warnings.is_empty() {
        println!("Curriculum valid ({} skills).", skills.len());
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }
    Ok(())
}
