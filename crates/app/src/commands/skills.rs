//! The `lesson skills` command.

use std::path::Path;

use anyhow::Result;
use lesson_core::model::{Skill, SkillStatus};
use services::{Clock, LessonService};

use super::load_storage;

pub async fn execute(curriculum: Option<&Path>) -> Result<()> {
    let storage = load_storage(curriculum)?;
    let svc = LessonService::from_storage(Clock::System, &storage);
    let skills = svc.list_skills().await?;
    let levels = svc.list_levels().await?;

    for level in &levels {
        println!(
            "Level {}: {} ({}% complete)",
            level.id,
            level.title,
            level.progress_percent(&skills)
        );
        for id in &level.skills {
            if let Some(skill) = skills.iter().find(|s| s.id() == id) {
                println!("  {}", skill_line(skill));
            }
        }
    }

    let unlisted: Vec<&Skill> = skills
        .iter()
        .filter(|s| !levels.iter().any(|l| l.skills.contains(s.id())))
        .collect();
    if !unlisted.is_empty() {
        println!("Other skills:");
        for skill in unlisted {
            println!("  {}", skill_line(skill));
        }
    }

    println!("\nTotal points: {}", svc.total_points().await?);
    Ok(())
}

fn skill_line(skill: &Skill) -> String {
    let status = match skill.status() {
        SkillStatus::Locked => "locked",
        SkillStatus::Available => "available",
        SkillStatus::Completed => "completed",
    };
    match skill.score() {
        Some(score) if skill.is_completed() => {
            format!("{:<20} {:<10} {} ({score} pts)", skill.id().as_str(), status, skill.title())
        }
        _ => format!("{:<20} {:<10} {}", skill.id().as_str(), status, skill.title()),
    }
}
