use lesson_core::model::{Exercise, ExerciseBody, HelpEntry, LearningSection, Stage, StageStatus};
use services::{FlowProgress, LessonMachine, TestOutcome};

use crate::input::right_choices;

pub fn header(machine: &LessonMachine) {
    let steps: Vec<String> = machine
        .statuses()
        .iter()
        .map(|(stage, status)| format!("{} {}", marker(*status), stage))
        .collect();
    println!("\n{}", steps.join("  →  "));
    if let Some(score) = machine.progress().test_score {
        println!("Last test score: {score}");
    }
}

fn marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Completed => "[✓]",
        StageStatus::Current => "[•]",
        StageStatus::Locked => "[🔒]",
        StageStatus::Upcoming => "[ ]",
    }
}

pub fn section(index: usize, total: usize, section: &LearningSection, visited: bool) {
    let seen = if visited { " ✓" } else { "" };
    println!("\n── {} ({}/{}){seen} ──", section.title, index + 1, total);
    if let Some(subtitle) = &section.subtitle {
        println!("{subtitle}");
    }
    println!("{}", section.explanation);
    for example in &section.examples {
        println!("  • {example}");
    }
    if let Some(visual) = &section.visual {
        match &section.visual_caption {
            Some(caption) => println!("\n    {visual}\n    {caption}"),
            None => println!("\n    {visual}"),
        }
    }
}

pub fn exercise(stage: Stage, progress: FlowProgress, exercise: &Exercise) {
    println!(
        "\n{stage} {}/{} [{}%]",
        progress.position, progress.total, progress.percent
    );
    println!("{}", exercise.question());
    match exercise.body() {
        ExerciseBody::SingleSelect { options, .. } => {
            numbered(options.iter().map(String::as_str));
            println!("(type one number)");
        }
        ExerciseBody::MultipleSelect { options, .. } => {
            numbered(options.iter().map(String::as_str));
            println!("(type every number that applies, e.g. 1 3)");
        }
        ExerciseBody::Construct {
            available_blocks, ..
        } => {
            numbered(available_blocks.iter().map(String::as_str));
            println!("(type block numbers in reading order, e.g. 4 3 2 1)");
        }
        ExerciseBody::MatchPairs { pairs } => {
            println!("Left:");
            numbered(pairs.iter().map(|p| p.left.as_str()));
            println!("Right:");
            numbered(right_choices(pairs).into_iter());
            println!("(type left-right pairs, e.g. 1-2 2-1)");
        }
        ExerciseBody::SortBoxes {
            items, categories, ..
        } => {
            println!("Items:");
            numbered(items.iter().map(String::as_str));
            println!("Boxes:");
            numbered(categories.iter().map(String::as_str));
            println!("(type item:box, e.g. 1:1 2:2)");
        }
    }
}

fn numbered<'a>(values: impl Iterator<Item = &'a str>) {
    for (i, value) in values.enumerate() {
        println!("  {}. {value}", i + 1);
    }
}

pub fn help(entry: &HelpEntry) {
    println!("\n── Help ──");
    println!("{}", entry.theory);
    for example in &entry.examples {
        println!("  • {example}");
    }
}

pub fn outcome(outcome: &TestOutcome, pass_mark: u32) {
    println!("\nScore: {}/{}", outcome.score, outcome.total);
    for (i, result) in outcome.results.iter().enumerate() {
        let mark = if result.correct { "✓" } else { "✗" };
        println!("  {mark} Question {}", i + 1);
    }
    if outcome.passed {
        println!("Passed. Skill mastered!");
    } else {
        println!("You need {pass_mark} correct answers to pass. Back to practice.");
    }
}
