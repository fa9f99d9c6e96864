//! The `lesson run` command: an interactive lesson on stdin/stdout.

use std::io::{self, BufRead, Lines, StdinLock, Write};
use std::path::Path;

use anyhow::{Context, Result};
use lesson_core::Clock;
use lesson_core::model::{LessonSettingsDraft, SkillId, Stage};
use services::{Lesson, LessonError, LessonService, PracticeState, PracticeStep};
use tracing::debug;

use super::load_storage;
use crate::{input, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Done,
    Quit,
}

struct Prompt {
    lines: Lines<StdinLock<'static>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: io::stdin().lock().lines(),
        }
    }

    /// `None` once stdin is closed.
    fn ask(&mut self, text: &str) -> Result<Option<String>> {
        print!("{text} ");
        io::stdout().flush()?;
        match self.lines.next() {
            Some(line) => Ok(Some(line?.trim().to_owned())),
            None => Ok(None),
        }
    }
}

pub async fn execute(
    curriculum: Option<&Path>,
    skill: &str,
    pass_mark: Option<u32>,
    keep_practicing: bool,
) -> Result<()> {
    let settings = LessonSettingsDraft {
        pass_mark,
        keep_practicing_enabled: Some(keep_practicing),
    }
    .validate()
    .context("invalid lesson settings")?;
    let skill_id: SkillId = skill.parse().context("invalid skill id")?;

    let storage = load_storage(curriculum)?;
    let svc = LessonService::from_storage(Clock::System, &storage).with_settings(settings);
    let mut lesson = svc
        .open_lesson(&skill_id)
        .await
        .with_context(|| format!("opening skill {skill_id}"))?;

    println!("{}", lesson.skill().title());
    if !lesson.skill().description().is_empty() {
        println!("{}", lesson.skill().description());
    }

    let mut prompt = Prompt::new();
    loop {
        render::header(lesson.machine());
        let control = match lesson.active_stage() {
            Stage::Learn => learn(&mut lesson, &mut prompt)?,
            Stage::Practice => practice(&mut lesson, &mut prompt)?,
            Stage::Test => test(&mut lesson, &mut prompt)?,
        };
        debug!(?control, stage = %lesson.active_stage(), "stage finished");
        match control {
            Control::Continue => {}
            Control::Done | Control::Quit => break,
        }
    }
    Ok(())
}

//
// ─── LEARN ─────────────────────────────────────────────────────────────────────
//

fn learn(lesson: &mut Lesson, prompt: &mut Prompt) -> Result<Control> {
    let Some(content) = lesson.learning().cloned().filter(|c| !c.sections.is_empty()) else {
        lesson.skip_to_practice()?;
        return Ok(Control::Continue);
    };

    println!("\n{}", content.title);
    let total = content.sections.len();
    for (i, section) in content.sections.iter().enumerate() {
        let visited = lesson.learning_tracker().is_some_and(|t| t.is_visited(i));
        render::section(i, total, section, visited);
        let reply = prompt.ask("[enter] continue, s: skip to practice, q: quit >")?;
        match reply.as_deref() {
            None | Some("q") => return Ok(Control::Quit),
            Some("s") => {
                lesson.skip_to_practice()?;
                return Ok(Control::Continue);
            }
            Some(_) => {
                lesson.visit_section(i)?;
            }
        }
    }
    Ok(Control::Continue)
}

//
// ─── PRACTICE ──────────────────────────────────────────────────────────────────
//

fn practice(lesson: &mut Lesson, prompt: &mut Prompt) -> Result<Control> {
    loop {
        let Some(session) = lesson.practice() else {
            return Ok(Control::Continue);
        };
        let state = session.state();
        let progress = session.progress();
        let exercise = session
            .current_exercise()
            .cloned()
            .context("practice has no current exercise")?;

        match state {
            PracticeState::Presenting { .. } | PracticeState::AwaitingSubmit { .. } => {
                render::exercise(Stage::Practice, progress, &exercise);
                match prompt.ask("answer (?: help, q: quit) >")?.as_deref() {
                    None | Some("q") => return Ok(Control::Quit),
                    Some("?") => show_help(lesson, prompt)?,
                    Some(text) => match input::parse_answer(&exercise, text) {
                        Ok(answer) => {
                            lesson.record_answer(answer)?;
                            let evaluation = lesson.submit_practice()?;
                            let mark = if evaluation.correct { "✓" } else { "✗" };
                            println!("{mark} {}", evaluation.message);
                        }
                        Err(e) => println!("  {e:#}"),
                    },
                }
            }
            PracticeState::Feedback { correct: true, .. } => {
                match prompt.ask("[enter] next, q: quit >")?.as_deref() {
                    None | Some("q") => return Ok(Control::Quit),
                    Some(_) => {
                        if lesson.next_exercise()? == PracticeStep::Completed {
                            println!("\nPractice complete!");
                        }
                    }
                }
            }
            PracticeState::Feedback { correct: false, .. } => {
                if let Some(hint) = exercise.feedback().and_then(|f| f.hint.as_deref()) {
                    println!("Hint: {hint}");
                }
                match prompt.ask("[enter] try again, ?: help, q: quit >")?.as_deref() {
                    None | Some("q") => return Ok(Control::Quit),
                    Some("?") => show_help(lesson, prompt)?,
                    Some(_) => lesson.try_again()?,
                }
            }
            PracticeState::HelpOpen { .. } => lesson.close_help()?,
            PracticeState::Completed => {
                let menu = if lesson.settings().keep_practicing_enabled() {
                    "t: take the test, k: keep practicing, l: review the lesson, q: quit >"
                } else {
                    "t: take the test, l: review the lesson, q: quit >"
                };
                match prompt.ask(menu)?.as_deref() {
                    None | Some("q") => return Ok(Control::Quit),
                    Some("t") => {
                        lesson.start_test()?;
                        return Ok(Control::Continue);
                    }
                    Some("k") => match lesson.keep_practicing() {
                        Ok(_) => println!("Here are a few more exercises."),
                        Err(LessonError::Flow(e)) => println!("  {e}"),
                        Err(e) => return Err(e.into()),
                    },
                    Some("l") => {
                        lesson.select_stage(Stage::Learn)?;
                        return Ok(Control::Continue);
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

fn show_help(lesson: &mut Lesson, prompt: &mut Prompt) -> Result<()> {
    render::help(lesson.open_help()?);
    let _ = prompt.ask("[enter] close help >")?;
    lesson.close_help()?;
    Ok(())
}

//
// ─── TEST ──────────────────────────────────────────────────────────────────────
//

fn test(lesson: &mut Lesson, prompt: &mut Prompt) -> Result<Control> {
    let pass_mark = lesson.settings().pass_mark();
    println!("\nTest: answer every question, then submit. You need {pass_mark} correct to pass.");
    loop {
        let Some(session) = lesson.test() else {
            return Ok(Control::Continue);
        };
        if let Some(outcome) = session.outcome() {
            render::outcome(outcome, pass_mark);
            return Ok(Control::Done);
        }
        let index = session.current_index();
        let total = session.total();
        let answered = session.answer().is_some();
        let progress = session.progress();
        let exercise = session
            .current_exercise()
            .cloned()
            .context("test has no current exercise")?;

        render::exercise(Stage::Test, progress, &exercise);
        if answered {
            println!("(answered; typing a new answer replaces it)");
        }
        let reply = prompt.ask("answer, n: next, p: previous, s: submit, q: quit >")?;
        let result = match reply.as_deref() {
            None | Some("q") => return Ok(Control::Quit),
            Some("n") => lesson.test_next().map(|_| ()),
            Some("p") => lesson.test_previous().map(|_| ()),
            Some("s") => match lesson.submit_test() {
                Ok(outcome) => {
                    render::outcome(&outcome, pass_mark);
                    return Ok(if outcome.passed {
                        Control::Done
                    } else {
                        Control::Continue
                    });
                }
                Err(e) => Err(e),
            },
            Some(text) => match input::parse_answer(&exercise, text) {
                Ok(answer) => lesson.record_answer(answer).and_then(|()| {
                    if index + 1 < total {
                        lesson.test_next().map(|_| ())
                    } else {
                        Ok(())
                    }
                }),
                Err(e) => {
                    println!("  {e:#}");
                    Ok(())
                }
            },
        };
        match result {
            Ok(()) => {}
            Err(LessonError::Flow(e)) => println!("  {e}"),
            Err(e) => return Err(e.into()),
        }
    }
}
