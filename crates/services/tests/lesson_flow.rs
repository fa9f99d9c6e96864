use std::sync::Arc;

use async_trait::async_trait;
use lesson_core::model::{
    Answer, Exercise, ExerciseBody, HelpEntry, HelpTopic, LearningContent, LessonSettingsDraft,
    Level, LevelId, Skill, SkillId, SkillStatus, Stage,
};
use lesson_core::time::fixed_now;
use services::{Clock, FlowError, LessonError, LessonService, PracticeStep};
use storage::repository::{CurriculumRepository, HelpRepository, StorageError};
use storage::seed::{DEFAULT_SKILL, builtin_storage};

fn service() -> LessonService {
    let storage = builtin_storage().unwrap();
    LessonService::from_storage(Clock::fixed(fixed_now()), &storage)
}

fn correct_answer(exercise: &Exercise) -> Answer {
    match exercise.body() {
        ExerciseBody::SingleSelect { correct_answer, .. } => Answer::choice(correct_answer.clone()),
        ExerciseBody::MultipleSelect {
            correct_answers, ..
        } => Answer::choices(correct_answers.iter().rev().cloned()),
        ExerciseBody::Construct {
            correct_sequence, ..
        } => Answer::sequence(correct_sequence.iter().cloned()),
        ExerciseBody::MatchPairs { pairs } => Answer::pairs(
            pairs
                .iter()
                .rev()
                .map(|p| (p.left.clone(), p.right.clone())),
        ),
        ExerciseBody::SortBoxes {
            correct_placements, ..
        } => Answer::placements(
            correct_placements
                .iter()
                .map(|(category, items)| (category.clone(), items.clone())),
        ),
    }
}

fn wrong_answer(exercise: &Exercise) -> Answer {
    match exercise.body() {
        ExerciseBody::Construct {
            correct_sequence, ..
        } => Answer::sequence(correct_sequence.iter().rev().cloned()),
        _ => Answer::choice("?"),
    }
}

#[tokio::test]
async fn basic_reading_opens_in_learn() {
    let svc = service();
    let lesson = svc.open_lesson(&SkillId::new(DEFAULT_SKILL)).await.unwrap();
    assert_eq!(lesson.active_stage(), Stage::Learn);
    assert_eq!(lesson.learning_tracker().unwrap().section_count(), 2);
}

#[tokio::test]
async fn completed_skill_opens_in_practice() {
    let svc = service();
    let lesson = svc
        .open_lesson(&SkillId::new("letter-recognition"))
        .await
        .unwrap();
    assert_eq!(lesson.active_stage(), Stage::Practice);
    assert!(lesson.machine().progress().learn.completed());
    assert!(lesson.machine().progress().test.completed());
}

#[tokio::test]
async fn unknown_skill_is_reported() {
    let svc = service();
    let err = svc.open_lesson(&SkillId::new("ghost")).await.unwrap_err();
    assert!(matches!(err, LessonError::UnknownSkill(id) if id.as_str() == "ghost"));
}

#[tokio::test]
async fn full_lesson_with_a_wrong_answer_and_help() {
    let svc = service();
    let mut lesson = svc.open_lesson(&SkillId::new(DEFAULT_SKILL)).await.unwrap();
    lesson.visit_section(0).unwrap();
    assert_eq!(lesson.visit_section(1).unwrap(), Stage::Practice);

    // The construct exercise is answered wrong once before the right order.
    loop {
        let exercise = lesson.practice().unwrap().current_exercise().unwrap().clone();
        if exercise.id().as_str() == "4" {
            lesson.record_answer(wrong_answer(&exercise)).unwrap();
            assert!(!lesson.submit_practice().unwrap().correct);
            assert!(lesson.next_exercise().is_err());
            assert!(!lesson.open_help().unwrap().theory.is_empty());
            lesson.close_help().unwrap();
        }
        lesson.record_answer(correct_answer(&exercise)).unwrap();
        assert!(lesson.submit_practice().unwrap().correct);
        if lesson.next_exercise().unwrap() == PracticeStep::Completed {
            break;
        }
    }
    let attempts = lesson.practice().unwrap().attempts();
    assert_eq!(attempts.len(), 6);
    assert!(attempts.iter().any(|a| !a.correct));

    lesson.start_test().unwrap();
    let exercises: Vec<Exercise> = lesson.test().unwrap().exercises().to_vec();
    for (i, exercise) in exercises.iter().enumerate() {
        lesson.test_go_to(i).unwrap();
        lesson.record_answer(correct_answer(exercise)).unwrap();
    }
    let outcome = lesson.submit_test().unwrap();
    assert_eq!(outcome.score, 5);
    assert!(outcome.passed);
    assert!(lesson.is_mastered());
    assert_eq!(lesson.machine().progress().test_score, Some(5));
}

#[tokio::test]
async fn keep_practicing_uses_the_supplementary_set() {
    let svc = service();
    let mut lesson = svc.open_lesson(&SkillId::new(DEFAULT_SKILL)).await.unwrap();
    lesson.skip_to_practice().unwrap();
    for _ in 0..2 {
        loop {
            let exercise = lesson.practice().unwrap().current_exercise().unwrap().clone();
            lesson.record_answer(correct_answer(&exercise)).unwrap();
            lesson.submit_practice().unwrap();
            if lesson.next_exercise().unwrap() == PracticeStep::Completed {
                break;
            }
        }
        lesson.keep_practicing().unwrap();
    }
    let practice = lesson.practice().unwrap();
    assert_eq!(practice.total(), 11);
    assert_eq!(practice.current_exercise().unwrap().id().as_str(), "extra1");
    assert!(practice.answer().is_none());
}

#[tokio::test]
async fn custom_pass_mark_applies_to_the_test() {
    let settings = LessonSettingsDraft {
        pass_mark: Some(5),
        ..LessonSettingsDraft::default()
    }
    .validate()
    .unwrap();
    let svc = service().with_settings(settings);
    let mut lesson = svc
        .open_lesson(&SkillId::new("letter-recognition"))
        .await
        .unwrap();
    lesson.select_stage(Stage::Test).unwrap();

    let exercises: Vec<Exercise> = lesson.test().unwrap().exercises().to_vec();
    for (i, exercise) in exercises.iter().enumerate() {
        lesson.test_go_to(i).unwrap();
        let answer = if i == 0 {
            wrong_answer(exercise)
        } else {
            correct_answer(exercise)
        };
        lesson.record_answer(answer).unwrap();
    }
    let outcome = lesson.submit_test().unwrap();
    assert_eq!(outcome.score, 4);
    assert!(!outcome.passed);
    assert_eq!(lesson.active_stage(), Stage::Practice);
    assert!(matches!(
        lesson.test_next(),
        Err(LessonError::WrongStage { stage: Stage::Practice, .. })
    ));
}

#[tokio::test]
async fn total_points_sum_completed_skills() {
    let svc = service();
    assert_eq!(svc.total_points().await.unwrap(), 95);
    assert_eq!(svc.list_skills().await.unwrap().len(), 5);
}

//
// ─── EMPTY CURRICULUM ──────────────────────────────────────────────────────────
//

struct EmptyLessons;

#[async_trait]
impl CurriculumRepository for EmptyLessons {
    async fn list_skills(&self) -> Result<Vec<Skill>, StorageError> {
        Ok(vec![self.get_skill(&SkillId::new("empty")).await?])
    }

    async fn get_skill(&self, id: &SkillId) -> Result<Skill, StorageError> {
        Ok(Skill::new(id.clone(), "Empty", LevelId::new(1), 1, SkillStatus::Available)?)
    }

    async fn list_levels(&self) -> Result<Vec<Level>, StorageError> {
        Ok(Vec::new())
    }

    async fn exercises(&self, _id: &SkillId) -> Result<Vec<Exercise>, StorageError> {
        Ok(Vec::new())
    }

    async fn supplementary_exercises(&self, _id: &SkillId) -> Result<Vec<Exercise>, StorageError> {
        Ok(Vec::new())
    }

    async fn learning_content(
        &self,
        _id: &SkillId,
    ) -> Result<Option<LearningContent>, StorageError> {
        Ok(None)
    }
}

#[async_trait]
impl HelpRepository for EmptyLessons {
    async fn help_topics(&self) -> Result<Vec<HelpTopic>, StorageError> {
        Ok(Vec::new())
    }

    async fn default_help(&self) -> Result<Option<HelpEntry>, StorageError> {
        Ok(None)
    }
}

#[tokio::test]
async fn skill_without_exercises_fails_at_load() {
    let repo = Arc::new(EmptyLessons);
    let svc = LessonService::new(Clock::fixed(fixed_now()), repo.clone(), repo);
    let err = svc.open_lesson(&SkillId::new("empty")).await.unwrap_err();
    assert!(matches!(err, LessonError::NoExercises(_)));
    assert!(!matches!(err, LessonError::Flow(FlowError::Empty)));
}
