use lesson_core::model::{ExerciseKind, HelpKey, SkillId, SkillStatus};
use storage::repository::{CurriculumRepository, HelpRepository};
use storage::seed::{DEFAULT_SKILL, builtin_repository};

#[tokio::test]
async fn builtin_curriculum_validates() {
    let repo = builtin_repository().unwrap();
    let skills = repo.list_skills().await.unwrap();
    assert!(skills.iter().any(|s| s.id().as_str() == DEFAULT_SKILL));
    assert_eq!(repo.list_levels().await.unwrap().len(), 2);
}

#[tokio::test]
async fn basic_reading_has_five_canonical_exercises_of_every_kind() {
    let repo = builtin_repository().unwrap();
    let id = SkillId::new(DEFAULT_SKILL);
    let exercises = repo.exercises(&id).await.unwrap();
    assert_eq!(exercises.len(), 5);

    let kinds: Vec<ExerciseKind> = exercises.iter().map(|e| e.kind()).collect();
    for kind in [
        ExerciseKind::SingleSelect,
        ExerciseKind::MultipleSelect,
        ExerciseKind::SortBoxes,
        ExerciseKind::Construct,
        ExerciseKind::MatchPairs,
    ] {
        assert!(kinds.contains(&kind), "missing {kind}");
    }

    let extra = repo.supplementary_exercises(&id).await.unwrap();
    assert_eq!(extra.len(), 3);
    let learning = repo.learning_content(&id).await.unwrap().unwrap();
    assert_eq!(learning.section_count(), 2);
}

#[tokio::test]
async fn every_referenced_help_key_has_a_topic() {
    let repo = builtin_repository().unwrap();
    let topics = repo.help_topics().await.unwrap();
    let known: Vec<&HelpKey> = topics.iter().map(|t| &t.key).collect();

    for skill in repo.list_skills().await.unwrap() {
        let mut all = repo.exercises(skill.id()).await.unwrap();
        all.extend(repo.supplementary_exercises(skill.id()).await.unwrap());
        for exercise in all {
            if let Some(key) = exercise.help_key() {
                assert!(known.contains(&key), "no help topic for {key}");
            }
        }
    }
    assert!(repo.default_help().await.unwrap().is_some());
}

#[tokio::test]
async fn letter_recognition_is_already_mastered() {
    let repo = builtin_repository().unwrap();
    let skill = repo
        .get_skill(&SkillId::new("letter-recognition"))
        .await
        .unwrap();
    assert_eq!(skill.status(), SkillStatus::Completed);
    assert_eq!(skill.score(), Some(95));
}
