//! Contract tests for the `CourseStore` port, driven through the in-memory
//! adapter. The Postgres adapter implements the same contract; these tests
//! pin down the semantics that both must share: ordering, stub creation,
//! idempotent saves, self-inverse completion toggling, and authorized
//! cascading deletes.

use api_lib::adapters::InMemoryStore;
use coursecraft_core::domain::{ContentBlock, CourseOutline, LessonBody, LessonPatch, ModuleOutline};
use coursecraft_core::ports::{CourseStore, PortError};
use uuid::Uuid;

fn graph_theory_outline() -> CourseOutline {
    CourseOutline {
        title: "Intro to Graph Theory".to_string(),
        description: "Vertices, edges, and what to do with them.".to_string(),
        tags: vec!["math".to_string(), "graphs".to_string()],
        modules: vec![
            ModuleOutline {
                title: "Foundations".to_string(),
                lessons: vec![
                    "Vertices and Edges".to_string(),
                    "Degree".to_string(),
                    "Paths".to_string(),
                ],
            },
            ModuleOutline {
                title: "Trees".to_string(),
                lessons: vec![
                    "Definitions".to_string(),
                    "Traversals".to_string(),
                    "Spanning Trees".to_string(),
                ],
            },
        ],
    }
}

fn sample_body() -> LessonBody {
    LessonBody {
        title: None,
        objectives: vec!["Define a walk".to_string()],
        content: vec![
            ContentBlock::Heading {
                text: "Walks".to_string(),
            },
            ContentBlock::Paragraph {
                text: "A walk alternates vertices and edges.".to_string(),
            },
        ],
    }
}

#[tokio::test]
async fn create_preserves_outline_order_and_creates_stub_lessons() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();

    assert_eq!(course.creator, "user-1");
    assert_eq!(course.modules.len(), 2);
    assert_eq!(course.modules[0].order_index, 0);
    assert_eq!(course.modules[1].order_index, 1);
    assert_eq!(course.modules[0].title, "Foundations");
    assert_eq!(course.modules[1].title, "Trees");

    for (module, expected_titles) in course.modules.iter().zip([
        ["Vertices and Edges", "Degree", "Paths"],
        ["Definitions", "Traversals", "Spanning Trees"],
    ]) {
        assert_eq!(module.lessons.len(), 3);
        for (lesson, expected) in module.lessons.iter().zip(expected_titles) {
            assert_eq!(lesson.title, expected);
            assert!(lesson.content.is_empty(), "stub lessons start empty");
            assert!(!lesson.is_enriched);
        }
    }

    // The same order must come back from a fresh read.
    let reread = store.get_course(course.id).await.unwrap();
    let module_titles: Vec<&str> = reread.modules.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(module_titles, ["Foundations", "Trees"]);
}

#[tokio::test]
async fn toggle_lesson_complete_is_self_inverse() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();
    let lesson_id = course.modules[0].lessons[0].id;

    assert!(store.toggle_lesson_complete("user-1", lesson_id).await.unwrap());
    assert!(!store.toggle_lesson_complete("user-1", lesson_id).await.unwrap());
    assert!(store.toggle_lesson_complete("user-1", lesson_id).await.unwrap());

    // Another owner's set is independent.
    assert!(store.toggle_lesson_complete("user-2", lesson_id).await.unwrap());
}

#[tokio::test]
async fn delete_by_non_creator_is_rejected_and_leaves_the_hierarchy() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();
    let lesson_id = course.modules[1].lessons[2].id;

    let err = store.delete_course(course.id, "mallory").await.unwrap_err();
    assert!(matches!(err, PortError::Unauthorized));

    let still_there = store.get_course(course.id).await.unwrap();
    assert_eq!(still_there.modules.len(), 2);
    assert!(store.get_lesson(lesson_id).await.is_ok());
}

#[tokio::test]
async fn delete_by_creator_cascades_to_modules_and_lessons() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();
    let module_id = course.modules[0].id;
    let lesson_id = course.modules[0].lessons[0].id;

    store.delete_course(course.id, "user-1").await.unwrap();

    assert!(matches!(
        store.get_course(course.id).await.unwrap_err(),
        PortError::NotFound(_)
    ));
    assert!(matches!(
        store.get_module(module_id).await.unwrap_err(),
        PortError::NotFound(_)
    ));
    assert!(matches!(
        store.get_lesson(lesson_id).await.unwrap_err(),
        PortError::NotFound(_)
    ));
}

#[tokio::test]
async fn save_course_is_idempotent_and_unsave_removes() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "author")
        .await
        .unwrap();

    store.save_course("reader", course.id).await.unwrap();
    store.save_course("reader", course.id).await.unwrap();

    let saved = store.get_course(course.id).await.unwrap().saved_by;
    assert_eq!(saved.iter().filter(|o| *o == "reader").count(), 1);

    let listed = store.list_saved("reader").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, course.id);

    store.unsave_course("reader", course.id).await.unwrap();
    store.unsave_course("reader", course.id).await.unwrap();
    assert!(store.list_saved("reader").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_courses_returns_only_the_owners_newest_first() {
    let store = InMemoryStore::new();
    let first = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();
    let mut second_outline = graph_theory_outline();
    second_outline.title = "Advanced Graph Theory".to_string();
    let second = store
        .create_course_with_structure(&second_outline, "user-1")
        .await
        .unwrap();
    store
        .create_course_with_structure(&graph_theory_outline(), "user-2")
        .await
        .unwrap();

    let listed = store.list_courses("user-1").await.unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn apply_generated_lesson_enriches_and_regeneration_overwrites() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();
    let lesson_id = course.modules[0].lessons[0].id;

    let enriched = store
        .apply_generated_lesson(lesson_id, &sample_body())
        .await
        .unwrap();
    assert!(enriched.is_enriched);
    assert_eq!(enriched.content.len(), 2);
    assert_eq!(enriched.objectives, vec!["Define a walk".to_string()]);

    let replacement = LessonBody {
        title: None,
        objectives: vec!["Revised objective".to_string()],
        content: vec![ContentBlock::Paragraph {
            text: "Second take.".to_string(),
        }],
    };
    let regenerated = store
        .apply_generated_lesson(lesson_id, &replacement)
        .await
        .unwrap();
    assert!(regenerated.is_enriched);
    assert_eq!(regenerated.content.len(), 1);
    assert_eq!(regenerated.objectives, vec!["Revised objective".to_string()]);
}

#[tokio::test]
async fn update_lesson_patches_only_the_given_fields() {
    let store = InMemoryStore::new();
    let course = store
        .create_course_with_structure(&graph_theory_outline(), "user-1")
        .await
        .unwrap();
    let lesson_id = course.modules[0].lessons[1].id;
    store
        .apply_generated_lesson(lesson_id, &sample_body())
        .await
        .unwrap();

    let patched = store
        .update_lesson(
            lesson_id,
            LessonPatch {
                title: Some("Degree, revisited".to_string()),
                ..LessonPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.title, "Degree, revisited");
    assert_eq!(patched.content.len(), 2, "content untouched by a title patch");

    let translated = store
        .update_lesson(
            lesson_id,
            LessonPatch {
                translation: Some("Degree ka matlab...".to_string()),
                ..LessonPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(translated.translation, "Degree ka matlab...");
    assert_eq!(translated.title, "Degree, revisited");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let store = InMemoryStore::new();
    assert!(matches!(
        store.get_course(Uuid::new_v4()).await.unwrap_err(),
        PortError::NotFound(_)
    ));
    assert!(matches!(
        store.toggle_lesson_complete("user-1", Uuid::new_v4()).await.unwrap_err(),
        PortError::NotFound(_)
    ));
    assert!(matches!(
        store.save_course("user-1", Uuid::new_v4()).await.unwrap_err(),
        PortError::NotFound(_)
    ));
}
