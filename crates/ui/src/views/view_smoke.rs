use learn_core::model::{AnswerValue, ModuleId, Question, QuestionOption};
use services::{ApiError, DashboardService, Endpoint, InMemoryLms, LearnerSession, ModuleFixture};

use super::{render_dashboard, render_lesson, render_result, render_test};
use crate::vm::{DashboardVm, StudyScreen, StudyVm};

fn lms() -> InMemoryLms {
    InMemoryLms::new()
        .with_module(
            ModuleFixture::new("Module_01", "Ownership")
                .lesson("# Moves\n\nValues have **one** owner.")
                .question(
                    Question::single_choice(
                        "q1",
                        "Who owns a value?",
                        vec![QuestionOption::new("A", "Everyone"), QuestionOption::new("B", "One owner")],
                    ),
                    AnswerValue::choice("B"),
                )
                .question(
                    Question::text_input("q2", "Name the checker", None),
                    AnswerValue::text("borrow checker"),
                ),
        )
        .with_module(ModuleFixture::new("Module_02", "Traits").lesson("# Traits"))
}

#[tokio::test(flavor = "current_thread")]
async fn study_screens_render_in_order() {
    let lms = lms();
    let mut study = StudyVm::new(
        LearnerSession::in_memory(lms.clone()),
        ModuleId::new("Module_01"),
    );

    let StudyScreen::Lesson(lesson) = study.start().await.unwrap() else {
        panic!("expected lesson");
    };
    let text = render_lesson(&lesson);
    assert!(text.contains("Module_01: lesson 1 of 1"), "{text}");
    assert!(text.contains("Progress: 1 of 1"), "{text}");
    assert!(text.contains("Values have one owner."), "{text}");
    assert!(text.contains("[n] Finish lessons"), "{text}");

    let StudyScreen::Test(test) = study.next().await.unwrap() else {
        panic!("expected test");
    };
    let text = render_test(&test);
    assert!(text.contains("1. Who owns a value? (1 point)"), "{text}");
    assert!(text.contains("( ) B) One owner"), "{text}");
    assert!(text.contains("> Type your answer"), "{text}");
    assert!(text.contains("(2 left)"), "{text}");

    study.answer(1, "B").unwrap();
    let test = study.answer(2, "Something else").unwrap();
    let text = render_test(&test);
    assert!(text.contains("(*) B) One owner"), "{text}");
    assert!(text.contains("[s] Submit test"), "{text}");

    let StudyScreen::Result(result) = study.submit().await.unwrap() else {
        panic!("expected result");
    };
    let text = render_result(&result);
    assert!(text.contains("Test not passed"), "{text}");
    assert!(text.contains("Grade: 5/10"), "{text}");
    assert!(text.contains("1 of 2 correct (50%)"), "{text}");
    assert!(text.contains("2. q2 ✗ Incorrect"), "{text}");
    assert!(text.contains("Back to dashboard"), "{text}");
    assert!(!text.contains("unlocked"), "{text}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_lists_modules_with_actions() {
    let lms = lms();
    let mut study = StudyVm::new(
        LearnerSession::in_memory(lms.clone()),
        ModuleId::new("Module_01"),
    );
    study.start().await.unwrap();

    let dashboard = DashboardService::new(LearnerSession::in_memory(lms))
        .load()
        .await
        .unwrap();
    let text = render_dashboard(&DashboardVm::from_dashboard(&dashboard));
    assert!(text.contains("Module_01  Ownership  [In progress]"), "{text}");
    assert!(text.contains("-> Continue"), "{text}");
    assert!(text.contains("Module_02  Traits  [Not started]"), "{text}");
    assert!(text.contains("-> Start module"), "{text}");
    assert!(text.contains("Average grade: N/A"), "{text}");
}

#[tokio::test(flavor = "current_thread")]
async fn failed_next_lesson_renders_a_notice_above_the_action() {
    let lms = lms();
    let mut study = StudyVm::new(
        LearnerSession::in_memory(lms.clone()),
        ModuleId::new("Module_01"),
    );
    study.start().await.unwrap();
    lms.fail_next(Endpoint::NextContent, ApiError::Network("reset".into()));
    study.next().await.unwrap_err();

    let Some(StudyScreen::Lesson(lesson)) = study.screen() else {
        panic!("expected lesson");
    };
    let text = render_lesson(&lesson);
    let notice = lesson.notice.clone().unwrap();
    assert!(text.ends_with(&format!("{notice}\n[n] Finish lessons\n")), "{text}");
    assert!(text.starts_with("Module_01: lesson 1 of 1\nProgress: 1 of 1\n"), "{text}");
}
