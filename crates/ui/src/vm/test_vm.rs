use learn_core::AnswerCollector;
use learn_core::model::{AnswerValue, OptionId, Question, QuestionKind, TestQuestions};
use services::{SubmissionState, TestSession};

use crate::views::{ViewState, view_state_from_request};

const DEFAULT_PLACEHOLDER: &str = "Type your answer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerInputVm {
    Single(Vec<OptionVm>),
    Multiple(Vec<OptionVm>),
    Text { placeholder: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub number: usize,
    pub question_id: String,
    pub prompt: String,
    pub points_label: String,
    pub input: AnswerInputVm,
    pub answered: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestVm {
    pub title: String,
    pub questions: Vec<QuestionVm>,
    pub answered: usize,
    pub total: usize,
    pub can_submit: bool,
    pub submit_label: &'static str,
    /// Why submitting is not possible right now, if it is not.
    pub blocking_message: Option<String>,
    /// Outcome of the last failed submit.
    pub notice: Option<String>,
}

impl TestVm {
    #[must_use]
    pub fn from_session(session: &TestSession) -> Self {
        Self::from_parts(session, &session.state())
    }

    fn from_parts(session: &TestSession, submission: &SubmissionState) -> Self {
        let answers = session.answers();
        let (submitting, graded, notice) = match view_state_from_request(submission, |_| ()) {
            ViewState::Idle => (false, false, None),
            ViewState::Loading => (true, false, None),
            ViewState::Ready(()) => (false, true, None),
            ViewState::Error(err) => (false, false, Some(err.notice())),
        };
        let mut vm = Self::build(session.questions(), &answers, submitting);
        vm.title = format!("{}: test", session.module_id());
        vm.notice = notice;
        if graded {
            vm.can_submit = false;
            vm.blocking_message = Some("This attempt has been graded.".to_string());
        }
        vm
    }

    fn build(questions: &TestQuestions, answers: &AnswerCollector, submitting: bool) -> Self {
        let items: Vec<QuestionVm> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| map_question(index + 1, question, answers))
            .collect();
        let total = items.len();
        let answered = items.iter().filter(|q| q.answered).count();
        let missing = total - answered;

        let blocking_message = if submitting {
            Some("Submitting...".to_string())
        } else if missing > 0 {
            Some(format!("Answer all questions before submitting ({missing} left)"))
        } else {
            None
        };

        Self {
            title: String::new(),
            questions: items,
            answered,
            total,
            can_submit: !submitting && missing == 0,
            submit_label: if submitting { "Submitting..." } else { "Submit test" },
            blocking_message,
            notice: None,
        }
    }
}

fn map_question(number: usize, question: &Question, answers: &AnswerCollector) -> QuestionVm {
    let current = answers.get(&question.id);
    let input = match &question.kind {
        QuestionKind::SingleChoice { .. } => AnswerInputVm::Single(option_vms(question, |id| {
            matches!(current, Some(AnswerValue::Choice(chosen)) if chosen == id)
        })),
        QuestionKind::MultipleChoice { .. } => AnswerInputVm::Multiple(option_vms(question, |id| {
            matches!(current, Some(AnswerValue::Choices(chosen)) if chosen.contains(id))
        })),
        QuestionKind::TextInput { placeholder } => AnswerInputVm::Text {
            placeholder: placeholder
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            value: match current {
                Some(AnswerValue::Text(text)) => text.clone(),
                _ => String::new(),
            },
        },
    };

    let points_label = if question.points == 1 {
        "1 point".to_string()
    } else {
        format!("{} points", question.points)
    };

    QuestionVm {
        number,
        question_id: question.id.to_string(),
        prompt: question.prompt.clone(),
        points_label,
        input,
        answered: current.is_some_and(|value| !value.is_empty()),
    }
}

fn option_vms(question: &Question, selected: impl Fn(&OptionId) -> bool) -> Vec<OptionVm> {
    question
        .options()
        .iter()
        .map(|option| OptionVm {
            id: option.id.to_string(),
            text: option.text.clone(),
            selected: selected(&option.id),
        })
        .collect()
}
