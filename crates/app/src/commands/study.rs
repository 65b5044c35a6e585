//! The `learn study` command: an interactive lesson and test loop.

use anyhow::{Context, Result};
use learn_core::model::ModuleId;
use services::LearnerSession;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing::info;
use ui::views::{ViewError, render_lesson, render_result, render_test};
use ui::vm::{StudyScreen, StudyVm};

use super::view_failure;

const LESSON_HELP: &str = "Enter n for the next lesson, q to quit.";
const TEST_HELP: &str =
    "Enter `<number> <answer>`, `t <number> <option>` to toggle, s to submit, q to quit.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Next,
    Answer { number: usize, value: String },
    Toggle { number: usize, option: String },
    Submit,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" | "n" | "next" => return Input::Next,
        "s" | "submit" => return Input::Submit,
        "q" | "quit" => return Input::Quit,
        _ => {}
    }

    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    if head == "t" {
        let (number, option) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        return match number.parse() {
            Ok(number) if !option.trim().is_empty() => Input::Toggle {
                number,
                option: option.trim().to_string(),
            },
            _ => Input::Unknown,
        };
    }
    match head.parse() {
        Ok(number) => Input::Answer {
            number,
            value: rest.to_string(),
        },
        Err(_) => Input::Unknown,
    }
}

fn show(screen: &StudyScreen) {
    match screen {
        StudyScreen::Lesson(lesson) => {
            print!("{}", render_lesson(lesson));
            println!("{LESSON_HELP}");
        }
        StudyScreen::Test(test) => {
            print!("{}", render_test(test));
            println!("{TEST_HELP}");
        }
        StudyScreen::Result(result) => print!("{}", render_result(result)),
    }
}

pub async fn execute(session: LearnerSession, module_id: ModuleId) -> Result<()> {
    let mut study = StudyVm::new(session, module_id);
    let mut screen = study.start().await.map_err(|err| view_failure(&err))?;
    let mut lines = BufReader::new(stdin()).lines();

    loop {
        show(&screen);
        if matches!(screen, StudyScreen::Result(_)) {
            return Ok(());
        }

        let Some(line) = lines.next_line().await.context("reading input")? else {
            return Ok(());
        };
        let in_test = matches!(screen, StudyScreen::Test(_));
        let outcome = match parse_input(&line) {
            Input::Quit => {
                info!(module_id = %study.module_id(), "leaving study session");
                return Ok(());
            }
            Input::Next if !in_test => study.next().await,
            Input::Submit if in_test => study.submit().await,
            Input::Answer { number, value } if in_test => {
                study.answer(number, &value).map(StudyScreen::Test)
            }
            Input::Toggle { number, option } if in_test => {
                study.toggle(number, &option).map(StudyScreen::Test)
            }
            _ => {
                println!("{}", if in_test { TEST_HELP } else { LESSON_HELP });
                continue;
            }
        };

        match outcome {
            Ok(next) => screen = next,
            Err(ViewError::ReturnToDashboard(message)) => {
                println!("{message}");
                println!("Run `learn modules` to see your dashboard.");
                return Ok(());
            }
            Err(err) => {
                let notice = err.notice();
                match study
                    .screen()
                    .filter(|current| current.notice() == Some(notice.as_str()))
                {
                    Some(current) => screen = current,
                    None => println!("{notice}"),
                }
            }
        }
    }
}
