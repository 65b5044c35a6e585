#![forbid(unsafe_code)]

pub mod collector;
pub mod model;
pub mod time;

pub use collector::AnswerCollector;
pub use time::Clock;
