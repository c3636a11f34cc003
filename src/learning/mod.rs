//! Learning page: lesson navigation and the per-module quiz.

#[cfg(feature = "desktop")]
pub(crate) mod commands;
pub mod controller;
pub mod quiz;
pub mod view;

pub use controller::LearningController;
pub use quiz::{AnswerOutcome, QuizAction, QuizView};
pub use view::LearningModuleView;
