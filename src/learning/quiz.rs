use serde::{Deserialize, Serialize};

use crate::catalog::Mcq;

/// Result shown after an answer is submitted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_option: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Default)]
struct Attempt {
    selected: Option<usize>,
    submitted: bool,
}

/// Reader input on the quiz panel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuizAction {
    Select { option: usize },
    Submit,
    Reset,
    Next,
    Previous,
    GoTo { index: usize },
}

/// Per-module quiz progress: which question is showing, the in-progress
/// attempt for every question, and the recorded result of each.
#[derive(Debug, Clone)]
pub struct QuizSession {
    current: usize,
    attempts: Vec<Attempt>,
    answers: Vec<Option<bool>>,
}

impl QuizSession {
    pub fn new(question_count: usize) -> Self {
        Self {
            current: 0,
            attempts: vec![Attempt::default(); question_count],
            answers: vec![None; question_count],
        }
    }

    pub fn question_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn answers(&self) -> &[Option<bool>] {
        &self.answers
    }

    /// Applies one action. Returns false when it was ignored.
    pub fn apply(&mut self, action: QuizAction, mcqs: &[Mcq]) -> bool {
        match action {
            QuizAction::Select { option } => self.select(option, mcqs),
            QuizAction::Submit => self.submit(mcqs).is_some(),
            QuizAction::Reset => self.reset(),
            QuizAction::Next => self.go_to(self.current + 1),
            QuizAction::Previous => self.current > 0 && self.go_to(self.current - 1),
            QuizAction::GoTo { index } => self.go_to(index),
        }
    }

    /// Picks an option for the current question; locked once submitted.
    pub fn select(&mut self, option: usize, mcqs: &[Mcq]) -> bool {
        let Some(mcq) = mcqs.get(self.current) else {
            return false;
        };
        let Some(attempt) = self.attempts.get_mut(self.current) else {
            return false;
        };
        if attempt.submitted || option >= mcq.options.len() {
            return false;
        }
        attempt.selected = Some(option);
        true
    }

    pub fn submit(&mut self, mcqs: &[Mcq]) -> Option<AnswerOutcome> {
        let mcq = mcqs.get(self.current)?;
        let attempt = self.attempts.get_mut(self.current)?;
        if attempt.submitted {
            return None;
        }
        let selected = attempt.selected?;
        attempt.submitted = true;

        let correct = selected == mcq.correct_answer;
        self.answers[self.current] = Some(correct);
        Some(outcome(mcq, selected))
    }

    /// "Try again": clears the attempt. The recorded result stays until the
    /// next submission overwrites it.
    pub fn reset(&mut self) -> bool {
        match self.attempts.get_mut(self.current) {
            Some(attempt) if attempt.selected.is_some() || attempt.submitted => {
                *attempt = Attempt::default();
                true
            }
            _ => false,
        }
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.question_count() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    pub fn view(&self, mcqs: &[Mcq]) -> QuizView {
        let question = mcqs.get(self.current).map(|mcq| {
            let attempt = self.attempts.get(self.current).cloned().unwrap_or_default();
            QuestionView {
                prompt: mcq.question.clone(),
                options: mcq.options.clone(),
                selected: attempt.selected,
                submitted: attempt.submitted,
                outcome: match (attempt.submitted, attempt.selected) {
                    (true, Some(selected)) => Some(outcome(mcq, selected)),
                    _ => None,
                },
            }
        });

        QuizView {
            current_index: self.current,
            question_count: self.question_count(),
            question,
            answers: self.answers.clone(),
            can_go_previous: self.current > 0,
            can_go_next: self.current + 1 < self.question_count(),
        }
    }
}

fn outcome(mcq: &Mcq, selected: usize) -> AnswerOutcome {
    AnswerOutcome {
        correct: selected == mcq.correct_answer,
        correct_option: mcq.correct_answer,
        explanation: mcq.explanation.clone(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub submitted: bool,
    /// Only after submission, so the correct option is not leaked early.
    pub outcome: Option<AnswerOutcome>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub current_index: usize,
    pub question_count: usize,
    pub question: Option<QuestionView>,
    /// Navigation dots: `None` unanswered, otherwise whether it was right.
    pub answers: Vec<Option<bool>>,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}
