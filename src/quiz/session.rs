use rust_fsm::*;
use tracing::debug;

use crate::quiz::{bootstrap_questions, QuizQuestion};

state_machine! {
    question_flow(Unanswered)

    Unanswered(HydrateAnswered) => Answered,

    Unanswered(Select) => Answered,
    Unanswered(Advance) => Unanswered,
    Answered(Advance) => Unanswered
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionState {
    Unanswered,
    Answered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionAction {
    Select,
    Advance,
}

fn hydrate(machine: &mut question_flow::StateMachine, state: QuestionState) -> Result<(), ()> {
    if state == QuestionState::Answered {
        machine
            .consume(&question_flow::Input::HydrateAnswered)
            .map_err(|_| ())?;
    }
    Ok(())
}

fn expected_next_state(current: QuestionState, action: QuestionAction) -> Option<QuestionState> {
    match (current, action) {
        (QuestionState::Unanswered, QuestionAction::Select) => Some(QuestionState::Answered),
        (_, QuestionAction::Advance) => Some(QuestionState::Unanswered),
        (QuestionState::Answered, QuestionAction::Select) => None,
    }
}

pub fn transition(current: QuestionState, action: QuestionAction) -> Option<QuestionState> {
    let mut machine = question_flow::StateMachine::new();
    hydrate(&mut machine, current).ok()?;

    let input = match action {
        QuestionAction::Select => question_flow::Input::Select,
        QuestionAction::Advance => question_flow::Input::Advance,
    };

    machine.consume(&input).ok()?;
    expected_next_state(current, action)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Correct,
    Incorrect,
    /// The question was already answered, or the index named no option.
    Ignored,
}

/// How an option should be drawn for the current question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionStatus {
    Selectable,
    Correct,
    WrongPick,
    Dimmed,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    index: usize,
    selected: Option<usize>,
    state: QuestionState,
    score: u32,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new(bootstrap_questions())
    }
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let mut session = Self {
            questions: Vec::new(),
            index: 0,
            selected: None,
            state: QuestionState::Unanswered,
            score: 0,
        };
        session.replace_questions(questions);
        session
    }

    /// Swaps in a whole new question set and restarts at its first question.
    /// The score carries over.
    pub fn replace_questions(&mut self, questions: Vec<QuizQuestion>) {
        self.questions = if questions.is_empty() {
            bootstrap_questions()
        } else {
            questions
        };
        self.index = 0;
        self.selected = None;
        self.state = QuestionState::Unanswered;
    }

    pub fn select_option(&mut self, option: usize) -> SelectOutcome {
        let Some(next) = transition(self.state, QuestionAction::Select) else {
            debug!(option, "question already answered; selection ignored");
            return SelectOutcome::Ignored;
        };
        let question = self.current();
        if option >= question.options.len() {
            return SelectOutcome::Ignored;
        }
        let correct = question.is_correct(option);

        self.selected = Some(option);
        self.state = next;
        if correct {
            self.score += 1;
            SelectOutcome::Correct
        } else {
            SelectOutcome::Incorrect
        }
    }

    pub fn advance(&mut self) {
        if let Some(next) = transition(self.state, QuestionAction::Advance) {
            self.state = next;
        }
        self.index = (self.index + 1) % self.questions.len();
        self.selected = None;
    }

    pub fn current(&self) -> &QuizQuestion {
        &self.questions[self.index]
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn state(&self) -> QuestionState {
        self.state
    }

    pub fn is_answered(&self) -> bool {
        self.state == QuestionState::Answered
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn position_label(&self) -> String {
        format!("Question {} of {}", self.index + 1, self.questions.len())
    }

    pub fn progress(&self) -> f32 {
        (self.index + 1) as f32 / self.questions.len() as f32
    }

    pub fn option_status(&self, option: usize) -> OptionStatus {
        if !self.is_answered() {
            return OptionStatus::Selectable;
        }
        if self.current().is_correct(option) {
            OptionStatus::Correct
        } else if self.selected == Some(option) {
            OptionStatus::WrongPick
        } else {
            OptionStatus::Dimmed
        }
    }
}
