//! Skills & calibration stage (the gangway): skill selection, quiz
//! generation, the calibration quiz itself, and the results screen.
//!
//! Three phases, strictly ordered. The only backward edge is the explicit
//! recovery path from a failed (empty) quiz generation back to selection.

use serde::Serialize;

use crate::error::FlowError;
use crate::flow::model::{
    BADGE_CALIBRATED, MAX_SKILLS, MILES_PER_CORRECT, ProfileDelta, QUIZ_COMPLETION_BONUS,
    QuizQuestion, SKILL_OPTIONS,
};

/// Accuracy display value: `round(score / total * 100)`, 0 when empty.
pub fn accuracy_percent(score: u32, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}

/// Fraction of the quiz already behind the pilot, guarded for `total == 0`.
pub fn quiz_fraction(position: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    position as f32 / total as f32
}

/// Outcome of answering one question. Revealed to the user before the next
/// question can be reached.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerFeedback {
    pub choice: usize,
    pub correct: bool,
    pub correct_index: usize,
    pub explanation: String,
}

/// Final tally shown on the results screen.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsSummary {
    pub score: u32,
    pub total: usize,
    pub accuracy_percent: u32,
    pub miles_awarded: u32,
}

/// What the pilot currently sees of the quiz. The correct index and the
/// explanation stay server-side until the question is answered.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub sequence: usize,
    pub total: usize,
    pub question: String,
    pub options: Vec<String>,
    pub fraction: f32,
}

/// Result of advancing past an answered question.
#[derive(Debug)]
pub enum QuizAdvance {
    /// Moved to the next question.
    Next(QuestionView),
    /// That was the last question; the stage award is ready to merge.
    Finished {
        summary: ResultsSummary,
        delta: ProfileDelta,
    },
}

/// Running quiz state during the calibration phase.
#[derive(Debug)]
struct QuizState {
    questions: Vec<QuizQuestion>,
    current: usize,
    score: u32,
    feedback: Option<AnswerFeedback>,
}

impl QuizState {
    fn view(&self) -> QuestionView {
        let q = &self.questions[self.current];
        QuestionView {
            sequence: self.current + 1,
            total: self.questions.len(),
            question: q.question.clone(),
            options: q.options.clone(),
            fraction: quiz_fraction(self.current, self.questions.len()),
        }
    }
}

#[derive(Debug)]
enum SkillsState {
    /// Multi-select from the fixed catalog, cap 5.
    Selecting { selected: Vec<String> },
    /// Quiz generation outstanding; conflicting actions are rejected.
    Generating { selected: Vec<String> },
    /// Generation came back empty; recoverable, selection preserved.
    Failed { selected: Vec<String> },
    /// Iterating the question sequence.
    Calibration(QuizState),
    /// Quiz finished, award merged; waiting for the boarding action.
    Results(ResultsSummary),
}

/// Local state of the Skills stage.
#[derive(Debug)]
pub struct SkillsStage {
    state: SkillsState,
}

impl SkillsStage {
    pub fn new() -> Self {
        Self {
            state: SkillsState::Selecting {
                selected: Vec::new(),
            },
        }
    }

    /// Phase name for status reporting and error messages.
    pub fn phase_name(&self) -> &'static str {
        phase_name_of(&self.state)
    }

    /// Currently selected skills, in selection order.
    pub fn selected(&self) -> &[String] {
        match &self.state {
            SkillsState::Selecting { selected }
            | SkillsState::Generating { selected }
            | SkillsState::Failed { selected } => selected,
            _ => &[],
        }
    }

    /// Toggle one catalog skill. Selecting beyond the cap is a silent
    /// no-op. Returns whether the skill is selected afterwards.
    pub fn toggle_skill(&mut self, label: &str) -> Result<bool, FlowError> {
        match &mut self.state {
            SkillsState::Selecting { selected } => {
                if !SKILL_OPTIONS.contains(&label) {
                    return Err(FlowError::UnknownSkill {
                        label: label.to_string(),
                    });
                }
                if let Some(position) = selected.iter().position(|s| s == label) {
                    selected.remove(position);
                    Ok(false)
                } else if selected.len() < MAX_SKILLS {
                    selected.push(label.to_string());
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            other => Err(wrong_phase(other, "toggle_skill")),
        }
    }

    /// Confirm the selection and enter the generation phase.
    ///
    /// Returns the skills delta to merge plus the selection to hand to the
    /// generation gateway. A second confirm while generation is outstanding
    /// is rejected as busy.
    pub fn confirm_selection(&mut self) -> Result<(ProfileDelta, Vec<String>), FlowError> {
        match &self.state {
            SkillsState::Generating { .. } => Err(FlowError::Busy {
                action: "generate_quiz",
            }),
            SkillsState::Selecting { selected } => {
                if selected.is_empty() {
                    return Err(FlowError::NoSkillsSelected);
                }
                let selected = selected.clone();
                self.state = SkillsState::Generating {
                    selected: selected.clone(),
                };
                let delta = ProfileDelta {
                    skills: Some(selected.clone()),
                    ..ProfileDelta::default()
                };
                Ok((delta, selected))
            }
            other => Err(wrong_phase(other, "confirm_selection")),
        }
    }

    /// Install the generated quiz. An empty sequence routes to the
    /// recoverable failed phase instead of the quiz; returns whether
    /// calibration actually started.
    pub fn install_quiz(&mut self, questions: Vec<QuizQuestion>) -> Result<bool, FlowError> {
        match &self.state {
            SkillsState::Generating { selected } => {
                let selected = selected.clone();
                if questions.is_empty() {
                    self.state = SkillsState::Failed { selected };
                    return Ok(false);
                }
                self.state = SkillsState::Calibration(QuizState {
                    questions,
                    current: 0,
                    score: 0,
                    feedback: None,
                });
                Ok(true)
            }
            other => Err(wrong_phase(other, "install_quiz")),
        }
    }

    /// Recovery path: return from a failed generation to skill selection.
    pub fn retry_selection(&mut self) -> Result<(), FlowError> {
        match &self.state {
            SkillsState::Failed { selected } => {
                let selected = selected.clone();
                self.state = SkillsState::Selecting { selected };
                Ok(())
            }
            other => Err(wrong_phase(other, "retry_selection")),
        }
    }

    /// The question currently facing the pilot, if calibration is running.
    pub fn current_question(&self) -> Option<QuestionView> {
        match &self.state {
            SkillsState::Calibration(quiz) => Some(quiz.view()),
            _ => None,
        }
    }

    /// Answer the current question. The selection is terminal: a second
    /// answer to the same question is rejected.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback, FlowError> {
        match &mut self.state {
            SkillsState::Calibration(quiz) => {
                if choice > 2 {
                    return Err(FlowError::AnswerOutOfRange { choice });
                }
                if quiz.feedback.is_some() {
                    return Err(FlowError::AlreadyAnswered);
                }
                let question = &quiz.questions[quiz.current];
                let correct = choice == question.correct_index;
                let feedback = AnswerFeedback {
                    choice,
                    correct,
                    correct_index: question.correct_index,
                    explanation: question.explanation.clone(),
                };
                if correct {
                    quiz.score += 1;
                }
                quiz.feedback = Some(feedback.clone());
                Ok(feedback)
            }
            other => Err(wrong_phase(other, "answer")),
        }
    }

    /// Advance past an answered question, or finish the quiz.
    ///
    /// Finishing computes the stage award: `score * 50 + 50` miles plus the
    /// calibration badge, returned as a delta for the controller to merge.
    pub fn advance(&mut self) -> Result<QuizAdvance, FlowError> {
        let (score, total) = match &mut self.state {
            SkillsState::Calibration(quiz) => {
                if quiz.feedback.is_none() {
                    return Err(FlowError::NotAnswered);
                }
                if quiz.current + 1 < quiz.questions.len() {
                    quiz.current += 1;
                    quiz.feedback = None;
                    return Ok(QuizAdvance::Next(quiz.view()));
                }
                (quiz.score, quiz.questions.len())
            }
            other => return Err(wrong_phase(other, "advance")),
        };
        let miles_awarded = score * MILES_PER_CORRECT + QUIZ_COMPLETION_BONUS;
        let summary = ResultsSummary {
            score,
            total,
            accuracy_percent: accuracy_percent(score, total),
            miles_awarded,
        };
        self.state = SkillsState::Results(summary.clone());
        Ok(QuizAdvance::Finished {
            summary,
            delta: ProfileDelta::award(miles_awarded, BADGE_CALIBRATED),
        })
    }

    /// The final tally, once the quiz is finished.
    pub fn results(&self) -> Option<&ResultsSummary> {
        match &self.state {
            SkillsState::Results(summary) => Some(summary),
            _ => None,
        }
    }
}

impl Default for SkillsStage {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_name_of(state: &SkillsState) -> &'static str {
    match state {
        SkillsState::Selecting { .. } => "selecting",
        SkillsState::Generating { .. } => "generating",
        SkillsState::Failed { .. } => "failed",
        SkillsState::Calibration(_) => "calibration",
        SkillsState::Results(_) => "results",
    }
}

fn wrong_phase(state: &SkillsState, action: &'static str) -> FlowError {
    FlowError::WrongPhase {
        action,
        phase: phase_name_of(state).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_of(n: usize) -> Vec<QuizQuestion> {
        (0..n)
            .map(|i| QuizQuestion {
                question: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_index: i % 3,
                explanation: format!("Explication {i}"),
            })
            .collect()
    }

    fn stage_in_calibration(n: usize) -> SkillsStage {
        let mut stage = SkillsStage::new();
        stage.toggle_skill("Éthique & RGPD").unwrap();
        stage.confirm_selection().unwrap();
        stage.install_quiz(quiz_of(n)).unwrap();
        stage
    }

    #[test]
    fn toggle_respects_cap_of_five() {
        let mut stage = SkillsStage::new();
        for label in SKILL_OPTIONS.iter().take(5) {
            assert!(stage.toggle_skill(label).unwrap());
        }
        // Sixth selection is a silent no-op.
        assert!(!stage.toggle_skill(SKILL_OPTIONS[5]).unwrap());
        assert_eq!(stage.selected().len(), 5);
        assert!(!stage.selected().contains(&SKILL_OPTIONS[5].to_string()));
    }

    #[test]
    fn toggle_deselects_on_second_touch() {
        let mut stage = SkillsStage::new();
        stage.toggle_skill("Computer Vision").unwrap();
        assert!(!stage.toggle_skill("Computer Vision").unwrap());
        assert!(stage.selected().is_empty());
    }

    #[test]
    fn unknown_skill_is_rejected() {
        let mut stage = SkillsStage::new();
        let err = stage.toggle_skill("Basket Weaving").unwrap_err();
        assert!(matches!(err, FlowError::UnknownSkill { .. }));
    }

    #[test]
    fn confirm_requires_a_selection() {
        let mut stage = SkillsStage::new();
        assert!(matches!(
            stage.confirm_selection().unwrap_err(),
            FlowError::NoSkillsSelected
        ));
    }

    #[test]
    fn confirm_emits_skills_delta_and_enters_generating() {
        let mut stage = SkillsStage::new();
        stage.toggle_skill("Prompt Engineering").unwrap();
        let (delta, skills) = stage.confirm_selection().unwrap();
        assert_eq!(delta.skills.as_deref(), Some(&["Prompt Engineering".to_string()][..]));
        assert_eq!(delta.add_miles, 0);
        assert_eq!(skills, vec!["Prompt Engineering"]);
        assert_eq!(stage.phase_name(), "generating");
    }

    #[test]
    fn duplicate_confirm_while_generating_is_busy() {
        let mut stage = SkillsStage::new();
        stage.toggle_skill("Computer Vision").unwrap();
        stage.confirm_selection().unwrap();
        assert!(matches!(
            stage.confirm_selection().unwrap_err(),
            FlowError::Busy { .. }
        ));
    }

    #[test]
    fn empty_quiz_routes_to_recoverable_failure() {
        let mut stage = SkillsStage::new();
        stage.toggle_skill("Computer Vision").unwrap();
        stage.confirm_selection().unwrap();
        assert!(!stage.install_quiz(vec![]).unwrap());
        assert_eq!(stage.phase_name(), "failed");

        // Recovery returns to selection with the choice preserved.
        stage.retry_selection().unwrap();
        assert_eq!(stage.phase_name(), "selecting");
        assert_eq!(stage.selected(), &["Computer Vision".to_string()]);
    }

    #[test]
    fn answering_is_terminal_per_question() {
        let mut stage = stage_in_calibration(3);
        let feedback = stage.answer(0).unwrap();
        assert!(feedback.correct);
        assert!(matches!(
            stage.answer(1).unwrap_err(),
            FlowError::AlreadyAnswered
        ));
    }

    #[test]
    fn answer_out_of_range_is_rejected() {
        let mut stage = stage_in_calibration(3);
        assert!(matches!(
            stage.answer(3).unwrap_err(),
            FlowError::AnswerOutOfRange { choice: 3 }
        ));
    }

    #[test]
    fn advance_requires_an_answer_first() {
        let mut stage = stage_in_calibration(3);
        assert!(matches!(stage.advance().unwrap_err(), FlowError::NotAnswered));
    }

    #[test]
    fn feedback_reveals_correct_index_and_explanation() {
        let mut stage = stage_in_calibration(2);
        let feedback = stage.answer(2).unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.correct_index, 0);
        assert_eq!(feedback.explanation, "Explication 0");
    }

    #[test]
    fn full_run_awards_score_times_fifty_plus_bonus() {
        let mut stage = stage_in_calibration(3);
        // Correct answers are at indices 0, 1, 2; answer the first two
        // correctly and miss the last.
        stage.answer(0).unwrap();
        assert!(matches!(stage.advance().unwrap(), QuizAdvance::Next(_)));
        stage.answer(1).unwrap();
        assert!(matches!(stage.advance().unwrap(), QuizAdvance::Next(_)));
        stage.answer(0).unwrap();
        match stage.advance().unwrap() {
            QuizAdvance::Finished { summary, delta } => {
                assert_eq!(summary.score, 2);
                assert_eq!(summary.miles_awarded, 2 * 50 + 50);
                assert_eq!(summary.accuracy_percent, 67);
                assert_eq!(delta.add_miles, 150);
                assert_eq!(delta.add_badges, vec!["CALIBRÉ"]);
            }
            other => panic!("expected Finished, got {other:?}"),
        }
        assert_eq!(stage.phase_name(), "results");
        assert_eq!(stage.results().unwrap().score, 2);
    }

    #[test]
    fn question_view_hides_the_answer() {
        let stage = stage_in_calibration(3);
        let view = stage.current_question().unwrap();
        assert_eq!(view.sequence, 1);
        assert_eq!(view.total, 3);
        assert_eq!(view.options.len(), 3);
        let serialized = serde_json::to_string(&view).unwrap();
        assert!(!serialized.contains("correct"));
        assert!(!serialized.contains("Explication"));
    }

    #[test]
    fn accuracy_rounds_to_nearest_percent() {
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(3, 3), 100);
        assert_eq!(accuracy_percent(0, 0), 0);
    }

    #[test]
    fn fraction_guards_division_by_zero() {
        assert_eq!(quiz_fraction(0, 0), 0.0);
        assert_eq!(quiz_fraction(1, 3), 1.0 / 3.0);
    }
}
