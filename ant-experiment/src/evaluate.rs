use crate::config::FeedbackConfig;
use ant_core::{ResponseLabel, ResponseOutcome, TrialCondition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Correct,
    Incorrect,
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub classification: Classification,
    pub correct: bool,
    /// Set only when feedback is on for this trial and the response was wrong or late.
    pub feedback: Option<String>,
}

/// Classifies a response against the trial's target direction.
///
/// `feedback` is `None` when feedback is off for the trial; correctness is
/// computed either way.
pub fn evaluate(
    outcome: &ResponseOutcome,
    condition: &TrialCondition,
    feedback: Option<&FeedbackConfig>,
) -> Evaluation {
    let classification = if outcome.is_timeout() {
        Classification::Timeout
    } else if outcome.label() == ResponseLabel::from(condition.target_direction) {
        Classification::Correct
    } else {
        Classification::Incorrect
    };

    let feedback = feedback.and_then(|config| match classification {
        Classification::Correct => None,
        Classification::Incorrect => Some(config.incorrect_message.clone()),
        Classification::Timeout => Some(config.timeout_message.clone()),
    });

    Evaluation {
        classification,
        correct: classification == Classification::Correct,
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ant_core::{ArrowDirection, CueType, FlankerType, Location, ReactionTime};

    fn condition(direction: ArrowDirection) -> TrialCondition {
        TrialCondition {
            cue_type: CueType::Double,
            cue_location: Location::Above,
            target_location: Location::Above,
            target_direction: direction,
            flanker_type: FlankerType::Congruent,
        }
    }

    #[test]
    fn matching_label_is_correct() {
        let outcome = ResponseOutcome::response(ResponseLabel::Left, 350.0);
        let eval = evaluate(&outcome, &condition(ArrowDirection::Left), None);
        assert!(eval.correct);
        assert_eq!(eval.classification, Classification::Correct);
        assert_eq!(eval.feedback, None);
    }

    #[test]
    fn timeout_is_not_merely_incorrect() {
        let outcome = ResponseOutcome::timeout();
        let eval = evaluate(&outcome, &condition(ArrowDirection::Right), None);
        assert!(!eval.correct);
        assert_eq!(eval.classification, Classification::Timeout);
    }

    #[test]
    fn timeout_wins_over_a_stray_label() {
        let outcome = ResponseOutcome::new(ResponseLabel::Right, ReactionTime::Timeout);
        let eval = evaluate(&outcome, &condition(ArrowDirection::Right), None);
        assert_eq!(eval.classification, Classification::Timeout);
    }

    #[test]
    fn feedback_message_depends_on_classification() {
        let config = FeedbackConfig::default();
        let cond = condition(ArrowDirection::Left);

        let wrong = evaluate(
            &ResponseOutcome::response(ResponseLabel::Right, 512.0),
            &cond,
            Some(&config),
        );
        assert_eq!(wrong.feedback.as_deref(), Some(config.incorrect_message.as_str()));

        let late = evaluate(&ResponseOutcome::timeout(), &cond, Some(&config));
        assert_eq!(late.feedback.as_deref(), Some(config.timeout_message.as_str()));

        let right = evaluate(
            &ResponseOutcome::response(ResponseLabel::Left, 400.0),
            &cond,
            Some(&config),
        );
        assert_eq!(right.feedback, None);
    }

    #[test]
    fn feedback_off_still_scores() {
        let eval = evaluate(
            &ResponseOutcome::response(ResponseLabel::Right, 512.0),
            &condition(ArrowDirection::Left),
            None,
        );
        assert_eq!(eval.classification, Classification::Incorrect);
        assert_eq!(eval.feedback, None);
    }
}
