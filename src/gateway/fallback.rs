//! Fixed fallback content used when the remote generator is unreachable or
//! returns an unusable payload. Deterministic: every invocation yields the
//! same records.

use crate::flow::model::{MissionAnalysis, QuizQuestion};

/// The three-question fallback quiz.
pub fn fallback_quiz() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion {
            question: "Quelle est la priorité absolue d'un projet IA public ?".to_string(),
            options: vec![
                "La performance pure".to_string(),
                "L'explicabilité et la maîtrise".to_string(),
                "Le coût réduit".to_string(),
            ],
            correct_index: 1,
            explanation: "L'IA de confiance est le pilier de la stratégie nationale.".to_string(),
        },
        QuizQuestion {
            question: "Le RGPD s'applique-t-il aux données d'entraînement ?".to_string(),
            options: vec![
                "Oui, toujours".to_string(),
                "Non, c'est de l'IA".to_string(),
                "Uniquement si elles sont vendues".to_string(),
            ],
            correct_index: 0,
            explanation: "Le RGPD s'applique dès qu'il y a données personnelles.".to_string(),
        },
        QuizQuestion {
            question: "Quel outil utiliser pour dialoguer avec vos documents ?".to_string(),
            options: vec![
                "Un GAN".to_string(),
                "Un RAG (Retrieval Augmented Generation)".to_string(),
                "Un SVM".to_string(),
            ],
            correct_index: 1,
            explanation: "Le RAG permet de connecter un LLM à vos propres bases documentaires."
                .to_string(),
        },
    ]
}

/// The degraded-link mission analysis: flight cleared, visual rules.
pub fn fallback_analysis() -> MissionAnalysis {
    MissionAnalysis {
        urgency: 1,
        difficulty: 1,
        weather_report: "Liaison radio perturbée. Vol à vue autorisé.".to_string(),
        approved: true,
        suggestions: vec!["Vérifier manuellement les contraintes".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_quiz_is_three_valid_questions() {
        let quiz = fallback_quiz();
        assert_eq!(quiz.len(), 3);
        for question in &quiz {
            question.validate().unwrap();
        }
    }

    #[test]
    fn fallback_quiz_is_deterministic() {
        let a = serde_json::to_string(&fallback_quiz()).unwrap();
        let b = serde_json::to_string(&fallback_quiz()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fallback_analysis_clears_the_flight() {
        let analysis = fallback_analysis();
        analysis.validate().unwrap();
        assert!(analysis.approved);
        assert_eq!(analysis.urgency, 1);
        assert_eq!(analysis.difficulty, 1);
        assert_eq!(
            analysis.suggestions,
            vec!["Vérifier manuellement les contraintes"]
        );
    }
}
