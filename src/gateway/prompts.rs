//! Prompts for the two generation calls.

use crate::flow::model::{FlightPlan, UserProfile};

/// System message shared by both calls: JSON only, no prose.
pub const JSON_SYSTEM_PROMPT: &str =
    "Tu es un assistant de génération de contenu. Réponds UNIQUEMENT avec du JSON valide, \
     sans explication ni mise en forme markdown.";

/// Prompt for the calibration quiz.
pub fn quiz_prompt(role: &str, skills: &[String]) -> String {
    format!(
        "Génère un quiz de 3 questions (QCM) pour valider les connaissances d'un Référent IA \
         dans l'administration française.\n\
         \n\
         CONTEXTE :\n\
         - Rôle du joueur : {role}\n\
         - Compétences : {skills}\n\
         - Ton : Futuriste, \"Calibration du système neuronal\".\n\
         \n\
         FORMAT JSON ATTENDU :\n\
         Une liste d'objets avec :\n\
         - question (string)\n\
         - options (array of 3 strings)\n\
         - correctIndex (number 0-2)\n\
         - explanation (string courte)\n\
         \n\
         Les questions doivent porter sur l'éthique, le RGPD, ou des cas d'usage IA simples \
         dans le service public.",
        skills = skills.join(", "),
    )
}

/// Prompt for the control-tower mission analysis.
pub fn mission_prompt(plan: &FlightPlan, profile: &UserProfile) -> String {
    let role = profile
        .role
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| "Agent".to_string());
    format!(
        "Tu es l'IA \"Tour de Contrôle\" de RefIA Aviation. Analyse ce plan de vol.\n\
         \n\
         --- PILOTE ---\n\
         Rôle : {role}\n\
         Compétences : {skills}\n\
         \n\
         --- MISSION ---\n\
         Titre : {title}\n\
         Contexte : {context}\n\
         Contraintes : {constraints}\n\
         \n\
         Consignes :\n\
         1. Vérifie si la mission est cohérente avec le profil (ex: pas de code complexe pour \
         un profil non technique).\n\
         2. Estime l'urgence et la difficulté (0-3).\n\
         3. Donne un feedback métaphorique aviation (ex: \"Plan de vol stable\", \
         \"Turbulences juridiques en vue\").\n\
         \n\
         FORMAT JSON ATTENDU :\n\
         Un objet avec urgency (number 0-3), difficulty (number 0-3), weatherReport (string), \
         approved (boolean), suggestions (array of strings).",
        skills = profile.skills.join(", "),
        title = plan.title,
        context = plan.context,
        constraints = plan.constraints,
    )
}
