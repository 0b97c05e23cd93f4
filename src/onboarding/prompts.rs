//! Prompt and corrective-message text for the onboarding flow.
//!
//! All text is selected by an explicit [`Language`] parameter; there is no
//! ambient locale state.

use crate::profile::Language;
use crate::transport::Reply;

use super::state::OnboardingStep;

/// Greeting sent on first contact, before the first question.
pub fn welcome_greeting(name: &str, language: Language) -> String {
    let name = if name.is_empty() {
        match language {
            Language::English => "friend",
            Language::Spanish => "amigo",
        }
    } else {
        name
    };
    match language {
        Language::English => format!(
            "Welcome, {name}! 💪 I'm your AI personal trainer. I'll ask a few \
             questions to build your personalized workout and nutrition plans. \
             Let's start: how old are you?"
        ),
        Language::Spanish => format!(
            "¡Bienvenido, {name}! 💪 Soy tu entrenador personal con IA. Te haré \
             unas preguntas para crear tus planes personalizados de ejercicio y \
             nutrición. Empecemos: ¿cuántos años tienes?"
        ),
    }
}

/// The question asked for a given field, sent after the previous field of the
/// same step was stored.
pub fn field_prompt(field: &str, language: Language) -> Reply {
    use Language::*;
    match (field, language) {
        ("age", English) => Reply::text("How old are you?"),
        ("age", Spanish) => Reply::text("¿Cuántos años tienes?"),
        ("gender", English) => Reply::text("Great! What's your gender? (Male/Female/Other)"),
        ("gender", Spanish) => Reply::text("¡Genial! ¿Cuál es tu género? (Masculino/Femenino/Otro)"),
        ("weight", English) => Reply::text("What's your current weight in kg?"),
        ("weight", Spanish) => Reply::text("¿Cuál es tu peso actual en kg?"),
        ("height", English) => Reply::text("Perfect! What's your height in cm?"),
        ("height", Spanish) => Reply::text("¡Perfecto! ¿Cuál es tu estatura en cm?"),
        ("target_weight", English) => Reply::text("What's your target weight in kg?"),
        ("target_weight", Spanish) => Reply::text("¿Cuál es tu peso objetivo en kg?"),
        ("goals", English) => Reply::text(
            "Tell me about your fitness goals — what would you like to achieve?",
        ),
        ("goals", Spanish) => Reply::text(
            "Cuéntame tus objetivos de fitness, ¿qué te gustaría lograr?",
        ),
        ("activity_level", English) => Reply::numbered(
            "What's your current activity level?",
            activity_options(English),
        ),
        ("activity_level", Spanish) => Reply::numbered(
            "¿Cuál es tu nivel de actividad actual?",
            activity_options(Spanish),
        ),
        ("dietary_restrictions", English) => Reply::text(
            "Do you have any dietary restrictions or allergies I should know \
             about? (Type 'none' if you don't have any)",
        ),
        ("dietary_restrictions", Spanish) => Reply::text(
            "¿Tienes alguna restricción alimentaria o alergia que deba conocer? \
             (Escribe 'ninguna' si no tienes)",
        ),
        ("preferred_workout_time", English) => Reply::numbered(
            "When do you prefer to workout?",
            workout_time_options(English),
        ),
        ("preferred_workout_time", Spanish) => Reply::numbered(
            "¿Cuándo prefieres entrenar?",
            workout_time_options(Spanish),
        ),
        // Unknown field names cannot occur on the fixed path.
        (_, English) => Reply::text("Please provide the requested information."),
        (_, Spanish) => Reply::text("Por favor proporciona la información solicitada."),
    }
}

/// Field-specific corrective message for invalid input. The state does not
/// change; the same field is asked again.
pub fn corrective(field: &str, language: Language) -> Reply {
    use Language::*;
    match (field, language) {
        ("age", English) => Reply::text("Please enter a valid age between 13 and 100."),
        ("age", Spanish) => Reply::text("Por favor ingresa una edad válida entre 13 y 100."),
        ("gender", English) => {
            Reply::text("Please specify your gender (Male, Female, or Other).")
        }
        ("gender", Spanish) => {
            Reply::text("Por favor indica tu género (Masculino, Femenino u Otro).")
        }
        ("weight", English) | ("target_weight", English) => {
            Reply::text("Please enter a valid weight between 30-300 kg.")
        }
        ("weight", Spanish) | ("target_weight", Spanish) => {
            Reply::text("Por favor ingresa un peso válido entre 30 y 300 kg.")
        }
        ("height", English) => Reply::text("Please enter a valid height between 120-250 cm."),
        ("height", Spanish) => {
            Reply::text("Por favor ingresa una estatura válida entre 120 y 250 cm.")
        }
        ("goals", English) => Reply::text(
            "Please describe your fitness goals in more detail (at least a few words).",
        ),
        ("goals", Spanish) => Reply::text(
            "Por favor describe tus objetivos con más detalle (al menos unas palabras).",
        ),
        ("activity_level", English) => Reply::numbered(
            "Please select one of the activity levels from the list.",
            activity_options(English),
        ),
        ("activity_level", Spanish) => Reply::numbered(
            "Por favor selecciona uno de los niveles de actividad de la lista.",
            activity_options(Spanish),
        ),
        (_, English) => Reply::text("Please provide the requested information."),
        (_, Spanish) => Reply::text("Por favor proporciona la información solicitada."),
    }
}

/// Sent once the final step finishes and the session is deleted.
pub fn completion_message(language: Language) -> Reply {
    match language {
        Language::English => Reply::text(
            "🎉 You're all set! I'm generating your personalized workout and \
             nutrition plans right now — I'll message you as soon as they're \
             ready. Type \"menu\" anytime to see what I can do.",
        ),
        Language::Spanish => Reply::text(
            "🎉 ¡Todo listo! Estoy generando tus planes personalizados de \
             ejercicio y nutrición ahora mismo; te escribiré en cuanto estén \
             listos. Escribe \"menú\" cuando quieras para ver lo que puedo hacer.",
        ),
    }
}

pub fn activity_options(language: Language) -> Vec<String> {
    match language {
        Language::English => vec![
            "Sedentary (little/no exercise)".into(),
            "Lightly active (1-3 days/week)".into(),
            "Moderately active (3-5 days/week)".into(),
            "Very active (6-7 days/week)".into(),
            "Extremely active (very hard exercise)".into(),
        ],
        Language::Spanish => vec![
            "Sedentario (poco/ningún ejercicio)".into(),
            "Ligeramente activo (1-3 días/semana)".into(),
            "Moderadamente activo (3-5 días/semana)".into(),
            "Muy activo (6-7 días/semana)".into(),
            "Extremadamente activo (ejercicio muy intenso)".into(),
        ],
    }
}

pub fn workout_time_options(language: Language) -> Vec<String> {
    match language {
        Language::English => vec![
            "Early Morning (5-7 AM)".into(),
            "Morning (7-9 AM)".into(),
            "Late Morning (9-11 AM)".into(),
            "Afternoon (12-3 PM)".into(),
            "Evening (5-7 PM)".into(),
            "Night (7-9 PM)".into(),
        ],
        Language::Spanish => vec![
            "Madrugada (5-7 AM)".into(),
            "Mañana (7-9 AM)".into(),
            "Media mañana (9-11 AM)".into(),
            "Tarde (12-3 PM)".into(),
            "Atardecer (5-7 PM)".into(),
            "Noche (7-9 PM)".into(),
        ],
    }
}

/// Prompt emitted on entering a step: the question for its first field.
pub fn step_prompt(step: OnboardingStep, language: Language) -> Reply {
    match step.required_fields().first() {
        Some(field) => field_prompt(field, language),
        None => completion_message(language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_collected_field_has_a_prompt_and_corrective() {
        use OnboardingStep::*;
        for step in [PersonalInfo, PhysicalInfo, Goals, ActivityLevel, DietaryInfo, Preferences] {
            for field in step.required_fields() {
                for lang in [Language::English, Language::Spanish] {
                    assert!(!field_prompt(field, lang).text.is_empty());
                    assert!(!corrective(field, lang).text.is_empty());
                }
            }
        }
    }

    #[test]
    fn activity_prompt_lists_five_options() {
        let reply = field_prompt("activity_level", Language::English);
        assert_eq!(reply.options.len(), 5);
    }

    #[test]
    fn welcome_falls_back_to_generic_name() {
        let text = welcome_greeting("", Language::English);
        assert!(text.contains("friend"));
        let text = welcome_greeting("Ana", Language::Spanish);
        assert!(text.contains("Ana"));
    }
}
