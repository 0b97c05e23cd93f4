//! Intent classification — ordered regex rules over cleaned message text.
//!
//! Classification is deterministic and offline; the generation service is
//! never consulted here. Rules are evaluated by ascending priority, and a
//! tie between disagreeing rules at the same priority falls back to
//! [`Intent::GeneralQuery`].

use regex::Regex;

use crate::plan::model::PlanKind;
use crate::profile::Language;

const LBS_PER_KG: f64 = 0.453592;

/// Commands that bypass classification entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    SwitchLanguage(Language),
    Greeting,
    Thanks,
    Farewell,
}

/// What the user wants from this message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SpecialCommand(Command),
    CancelSubscription,
    TrackProgress,
    ViewPlan,
    GeneralQuery,
}

/// Conversation topic, used to pick the generation prompt for general
/// queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Workout,
    Nutrition,
    Progress,
    Motivation,
    General,
}

/// Structured values pulled out of the message alongside the intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    /// Weight mentioned in the message, normalized to kilograms.
    pub weight_kg: Option<f64>,
    /// Which plan the user referred to, when determinable.
    pub plan_kind: Option<PlanKind>,
    pub topic: Option<Topic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub entities: Entities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Cancel,
    Track,
    View,
}

struct Rule {
    pattern: Regex,
    label: Label,
    priority: u8,
}

/// Rule-table classifier. Compile once, reuse for every message.
pub struct IntentClassifier {
    rules: Vec<Rule>,
    weight_value: Regex,
    pounds_unit: Regex,
    topics: Vec<(Topic, Vec<&'static str>)>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        let rule = |pattern: &str, label: Label, priority: u8| Rule {
            pattern: Regex::new(pattern).expect("static intent pattern"),
            label,
            priority,
        };
        let rules = vec![
            // Bare verbs count; the pending-confirmation step catches
            // accidental matches before anything is cancelled.
            rule(
                r"(?i)\b(cancel|unsubscribe|stop|quit|cancelar)\b",
                Label::Cancel,
                1,
            ),
            rule(r"(?i)\bend (my )?subscription\b", Label::Cancel, 1),
            rule(r"(?i)\bdar(me)? de baja\b", Label::Cancel, 1),
            rule(r"(?i)\b(i (now )?weigh|my weight is|weighed in at)\b", Label::Track, 2),
            rule(r"(?i)\b(peso|pes[eé])\b.*\d", Label::Track, 2),
            rule(r"(?i)\d+(\.\d+)?\s*(kg|kilos?|lbs?|pounds|libras)\b", Label::Track, 2),
            rule(r"(?i)\b(log|track|record)\b.*\b(weight|progress|peso)\b", Label::Track, 2),
            rule(
                r"(?i)\b(my|show|view|see|current)\b.*\b(workout|nutrition|meal|training|diet)?\s*plans?\b",
                Label::View,
                3,
            ),
            rule(
                r"(?i)\b(mi|ver|mu[eé]strame)\b.*\bplan(es)?\b",
                Label::View,
                3,
            ),
            rule(r"(?i)\bwhat('s| is) my plan\b", Label::View, 3),
        ];
        Self {
            rules,
            weight_value: Regex::new(r"(\d+(?:\.\d+)?)\s*(kg|kilos?|lbs?|pounds|libras)?")
                .expect("static weight pattern"),
            pounds_unit: Regex::new(r"(?i)\b(lbs?|pounds|libras)\b").expect("static unit pattern"),
            topics: vec![
                (
                    Topic::Workout,
                    vec![
                        "workout", "exercise", "training", "gym", "reps", "sets", "muscle",
                        "ejercicio", "entrenamiento", "rutina",
                    ],
                ),
                (
                    Topic::Nutrition,
                    vec![
                        "food", "eat", "meal", "diet", "nutrition", "calories", "protein",
                        "comida", "comer", "dieta", "nutrici", "calor",
                    ],
                ),
                (
                    Topic::Progress,
                    vec!["progress", "results", "improvement", "progreso", "resultados"],
                ),
                (
                    Topic::Motivation,
                    vec![
                        "motivat", "tired", "give up", "lazy", "discouraged", "motivaci",
                        "cansado", "rendirme", "desanimad",
                    ],
                ),
            ],
        }
    }

    /// Classify one cleaned message.
    pub fn classify(&self, text: &str) -> Classification {
        if let Some(command) = parse_command(text) {
            return Classification {
                intent: Intent::SpecialCommand(command),
                entities: Entities::default(),
            };
        }

        let mut best: Option<(u8, Label)> = None;
        let mut tied = false;
        for rule in &self.rules {
            if !rule.pattern.is_match(text) {
                continue;
            }
            match best {
                None => best = Some((rule.priority, rule.label)),
                Some((priority, label)) => {
                    if rule.priority < priority {
                        best = Some((rule.priority, rule.label));
                        tied = false;
                    } else if rule.priority == priority && rule.label != label {
                        tied = true;
                    }
                }
            }
        }

        let intent = match best {
            Some(_) if tied => Intent::GeneralQuery,
            Some((_, Label::Cancel)) => Intent::CancelSubscription,
            Some((_, Label::Track)) => Intent::TrackProgress,
            Some((_, Label::View)) => Intent::ViewPlan,
            None => Intent::GeneralQuery,
        };

        Classification {
            intent,
            entities: self.extract_entities(text, intent),
        }
    }

    fn extract_entities(&self, text: &str, intent: Intent) -> Entities {
        let weight_kg = match intent {
            Intent::TrackProgress => self.extract_weight_kg(text),
            _ => None,
        };
        Entities {
            weight_kg,
            plan_kind: extract_plan_kind(text),
            topic: self.extract_topic(text),
        }
    }

    /// First numeric value in the text, converted to kg when a pounds unit
    /// appears anywhere in the message.
    fn extract_weight_kg(&self, text: &str) -> Option<f64> {
        let captures = self.weight_value.captures(text)?;
        let value: f64 = captures.get(1)?.as_str().parse().ok()?;
        if self.pounds_unit.is_match(text) {
            Some(value * LBS_PER_KG)
        } else {
            Some(value)
        }
    }

    fn extract_topic(&self, text: &str) -> Option<Topic> {
        let lower = text.to_lowercase();
        for (topic, keywords) in &self.topics {
            if keywords.iter().any(|k| lower.contains(k)) {
                return Some(*topic);
            }
        }
        None
    }
}

/// Exact-phrase commands checked before the rule table.
fn parse_command(text: &str) -> Option<Command> {
    let lower = text.trim().trim_end_matches(['!', '.', '?']).to_lowercase();
    match lower.as_str() {
        "menu" | "menú" | "help" | "ayuda" | "options" | "opciones" => Some(Command::Menu),
        "english" | "inglés" | "ingles" | "switch to english" => {
            Some(Command::SwitchLanguage(Language::English))
        }
        "spanish" | "español" | "espanol" | "switch to spanish" | "habla español" => {
            Some(Command::SwitchLanguage(Language::Spanish))
        }
        "hi" | "hello" | "hey" | "hola" | "buenas" | "good morning" | "buenos días" | "start"
        | "empezar" | "comenzar" => Some(Command::Greeting),
        "thanks" | "thank you" | "gracias" | "muchas gracias" => Some(Command::Thanks),
        "bye" | "goodbye" | "see you" | "adiós" | "adios" | "hasta luego" => {
            Some(Command::Farewell)
        }
        _ => None,
    }
}

fn extract_plan_kind(text: &str) -> Option<PlanKind> {
    let lower = text.to_lowercase();
    let workout = ["workout", "exercise", "training", "ejercicio", "entrenamiento", "rutina"]
        .iter()
        .any(|k| lower.contains(k));
    let nutrition = ["nutrition", "meal", "diet", "food", "nutrici", "dieta", "comida"]
        .iter()
        .any(|k| lower.contains(k));
    match (workout, nutrition) {
        (true, false) => Some(PlanKind::Workout),
        (false, true) => Some(PlanKind::Nutrition),
        _ => None,
    }
}
