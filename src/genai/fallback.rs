//! Fixed fallback content used whenever generation fails.
//!
//! The user always gets something usable; a failed generation call is an
//! operational problem, never a conversational dead end.

use crate::plan::model::{
    Difficulty, Exercise, FoodItem, Meal, NutritionContent, NutritionTargets, WorkoutContent,
    WorkoutDay,
};
use crate::profile::Language;

/// Minimal safe workout plan.
pub fn workout_plan(difficulty: Difficulty, language: Language) -> WorkoutContent {
    let (title, description, day_name, pushups, squats, instr_push, instr_squat) = match language {
        Language::English => (
            "Basic Fitness Plan",
            "A simple starter workout plan",
            "Upper Body",
            "Push-ups",
            "Bodyweight Squats",
            "Start with modified push-ups if needed",
            "Keep your back straight and core engaged",
        ),
        Language::Spanish => (
            "Plan de Fitness Básico",
            "Un plan de entrenamiento sencillo para empezar",
            "Tren Superior",
            "Flexiones",
            "Sentadillas sin peso",
            "Empieza con flexiones modificadas si es necesario",
            "Mantén la espalda recta y el core activo",
        ),
    };
    WorkoutContent {
        title: title.to_string(),
        description: description.to_string(),
        difficulty,
        duration_weeks: 4,
        days: vec![WorkoutDay {
            day: "Monday".to_string(),
            name: day_name.to_string(),
            exercises: vec![
                Exercise {
                    name: pushups.to_string(),
                    sets: 3,
                    reps: "10-15".to_string(),
                    rest: "60 seconds".to_string(),
                    instructions: instr_push.to_string(),
                },
                Exercise {
                    name: squats.to_string(),
                    sets: 3,
                    reps: "15-20".to_string(),
                    rest: "60 seconds".to_string(),
                    instructions: instr_squat.to_string(),
                },
            ],
        }],
    }
}

/// Minimal balanced meal plan. Targets come from the caller so the computed
/// (or default) daily numbers still apply.
pub fn nutrition_plan(targets: NutritionTargets, language: Language) -> NutritionContent {
    let (title, description, breakfast, lunch, dinner, f1, f2, f3, tips) = match language {
        Language::English => (
            "Basic Nutrition Plan",
            "A simple balanced nutrition plan",
            "Breakfast",
            "Lunch",
            "Dinner",
            "Oatmeal with fruits",
            "Grilled chicken with vegetables",
            "Fish with quinoa",
            vec![
                "Drink at least 8 glasses of water daily".to_string(),
                "Include fruits and vegetables in every meal".to_string(),
                "Eat protein with each meal".to_string(),
            ],
        ),
        Language::Spanish => (
            "Plan de Nutrición Básico",
            "Un plan de nutrición sencillo y equilibrado",
            "Desayuno",
            "Almuerzo",
            "Cena",
            "Avena con frutas",
            "Pollo a la plancha con verduras",
            "Pescado con quinoa",
            vec![
                "Bebe al menos 8 vasos de agua al día".to_string(),
                "Incluye frutas y verduras en cada comida".to_string(),
                "Come proteína en cada comida".to_string(),
            ],
        ),
    };
    NutritionContent {
        title: title.to_string(),
        description: description.to_string(),
        daily_calories: Some(targets.calories),
        daily_protein: Some(targets.protein_g),
        daily_carbs: Some(targets.carbs_g),
        daily_fats: Some(targets.fat_g),
        meals: vec![
            Meal {
                name: breakfast.to_string(),
                time: "07:00".to_string(),
                foods: vec![FoodItem {
                    name: f1.to_string(),
                    amount: "1 bowl".to_string(),
                    calories: 300,
                    protein: 10,
                    carbs: 50,
                    fats: 8,
                }],
            },
            Meal {
                name: lunch.to_string(),
                time: "12:00".to_string(),
                foods: vec![FoodItem {
                    name: f2.to_string(),
                    amount: "150g chicken + vegetables".to_string(),
                    calories: 400,
                    protein: 40,
                    carbs: 20,
                    fats: 15,
                }],
            },
            Meal {
                name: dinner.to_string(),
                time: "19:00".to_string(),
                foods: vec![FoodItem {
                    name: f3.to_string(),
                    amount: "120g fish + 80g quinoa".to_string(),
                    calories: 350,
                    protein: 35,
                    carbs: 30,
                    fats: 12,
                }],
            },
        ],
        tips,
    }
}

/// Conversational apology when generation fails mid-chat.
pub fn conversational_reply(language: Language) -> String {
    match language {
        Language::English => {
            "Sorry, I'm having trouble thinking right now. Please try again in a moment!"
                .to_string()
        }
        Language::Spanish => {
            "Lo siento, estoy teniendo problemas para pensar ahora mismo. ¡Inténtalo de nuevo en un momento!"
                .to_string()
        }
    }
}

pub fn progress_analysis(language: Language) -> String {
    match language {
        Language::English => "Your progress looks good! Keep up the great work!".to_string(),
        Language::Spanish => "¡Tu progreso se ve bien! ¡Sigue con el gran trabajo!".to_string(),
    }
}

pub fn motivational_message(language: Language) -> String {
    match language {
        Language::English => {
            "You've got this! Every step counts towards your goals! 💪".to_string()
        }
        Language::Spanish => {
            "¡Tú puedes! ¡Cada paso cuenta hacia tus objetivos! 💪".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::PlanContent;

    #[test]
    fn fallback_workout_is_valid_plan_content() {
        let content = workout_plan(Difficulty::Beginner, Language::English);
        assert_eq!(content.title, "Basic Fitness Plan");
        assert_eq!(content.days[0].exercises.len(), 2);
        assert!(PlanContent::Workout(content).validate().is_ok());
    }

    #[test]
    fn fallback_nutrition_carries_caller_targets() {
        let targets = NutritionTargets {
            calories: 2373,
            protein_g: 148,
            carbs_g: 266,
            fat_g: 79,
        };
        let content = nutrition_plan(targets, Language::English);
        assert_eq!(content.daily_calories, Some(2373));
        assert_eq!(content.meals.len(), 3);
        assert!(PlanContent::Nutrition(content).validate().is_ok());
    }

    #[test]
    fn spanish_fallbacks_are_localized() {
        let content = workout_plan(Difficulty::Beginner, Language::Spanish);
        assert_eq!(content.title, "Plan de Fitness Básico");
        assert!(motivational_message(Language::Spanish).contains("paso"));
    }
}
