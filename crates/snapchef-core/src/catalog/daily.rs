//! Daily rotation. Two daily slots draw from this table.

use super::Template;
use crate::challenge::Reward;

pub(super) static TEMPLATES: &[Template] = &[
    Template {
        title: "5-Ingredient Challenge",
        description: "Create a delicious meal using only 5 ingredients or less",
        category: "ingredient_limit",
        hashtag: "#5IngredientChallenge",
        reward: Reward::new(50, 5),
        requirements: &[
            "0/1 recipes",
            "Use maximum 5 ingredients",
            "Salt, pepper, and oil don't count",
        ],
        premium: false,
    },
    Template {
        title: "15-Minute Meal Sprint",
        description: "Make a complete meal in 15 minutes or less",
        category: "time_limit",
        hashtag: "#15MinuteMeals",
        reward: Reward::new(60, 6),
        requirements: &[
            "0/15 minutes on the clock",
            "Must be a full meal",
            "Include prep time",
        ],
        premium: false,
    },
    Template {
        title: "Around the World",
        description: "Create a dish from a different cuisine using your fridge items",
        category: "cuisine",
        hashtag: "#AroundTheWorldChallenge",
        reward: Reward::new(70, 7),
        requirements: &[
            "0/2 recipes",
            "Choose any world cuisine",
            "Explain the inspiration",
        ],
        premium: false,
    },
    Template {
        title: "Leftover Transformation",
        description: "Turn yesterday's leftovers into today's masterpiece",
        category: "leftover",
        hashtag: "#LeftoverMagic",
        reward: Reward::new(80, 8),
        requirements: &[
            "0/1 recipes",
            "Use at least 50% leftovers",
            "No additional shopping",
        ],
        premium: false,
    },
    Template {
        title: "Nutrition Champion",
        description: "Create a meal with all 5 food groups",
        category: "healthy",
        hashtag: "#HealthyEating",
        reward: Reward::new(65, 6),
        requirements: &[
            "0/1 meals",
            "Include protein, grains, vegetables, fruits, dairy",
            "Keep it under 500 calories",
        ],
        premium: false,
    },
    Template {
        title: "Fridge Inventory",
        description: "Scan your fridge and see what it can become",
        category: "discovery",
        hashtag: "#FridgeCheck",
        reward: Reward::new(40, 4),
        requirements: &["0/3 fridge scans", "Scan a different shelf each time"],
        premium: false,
    },
    Template {
        title: "Critic's Corner",
        description: "Rate the recipes you cooked this week",
        category: "community",
        hashtag: "#SnapChefCritic",
        reward: Reward::new(45, 4),
        requirements: &["0/3 ratings", "Leave an honest note with each one"],
        premium: false,
    },
    Template {
        title: "Picture Perfect Plate",
        description: "Plate it like a pro and capture it",
        category: "presentation",
        hashtag: "#PlatingGoals",
        reward: Reward::new(55, 5),
        requirements: &["0/2 photos", "Natural light only"],
        premium: false,
    },
    Template {
        title: "Breakfast Remix",
        description: "Reinvent a breakfast classic with what you already have",
        category: "breakfast",
        hashtag: "#BreakfastRemix",
        reward: Reward::new(50, 5),
        requirements: &["0/1 recipes", "Ready before 10am"],
        premium: false,
    },
    Template {
        title: "Chef's Table",
        description: "Three courses, one evening, zero shopping trips",
        category: "premium",
        hashtag: "#ChefsTable",
        reward: Reward::new(150, 25),
        requirements: &["0/3 recipes", "Starter, main and dessert"],
        premium: true,
    },
];
