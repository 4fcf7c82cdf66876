//! Weekly and weekend rotations.

use super::Template;
use crate::challenge::Reward;

pub(super) static WEEKLY: &[Template] = &[
    Template {
        title: "Zero Waste Week",
        description: "Cook through the week without throwing food away",
        category: "sustainability",
        hashtag: "#ZeroWasteWeek",
        reward: Reward::new(200, 20),
        requirements: &["0/5 recipes", "Use what you have before it spoils"],
        premium: false,
    },
    Template {
        title: "Meal Prep Master",
        description: "Prep a week of lunches from a single fridge haul",
        category: "planning",
        hashtag: "#MealPrepMaster",
        reward: Reward::new(250, 25),
        requirements: &["0/7 meals", "Portion into containers"],
        premium: false,
    },
    Template {
        title: "Community Taste Test",
        description: "Help other cooks by rating their creations",
        category: "community",
        hashtag: "#TasteTest",
        reward: Reward::new(180, 18),
        requirements: &["0/10 ratings", "Be kind, be specific"],
        premium: false,
    },
    Template {
        title: "Spread the Flavor",
        description: "Share your best recipes with friends",
        category: "social",
        hashtag: "#SpreadTheFlavor",
        reward: Reward::new(220, 22),
        requirements: &["0/5 shares", "Tag a friend who should cook it"],
        premium: false,
    },
    Template {
        title: "Plant Power Week",
        description: "Go fully plant-based for your home cooking",
        category: "healthy",
        hashtag: "#PlantPower",
        reward: Reward::new(300, 30),
        requirements: &["0/6 recipes", "No meat, no dairy"],
        premium: true,
    },
    Template {
        title: "Gallery Week",
        description: "Build a photo diary of everything you cook",
        category: "presentation",
        hashtag: "#CookingDiary",
        reward: Reward::new(190, 19),
        requirements: &["0/7 photos", "One plate per day"],
        premium: false,
    },
];

pub(super) static WEEKEND: &[Template] = &[
    Template {
        title: "Brunch Club",
        description: "Host a weekend brunch from fridge leftovers",
        category: "social",
        hashtag: "#BrunchClub",
        reward: Reward::new(120, 12),
        requirements: &["0/2 recipes", "Feed at least two people"],
        premium: false,
    },
    Template {
        title: "Slow Cook Sunday",
        description: "Low and slow: a dish that takes its time",
        category: "technique",
        hashtag: "#SlowCookSunday",
        reward: Reward::new(140, 14),
        requirements: &["0/90 minutes of simmering", "No pressure cookers"],
        premium: false,
    },
    Template {
        title: "Bake Off",
        description: "Bake something from scratch and let people judge",
        category: "baking",
        hashtag: "#WeekendBakeOff",
        reward: Reward::new(130, 13),
        requirements: &["0/3 perfect ratings", "From scratch only"],
        premium: false,
    },
    Template {
        title: "Market Haul",
        description: "Scan your market finds and cook the freshest one",
        category: "discovery",
        hashtag: "#MarketHaul",
        reward: Reward::new(110, 11),
        requirements: &["0/2 fridge scans", "Local produce preferred"],
        premium: false,
    },
    Template {
        title: "Family Feast",
        description: "Cook a spread big enough for the whole table",
        category: "social",
        hashtag: "#FamilyFeast",
        reward: Reward::new(160, 16),
        requirements: &["0/4 recipes", "Everyone gets a dish they love"],
        premium: false,
    },
];
