//! Viral rotation: short, shareable, trend-driven challenges.

use super::Template;
use crate::challenge::Reward;

pub(super) static TEMPLATES: &[Template] = &[
    Template {
        title: "Pasta Chips Trend",
        description: "Recreate the air-fried pasta chips everyone is posting",
        category: "trending",
        hashtag: "#PastaChips",
        reward: Reward::new(90, 12),
        requirements: &["0/1 recipes", "Share the result"],
        premium: false,
    },
    Template {
        title: "Cloud Bread Comeback",
        description: "Whip up the fluffiest cloud bread and post it",
        category: "trending",
        hashtag: "#CloudBread",
        reward: Reward::new(85, 10),
        requirements: &["0/2 photos", "Show the fluff"],
        premium: false,
    },
    Template {
        title: "Baked Feta Frenzy",
        description: "The baked feta pasta, your way",
        category: "trending",
        hashtag: "#BakedFeta",
        reward: Reward::new(95, 12),
        requirements: &["0/2 shares", "Add one twist of your own"],
        premium: false,
    },
    Template {
        title: "Five-Star Fridge Raid",
        description: "Turn a random fridge raid into something people love",
        category: "trending",
        hashtag: "#FridgeRaid",
        reward: Reward::new(160, 20),
        requirements: &["0/3 perfect ratings", "No recipe books"],
        premium: false,
    },
    Template {
        title: "Dalgona Everything",
        description: "Whipped coffee was just the start",
        category: "trending",
        hashtag: "#DalgonaEverything",
        reward: Reward::new(70, 9),
        requirements: &["0/2 recipes", "Must be whipped"],
        premium: false,
    },
    Template {
        title: "Speed Run Salad",
        description: "A salad worth posting, against the clock",
        category: "trending",
        hashtag: "#SpeedRunSalad",
        reward: Reward::new(75, 9),
        requirements: &["0/10 minutes on the clock", "Post the timer"],
        premium: false,
    },
];
