//! Date-pinned specials and day-of-year seasonal runs.

use super::{SeasonalTemplate, SpecialTemplate, Template};
use crate::challenge::Reward;

pub(super) static SPECIAL: &[SpecialTemplate] = &[
    SpecialTemplate {
        month: 1,
        day: 1,
        template: Template {
            title: "Fresh Start Feast",
            description: "Kick off the year with a clean-out-the-fridge feast",
            category: "holiday",
            hashtag: "#FreshStartFeast",
            reward: Reward::new(150, 20),
            requirements: &["0/2 recipes", "Use the oldest items first"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 2,
        day: 14,
        template: Template {
            title: "Dinner for Two",
            description: "A romantic dinner made from what's already at home",
            category: "romance",
            hashtag: "#DinnerForTwo",
            reward: Reward::new(180, 25),
            requirements: &["0/2 recipes", "Candles optional, dessert mandatory"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 3,
        day: 14,
        template: Template {
            title: "Pi Day Pies",
            description: "Sweet or savory, it has to be round",
            category: "baking",
            hashtag: "#PiDayPies",
            reward: Reward::new(120, 15),
            requirements: &["0/1 recipes", "Show the lattice"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 4,
        day: 22,
        template: Template {
            title: "Earth Day Zero Waste",
            description: "Root to stem, nothing goes in the bin",
            category: "sustainability",
            hashtag: "#EarthDayKitchen",
            reward: Reward::new(200, 30),
            requirements: &["0/3 recipes", "Compost what you can't cook"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 7,
        day: 4,
        template: Template {
            title: "Backyard Cookout",
            description: "Fire up the grill with fridge finds",
            category: "holiday",
            hashtag: "#BackyardCookout",
            reward: Reward::new(160, 20),
            requirements: &["0/3 photos", "At least one grilled vegetable"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 10,
        day: 16,
        template: Template {
            title: "World Food Day",
            description: "Cook a dish from a country you've never cooked from",
            category: "cuisine",
            hashtag: "#WorldFoodDay",
            reward: Reward::new(220, 30),
            requirements: &["0/2 recipes", "Share where it comes from"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 10,
        day: 31,
        template: Template {
            title: "Spooky Snacks",
            description: "Make your snacks scary",
            category: "holiday",
            hashtag: "#SpookySnacks",
            reward: Reward::new(140, 18),
            requirements: &["0/3 shares", "Costumes encouraged"],
            premium: false,
        },
    },
    SpecialTemplate {
        month: 12,
        day: 24,
        template: Template {
            title: "Holiday Feast",
            description: "The big one: a holiday table from your own pantry",
            category: "holiday",
            hashtag: "#HolidayFeast",
            reward: Reward::new(400, 50),
            requirements: &["0/4 recipes", "Make enough for leftovers"],
            premium: true,
        },
    },
];

pub(super) static SEASONAL: &[SeasonalTemplate] = &[
    SeasonalTemplate {
        first_day: 79,
        last_day: 92,
        template: Template {
            title: "Spring Greens",
            description: "Celebrate the first tender vegetables of spring",
            category: "seasonal",
            hashtag: "#SpringGreens",
            reward: Reward::new(600, 60),
            requirements: &["0/8 recipes", "Something green on every plate"],
            premium: false,
        },
    },
    SeasonalTemplate {
        first_day: 172,
        last_day: 185,
        template: Template {
            title: "Summer No-Cook Series",
            description: "Too hot to cook? Assemble instead",
            category: "seasonal",
            hashtag: "#NoCookSummer",
            reward: Reward::new(600, 60),
            requirements: &["0/10 photos", "Stove stays off"],
            premium: false,
        },
    },
    SeasonalTemplate {
        first_day: 265,
        last_day: 278,
        template: Template {
            title: "Harvest Table",
            description: "Squash, apples, roots: cook the autumn harvest",
            category: "seasonal",
            hashtag: "#HarvestTable",
            reward: Reward::new(650, 65),
            requirements: &["0/8 recipes", "One dish must be preserved"],
            premium: false,
        },
    },
    SeasonalTemplate {
        first_day: 335,
        last_day: 348,
        template: Template {
            title: "Holiday Baking Marathon",
            description: "Cookies, breads and cakes for every gathering",
            category: "seasonal",
            hashtag: "#BakingMarathon",
            reward: Reward::new(700, 70),
            requirements: &["0/12 perfect ratings", "Everything from scratch"],
            premium: true,
        },
    },
];
