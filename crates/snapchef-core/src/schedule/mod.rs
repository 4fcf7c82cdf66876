//! Deterministic challenge generation.
//!
//! The schedule engine is a pure function from a calendar date and a cadence
//! to a concrete [`Challenge`]. Same inputs, same challenge: id, window,
//! reward and the informational counters are all derived from the date.
//! Nothing here reads the clock.
//!
//! ## Anchoring
//!
//! Some cadences span several days. Weekly challenges are anchored to the
//! Monday of their week, weekend challenges to the Saturday, seasonal
//! challenges to the first day of their range. Generating from any day inside
//! the anchor period yields the same challenge, so callers can regenerate
//! every day of a window and de-duplicate by id.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::catalog::{Template, TemplateCatalog};
use crate::challenge::{Cadence, Challenge, ChallengeState, Difficulty, MilestoneSet, Requirement};

/// Start-time stagger in hours after the anchor day's UTC midnight.
///
/// Keeps challenges of different cadences from opening and closing at the
/// same instant.
const STAGGER_HOURS: [i64; 12] = [0, 3, 6, 9, 1, 4, 7, 10, 2, 5, 8, 11];

/// Stateless generator over a [`TemplateCatalog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleEngine {
    catalog: TemplateCatalog,
}

impl ScheduleEngine {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Generate the primary challenge of `cadence` for a day.
    ///
    /// `day_of_year` is wrapped into the year's valid range first. Returns
    /// `None` when the cadence has nothing that day (weekday for weekend,
    /// no special/seasonal match) or when the year is not representable.
    pub fn generate(&self, cadence: Cadence, day_of_year: u32, year: i32) -> Option<Challenge> {
        self.generate_slot(cadence, day_of_year, year, 0)
    }

    /// Generate a specific slot of a multi-slot cadence.
    pub fn generate_slot(
        &self,
        cadence: Cadence,
        day_of_year: u32,
        year: i32,
        slot: u32,
    ) -> Option<Challenge> {
        if slot >= cadence.slots() {
            return None;
        }
        let date = date_from_ordinal(year, day_of_year)?;
        let day = date.ordinal();

        let (anchor, template, difficulty) = match cadence {
            Cadence::Daily => {
                let index = if slot == 0 { day } else { day * 3 + 1 };
                let template = pick(self.catalog.templates_for(cadence), index)?;
                (date, template, Difficulty::from_reward_points(template.reward.points))
            }
            Cadence::Weekly => {
                let anchor =
                    date - Duration::days(date.weekday().num_days_from_monday() as i64);
                let template = pick(self.catalog.templates_for(cadence), anchor.ordinal() / 7)?;
                (anchor, template, Difficulty::Hard)
            }
            Cadence::Weekend => {
                let anchor = match date.weekday() {
                    Weekday::Sat => date,
                    Weekday::Sun => date - Duration::days(1),
                    _ => return None,
                };
                let template = pick(self.catalog.templates_for(cadence), anchor.ordinal() / 7)?;
                (anchor, template, Difficulty::Medium)
            }
            Cadence::Viral => {
                let template = pick(self.catalog.templates_for(cadence), day * 7)?;
                (date, template, Difficulty::from_reward_points(template.reward.points))
            }
            Cadence::Special => {
                let special = self.catalog.special_template_for(date.month(), date.day())?;
                let template = &special.template;
                (date, template, Difficulty::from_reward_points(template.reward.points))
            }
            Cadence::Seasonal => {
                let seasonal = self.catalog.seasonal_template_for(day)?;
                let anchor = date_from_ordinal(date.year(), seasonal.first_day)?;
                (anchor, &seasonal.template, Difficulty::Master)
            }
        };

        build(cadence, slot, anchor, template, difficulty)
    }

    /// Every challenge whose generation covers `date`, across all cadences
    /// and slots.
    pub fn generate_for_date(&self, date: NaiveDate) -> Vec<Challenge> {
        Cadence::ALL
            .iter()
            .flat_map(|cadence| {
                (0..cadence.slots()).filter_map(move |slot| {
                    self.generate_slot(*cadence, date.ordinal(), date.year(), slot)
                })
            })
            .collect()
    }
}

/// Wrap `day_of_year` into `[1, days_in_year]` and build the date.
pub fn date_from_ordinal(year: i32, day_of_year: u32) -> Option<NaiveDate> {
    let days_in_year = NaiveDate::from_ymd_opt(year, 12, 31)?.ordinal() as i64;
    let day = ((day_of_year as i64 - 1).rem_euclid(days_in_year) + 1) as u32;
    NaiveDate::from_yo_opt(year, day)
}

fn pick(templates: &'static [Template], index: u32) -> Option<&'static Template> {
    if templates.is_empty() {
        return None;
    }
    templates.get(index as usize % templates.len())
}

fn salt(cadence: Cadence, slot: u32) -> u32 {
    let base = match cadence {
        Cadence::Daily => 0,
        Cadence::Weekly => 3,
        Cadence::Weekend => 5,
        Cadence::Viral => 7,
        Cadence::Special => 11,
        Cadence::Seasonal => 13,
    };
    base + slot * 6
}

fn build(
    cadence: Cadence,
    slot: u32,
    anchor: NaiveDate,
    template: &Template,
    difficulty: Difficulty,
) -> Option<Challenge> {
    let day = anchor.ordinal();
    let year = anchor.year();
    let salt = salt(cadence, slot);

    let offset = STAGGER_HOURS[(day + salt) as usize % STAGGER_HOURS.len()];
    let starts_at = anchor.and_hms_opt(0, 0, 0)?.and_utc() + Duration::hours(offset);
    let ends_at = starts_at + difficulty.duration();

    let id = if slot == 0 {
        format!("{cadence}-{day}-{year}")
    } else {
        format!("{cadence}-{day}-{year}-{}", slot + 1)
    };

    let (participants, completions) = seeded_counters(cadence, day, year, salt);
    let requirements: Vec<String> = template.requirements.iter().map(|r| r.to_string()).collect();
    let goal = Requirement::from_list(&requirements);

    Some(Challenge {
        id,
        cadence,
        title: template.title.to_string(),
        description: template.description.to_string(),
        category: template.category.to_string(),
        hashtag: template.hashtag.to_string(),
        difficulty,
        reward: template.reward,
        starts_at,
        ends_at,
        requirements,
        goal,
        units: 0,
        progress: 0.0,
        state: ChallengeState::Available,
        milestones: MilestoneSet::default(),
        participants,
        completions,
        is_premium: template.premium,
        joined_at: None,
        completed_at: None,
        awarded: None,
    })
}

/// Display-only participant/completion numbers, reproducible per day.
fn seeded_counters(cadence: Cadence, day: u32, year: i32, salt: u32) -> (u32, u32) {
    let seed = ((year as u32 as u64) << 32) | ((day as u64) << 8) | salt as u64;
    let mut rng = Pcg32::seed_from_u64(seed);
    let participants = match cadence {
        Cadence::Daily => rng.gen_range(500u32..5_000),
        Cadence::Weekly => rng.gen_range(2_000u32..15_000),
        Cadence::Weekend => rng.gen_range(800u32..6_000),
        Cadence::Viral => rng.gen_range(5_000u32..50_000),
        Cadence::Special => rng.gen_range(3_000u32..20_000),
        Cadence::Seasonal => rng.gen_range(10_000u32..80_000),
    };
    let completion_pct = rng.gen_range(10u32..=45);
    (participants, participants * completion_pct / 100)
}
