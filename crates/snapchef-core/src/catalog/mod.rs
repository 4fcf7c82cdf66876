//! Static challenge template tables.
//!
//! Pure data. Rotating cadences are looked up by index (the schedule engine
//! picks the index), special templates by calendar month/day and seasonal
//! templates by day-of-year range. A missing special or seasonal template is
//! a normal `None`.

mod daily;
mod special;
mod viral;
mod weekly;

use crate::challenge::{Cadence, Reward};

/// Bumped whenever template content changes in a way that alters ids or
/// rewards of already-generated challenges.
pub const CATALOG_VERSION: u32 = 3;

/// One challenge blueprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Template {
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub hashtag: &'static str,
    pub reward: Reward,
    /// First parseable entry is the tracked goal, the rest are house rules.
    pub requirements: &'static [&'static str],
    pub premium: bool,
}

/// Template pinned to a calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialTemplate {
    pub month: u32,
    pub day: u32,
    pub template: Template,
}

/// Template that runs over a day-of-year range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalTemplate {
    pub first_day: u32,
    pub last_day: u32,
    pub template: Template,
}

impl SeasonalTemplate {
    pub fn covers(&self, day_of_year: u32) -> bool {
        (self.first_day..=self.last_day).contains(&day_of_year)
    }
}

/// Read-only lookup over the built-in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCatalog;

impl TemplateCatalog {
    /// Ordered templates for a rotating cadence.
    ///
    /// Special and seasonal cadences are date-pinned and return an empty
    /// slice here; use [`special_template_for`](Self::special_template_for)
    /// and [`seasonal_template_for`](Self::seasonal_template_for).
    pub fn templates_for(&self, cadence: Cadence) -> &'static [Template] {
        match cadence {
            Cadence::Daily => daily::TEMPLATES,
            Cadence::Weekly => weekly::WEEKLY,
            Cadence::Weekend => weekly::WEEKEND,
            Cadence::Viral => viral::TEMPLATES,
            Cadence::Special | Cadence::Seasonal => &[],
        }
    }

    pub fn special_template_for(&self, month: u32, day: u32) -> Option<&'static SpecialTemplate> {
        special::SPECIAL
            .iter()
            .find(|s| s.month == month && s.day == day)
    }

    pub fn seasonal_template_for(&self, day_of_year: u32) -> Option<&'static SeasonalTemplate> {
        special::SEASONAL.iter().find(|s| s.covers(day_of_year))
    }

    pub fn specials(&self) -> &'static [SpecialTemplate] {
        special::SPECIAL
    }

    pub fn seasonals(&self) -> &'static [SeasonalTemplate] {
        special::SEASONAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Requirement;

    #[test]
    fn rotating_cadences_are_non_empty() {
        let catalog = TemplateCatalog;
        for cadence in [Cadence::Daily, Cadence::Weekly, Cadence::Weekend, Cadence::Viral] {
            assert!(!catalog.templates_for(cadence).is_empty(), "{cadence}");
        }
        assert!(catalog.templates_for(Cadence::Special).is_empty());
    }

    #[test]
    fn every_template_has_parseable_goal() {
        let catalog = TemplateCatalog;
        let all = Cadence::ALL
            .iter()
            .flat_map(|c| catalog.templates_for(*c).iter())
            .chain(catalog.specials().iter().map(|s| &s.template))
            .chain(catalog.seasonals().iter().map(|s| &s.template));
        for t in all {
            let goal = Requirement::parse(t.requirements[0]);
            assert!(
                t.requirements[0].contains('/'),
                "{}: goal '{}' is not a count/target",
                t.title,
                t.requirements[0]
            );
            assert!(goal.target >= 1);
            assert!(t.reward.points > 0, "{}", t.title);
        }
    }

    #[test]
    fn special_lookup_by_month_day() {
        let catalog = TemplateCatalog;
        let valentines = catalog.special_template_for(2, 14).unwrap();
        assert_eq!(valentines.template.category, "romance");
        assert!(catalog.special_template_for(2, 15).is_none());
    }

    #[test]
    fn seasonal_ranges_do_not_overlap() {
        let catalog = TemplateCatalog;
        for day in 1..=366 {
            let hits = catalog.seasonals().iter().filter(|s| s.covers(day)).count();
            assert!(hits <= 1, "day {day} has {hits} seasonal templates");
        }
        assert!(catalog.seasonal_template_for(80).is_some());
        assert!(catalog.seasonal_template_for(1).is_none());
    }
}
