use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::{seq::SliceRandom, Rng};
use tracing::{instrument, trace};

use crate::store::entities::EntryView;

use super::locale::Language;

/// Largest rotation applied to an item, in degrees, in either direction.
pub const MAX_ROTATION_DEGREES: i8 = 5;

/// Number of faded tiers after the fresh one. Entries older than this are invisible.
pub const FADED_TIERS: u8 = 7;

/// Visual emphasis of an entry, derived from how many days old it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OpacityTier {
    /// Logged today.
    Fresh,
    /// Logged 1 to [FADED_TIERS] days ago. The value is the age in days.
    Faded(u8),
    /// Older than every tier. Only reachable with a retention window above [FADED_TIERS].
    Expired,
}

impl OpacityTier {
    pub fn from_days_diff(days_diff: u32) -> Self {
        match days_diff {
            0 => OpacityTier::Fresh,
            v if v <= FADED_TIERS as u32 => OpacityTier::Faded(v as u8),
            _ => OpacityTier::Expired,
        }
    }

    /// Opacity in percent. Each day of age removes 10 percent starting from 90.
    pub fn opacity_percent(&self) -> u8 {
        match self {
            OpacityTier::Fresh => 100,
            OpacityTier::Faded(days) => 100 - 10 * days,
            OpacityTier::Expired => 0,
        }
    }

    /// Css utility classes matching the tier, for web frontends.
    ///
    /// ```
    /// use gratitude::display::projector::OpacityTier;
    ///
    /// assert_eq!(OpacityTier::from_days_diff(3).css_class(), "opacity-70");
    /// assert_eq!(OpacityTier::from_days_diff(9).css_class(), "opacity-0");
    /// ```
    pub fn css_class(&self) -> String {
        match self {
            OpacityTier::Fresh => "opacity-100 text-primary-500 dark:text-white".into(),
            tier => format!("opacity-{}", tier.opacity_percent()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub text: String,
    pub tier: OpacityTier,
    /// Cosmetic rotation in degrees, within ±[MAX_ROTATION_DEGREES].
    pub rotation: i8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub heading: String,
    pub items: Vec<DisplayItem>,
}

/// Render-ready view of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Groups(Vec<DayGroup>),
    /// Nothing to show. Holds the localized hint to display instead.
    Placeholder(&'static str),
}

/// Groups entries by day and shuffles both the groups and the items inside each group. Every call
/// produces a fresh order and fresh rotations, which lets old entries resurface in new places.
///
/// `Tz` only affects how headings are written, grouping always happens by UTC day.
#[instrument(skip(entries, rng))]
pub fn project<Tz: TimeZone>(
    entries: Vec<EntryView>,
    language: Language,
    rng: &mut impl Rng,
) -> Projection
where
    DateTime<Tz>: From<DateTime<Utc>>,
    Tz::Offset: std::fmt::Display,
{
    if entries.is_empty() {
        return Projection::Placeholder(language.empty_list_text());
    }

    let mut by_day = BTreeMap::<NaiveDate, (DateTime<Utc>, Vec<EntryView>)>::new();
    for entry in entries {
        let (date, items) = by_day
            .entry(entry.day)
            .or_insert_with(|| (entry.date, vec![]));
        *date = (*date).min(entry.date);
        items.push(entry);
    }

    let mut groups = by_day
        .into_iter()
        .map(|(day, (date, entries))| {
            let mut items = entries
                .into_iter()
                .map(|entry| DisplayItem {
                    tier: OpacityTier::from_days_diff(entry.days_diff),
                    rotation: rng.gen_range(-MAX_ROTATION_DEGREES..=MAX_ROTATION_DEGREES),
                    text: entry.text,
                })
                .collect::<Vec<_>>();
            items.shuffle(rng);
            DayGroup {
                day,
                heading: DateTime::<Tz>::from(date)
                    .format(language.heading_format())
                    .to_string(),
                items,
            }
        })
        .collect::<Vec<_>>();

    groups.shuffle(rng);
    trace!("Projected {} groups", groups.len());
    Projection::Groups(groups)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{
        display::locale::Language, store::entities::EntryView, utils::time::utc_days_diff,
    };

    use super::{project, DayGroup, OpacityTier, Projection, MAX_ROTATION_DEGREES};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 18, 0, 0).unwrap()
    }

    fn entries() -> Vec<EntryView> {
        let mut entries = vec![];
        for days_ago in [0, 1, 3, 5] {
            let date = now() - Duration::days(days_ago);
            for index in 0..4 {
                entries.push(EntryView {
                    text: format!("entry {days_ago}-{index}"),
                    day: date.date_naive(),
                    date,
                    days_diff: utc_days_diff(date, now()),
                });
            }
        }
        entries
    }

    fn groups(projection: Projection) -> Vec<DayGroup> {
        match projection {
            Projection::Groups(groups) => groups,
            Projection::Placeholder(text) => panic!("Unexpected placeholder {text}"),
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(OpacityTier::from_days_diff(0), OpacityTier::Fresh);
        assert_eq!(OpacityTier::from_days_diff(8), OpacityTier::Expired);
        let percents = (0..=8)
            .map(|v| OpacityTier::from_days_diff(v).opacity_percent())
            .collect::<Vec<_>>();
        assert_eq!(percents, vec![100, 90, 80, 70, 60, 50, 40, 30, 0]);
        assert_eq!(OpacityTier::from_days_diff(3).css_class(), "opacity-70");
        assert!(OpacityTier::Fresh.css_class().starts_with("opacity-100"));
    }

    #[test]
    fn test_empty_gives_placeholder() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            project::<Utc>(vec![], Language::Ar, &mut rng),
            Projection::Placeholder(Language::Ar.empty_list_text())
        );
        assert_eq!(
            project::<Utc>(vec![], Language::En, &mut rng),
            Projection::Placeholder(Language::En.empty_list_text())
        );
    }

    #[test]
    fn test_grouping_keeps_every_entry() {
        let mut rng = StdRng::seed_from_u64(7);
        let groups = groups(project::<Utc>(entries(), Language::En, &mut rng));

        assert_eq!(groups.len(), 4);
        let mut seen = HashSet::new();
        for group in &groups {
            assert_eq!(group.items.len(), 4);
            for item in &group.items {
                assert!(item.text.starts_with("entry "));
                assert!(seen.insert(item.text.clone()));
                let days_ago: i64 = item.text[6..7].parse().unwrap();
                assert_eq!(group.day, (now() - Duration::days(days_ago)).date_naive());
                assert_eq!(item.tier, OpacityTier::from_days_diff(days_ago as u32));
            }
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_rotation_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            for group in groups(project::<Utc>(entries(), Language::En, &mut rng)) {
                for item in group.items {
                    assert!(item.rotation.abs() <= MAX_ROTATION_DEGREES);
                }
            }
        }
    }

    #[test]
    fn test_order_changes_between_calls() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut group_orders = HashSet::new();
        let mut item_orders = HashSet::new();
        for _ in 0..30 {
            let groups = groups(project::<Utc>(entries(), Language::En, &mut rng));
            group_orders.insert(groups.iter().map(|v| v.day).collect::<Vec<_>>());
            for group in groups {
                item_orders.insert(group.items.into_iter().map(|v| v.text).collect::<Vec<_>>());
            }
        }
        assert!(group_orders.len() > 1);
        // 4 groups, each should show more than one ordering of its items.
        assert!(item_orders.len() > 4);
    }

    #[test]
    fn test_heading_per_language() {
        let entry = EntryView {
            text: "late".into(),
            day: now().date_naive(),
            date: now(),
            days_diff: 0,
        };

        let mut rng = StdRng::seed_from_u64(0);
        let english = groups(project::<Utc>(vec![entry.clone()], Language::En, &mut rng));
        assert_eq!(english[0].heading, "Friday, March 7, 2025");

        let arabic = groups(project::<Utc>(vec![entry], Language::Ar, &mut rng));
        assert_eq!(arabic[0].heading, "2025/03/07");
        assert_eq!(arabic[0].day, NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
    }
}
