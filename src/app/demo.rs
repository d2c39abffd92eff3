use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::store::{entities::StoreSummary, record_store::RecordStore, storage::KeyValueStorage};

/// Sample entries, keyed by how many days ago they were logged.
pub const SAMPLE_ENTRIES: [(i64, [&str; 5]); 4] = [
    (
        0,
        [
            "صلاة الفجر في وقتها",
            "قراءة القرآن الكريم",
            "الاستغفار 100 مرة",
            "صدقة",
            "بر الوالدين",
        ],
    ),
    (
        1,
        [
            "صلاة العشاء في المسجد",
            "أذكار الصباح و المساء",
            "مساعدة جاري",
            "سبحان الله و بحمده 100 مرة",
            "الدعاء للمسلمين",
        ],
    ),
    (
        3,
        [
            "صلاة الفجر في جماعة",
            "التسبيح 33 مرة",
            "زيارة مريض",
            "إماطة أذى عن الطريق",
            "التواضع في المشي",
        ],
    ),
    (
        5,
        [
            "صلاة العصر في وقتها",
            "قراءة أذكار المساء",
            "إفشاء السلام",
            "صدقة",
            "طلب العلم",
        ],
    ),
];

/// Fills the store with a few days of sample entries. Entries already present on a day are not
/// added twice, so populating repeatedly is harmless. Returns the number of added entries.
pub fn populate_demo_data<S: KeyValueStorage>(
    store: &mut RecordStore<S>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut added = 0;
    for (days_ago, entries) in SAMPLE_ENTRIES {
        added += store.add_missing_entries_at(now - Duration::days(days_ago), &entries)?;
    }
    info!("Populated {added} demo entries");
    Ok(added)
}

pub fn clear_demo_data<S: KeyValueStorage>(store: &mut RecordStore<S>) -> Result<()> {
    info!("Clearing all records");
    store.clear()
}

pub fn demo_info<S: KeyValueStorage>(store: &mut RecordStore<S>) -> StoreSummary {
    store.summary()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, TimeZone, Utc};

    use crate::{
        store::{record_store::RecordStore, storage::MemoryStorage},
        utils::clock::ManualClock,
    };

    use super::{clear_demo_data, demo_info, populate_demo_data};

    #[test]
    fn test_populate_is_idempotent() -> Result<()> {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let mut store = RecordStore::load(MemoryStorage::new(), Box::new(ManualClock::new(now)));

        assert_eq!(populate_demo_data(&mut store, now)?, 20);
        assert_eq!(populate_demo_data(&mut store, now)?, 0);

        let info = demo_info(&mut store);
        assert_eq!(info.total_records, 4);
        assert_eq!(info.total_entries, 20);
        assert_eq!(info.oldest, Some(now - Duration::days(5)));
        assert_eq!(info.newest, Some(now));

        let mut days = store
            .all_entries()
            .into_iter()
            .map(|v| v.days_diff)
            .collect::<Vec<_>>();
        days.sort();
        days.dedup();
        assert_eq!(days, vec![0, 1, 3, 5]);

        clear_demo_data(&mut store)?;
        assert_eq!(demo_info(&mut store).total_records, 0);
        Ok(())
    }
}
