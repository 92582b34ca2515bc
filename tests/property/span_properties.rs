// Span edits and span clears over random ranges

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use month_planner::models::document::Document;
use month_planner::models::edit::EventEdit;
use month_planner::models::event::CellKey;
use month_planner::services::event::EventService;
use proptest::prelude::*;

use crate::fixtures::dates::ymd;

fn empty_doc() -> Document {
    Document::with_defaults(ymd(2024, 1, 1), false)
}

fn date_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0i64..700, 0i64..45).prop_map(|(offset, len)| {
        let start = ymd(2024, 1, 1) + Duration::days(offset);
        (start, start + Duration::days(len))
    })
}

proptest! {
    /// Property: a span edit writes exactly one record per covered date, all
    /// sharing one span id and identical content
    #[test]
    fn prop_span_edit_one_record_per_date(
        (start, end) in date_range(),
        title in "[A-Za-z ]{1,12}",
        memo in "[a-z]{0,8}",
        reversed in any::<bool>(),
    ) {
        let mut doc = empty_doc();
        let (from, to) = if reversed { (end, start) } else { (start, end) };
        let edit = EventEdit::titled(title).memo(memo).dates(from, to);
        let cell = CellKey::new(start, "c1");

        EventService::new(&mut doc).save(&cell, &edit);

        let days = (end - start).num_days() as usize + 1;
        prop_assert_eq!(doc.events.len(), days);
        let first = doc.events.values().next().unwrap();
        let span_ids: HashSet<_> = doc.events.values().map(|r| r.span_id.clone()).collect();
        prop_assert_eq!(span_ids.len(), 1);
        for (key, record) in &doc.events {
            prop_assert!(key.date >= start && key.date <= end);
            prop_assert_eq!(&key.column_id, "c1");
            prop_assert_eq!(&record.title, &first.title);
            prop_assert_eq!(&record.memo, &first.memo);
            if days > 1 {
                prop_assert_eq!(record.span_start, Some(start));
                prop_assert_eq!(record.span_end, Some(end));
            }
        }
    }

    /// Property: clearing a span removes that span's records and nothing else
    #[test]
    fn prop_clear_span_removes_only_that_span(
        (start, end) in date_range(),
        neighbour_offset in 0i64..60,
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(start != end);
        let mut doc = empty_doc();
        let cell = CellKey::new(start, "c1");
        EventService::new(&mut doc)
            .save(&cell, &EventEdit::titled("Trip").dates(start, end));

        // an unrelated single record in another column on an overlapping date
        let other = CellKey::new(start + Duration::days(neighbour_offset), "c2");
        EventService::new(&mut doc).save(&other, &EventEdit::titled("Other"));

        let members: Vec<CellKey> = doc
            .events
            .keys()
            .filter(|k| k.column_id == "c1")
            .cloned()
            .collect();
        let target = pick.get(&members).clone();

        let removed = EventService::new(&mut doc).clear_span(&target);

        prop_assert_eq!(removed, members.len());
        prop_assert_eq!(doc.events.len(), 1);
        prop_assert!(doc.events.contains_key(&other));
    }
}
