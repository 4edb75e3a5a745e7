use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use htn_schedule::{
    query::{filter_by_permission, filter_by_type, search, sort_by_start_time},
    Event, EventType, Permission, Query, TypeFilter,
};

const WORDS: [&str; 6] = ["Rust", "rust", "Intro", "Workshop", "Yoga", "café"];

fn instant(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 12, 9, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

fn event_type() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::Workshop),
        Just(EventType::Activity),
        Just(EventType::TechTalk),
        Just(EventType::Other("food".into())),
    ]
}

fn permission() -> impl Strategy<Value = Permission> {
    prop_oneof![
        Just(Permission::Public),
        Just(Permission::Private),
        Just(Permission::Other("staff".into())),
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS.to_vec()), 0..3).prop_map(|words| words.join(" "))
}

prop_compose! {
    fn any_event()(
        id in any::<i64>(),
        name in text(),
        description in prop::option::of(text()),
        event_type in event_type(),
        permission in permission(),
        start in 0i64..48,
        length in prop::option::of(0i64..180),
    ) -> Event {
        Event {
            id,
            name,
            description,
            event_type,
            permission,
            // Coarse starts so ties are common.
            start_time: instant(start * 30),
            end_time: length.map(|length| instant(start * 30 + length)),
            speakers: Vec::new(),
            public_url: None,
            private_url: None,
            related_events: Vec::new(),
        }
    }
}

/// Tags every event with its input position so stability is observable.
fn schedule() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(any_event(), 0..24).prop_map(|events| {
        events
            .into_iter()
            .enumerate()
            .map(|(position, event)| Event {
                id: position as i64,
                ..event
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn anonymous_output_has_no_private_events(events in schedule()) {
        prop_assert!(filter_by_permission(&events, false).iter().all(|event| !event.is_private()));
        prop_assert_eq!(filter_by_permission(&events, true), events);
    }

    #[test]
    fn sort_is_a_stable_ordered_permutation(events in schedule()) {
        let sorted = sort_by_start_time(&events);
        prop_assert_eq!(sorted.len(), events.len());

        for pair in sorted.windows(2) {
            prop_assert!(pair[0].start_time <= pair[1].start_time);
            if pair[0].start_time == pair[1].start_time {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }

        let mut ids = sorted.iter().map(|event| event.id).collect::<Vec<_>>();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..events.len() as i64).collect::<Vec<_>>());
    }

    #[test]
    fn empty_search_is_identity(events in schedule()) {
        prop_assert_eq!(search(&events, ""), events);
    }

    #[test]
    fn search_only_keeps_textual_matches(events in schedule(), query in prop::sample::select(WORDS.to_vec())) {
        let needle = query.to_lowercase();
        let found = search(&events, query);

        for event in &found {
            let by_name = event.name.to_lowercase().contains(&needle);
            let by_description = event
                .description
                .as_ref()
                .is_some_and(|description| description.to_lowercase().contains(&needle));
            prop_assert!(by_name || by_description);
        }

        let expected = events
            .iter()
            .filter(|event| {
                event.name.to_lowercase().contains(&needle)
                    || event.description.as_deref().unwrap_or("").to_lowercase().contains(&needle)
            })
            .count();
        prop_assert_eq!(found.len(), expected);
    }

    #[test]
    fn type_and_search_commute(
        events in schedule(),
        event_type in event_type(),
        query in prop::sample::select(WORDS.to_vec()),
    ) {
        let filter = TypeFilter::Only(event_type);
        let typed_first = search(&filter_by_type(&events, &filter), query);
        let searched_first = filter_by_type(&search(&events, query), &filter);
        prop_assert_eq!(typed_first, searched_first);
    }

    #[test]
    fn pipeline_output_is_sorted_and_permitted(events in schedule(), query in text()) {
        let output = Query::new(false).with_text(query).apply(&events);

        prop_assert!(output.iter().all(|event| !event.is_private()));
        prop_assert!(output.windows(2).all(|pair| pair[0].start_time <= pair[1].start_time));
    }
}
