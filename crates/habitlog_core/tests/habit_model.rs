use chrono::{NaiveDate, TimeZone, Utc};
use habitlog_core::{decode_habits, encode_habits, seed_habits, Frequency, Habit, HabitId, NewHabit};

#[test]
fn serialization_uses_camel_case_wire_fields() {
    let created = Utc.with_ymd_and_hms(2025, 10, 15, 8, 0, 0).unwrap();
    let input = NewHabit {
        frequency: Some(Frequency::Daily),
        goal: Some("8 hours".to_string()),
        ..NewHabit::named("sleep 8hrs")
    };
    let mut habit = Habit::create(HabitId::new("1760515200000"), input, created).unwrap();
    habit.toggle_completion(NaiveDate::from_ymd_opt(2025, 10, 14).unwrap());

    let json = serde_json::to_value(&habit).unwrap();
    assert_eq!(json["id"], "1760515200000");
    assert_eq!(json["name"], "sleep 8hrs");
    assert_eq!(json["done"], false);
    assert_eq!(json["frequency"], "Daily");
    assert_eq!(json["goal"], "8 hours");
    assert_eq!(json["createdAt"], "2025-10-15T08:00:00Z");
    assert_eq!(json["completions"], serde_json::json!(["2025-10-14"]));
    assert!(json.get("notes").is_none());

    let decoded: Habit = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, habit);
}

#[test]
fn script_style_timestamps_decode() {
    let habits = decode_habits(
        r#"[{"id":"2","name":"Drink 2L of water","done":false,"createdAt":"2025-10-15T08:00:00.123Z"}]"#,
    )
    .unwrap();
    let created = habits[0].created_at.unwrap();
    assert_eq!(created.timestamp_millis() % 1000, 123);
}

#[test]
fn encoded_collection_round_trips_in_order() {
    let now = Utc.with_ymd_and_hms(2025, 10, 15, 8, 0, 0).unwrap();
    let mut habits = seed_habits(now);
    habits.push(Habit::create(HabitId::generate(), NewHabit::named("stretch"), now).unwrap());

    let decoded = decode_habits(&encode_habits(&habits).unwrap()).unwrap();
    assert_eq!(decoded, habits);
}

#[test]
fn generated_ids_are_distinct_and_non_empty() {
    let a = HabitId::generate();
    let b = HabitId::generate();
    assert_ne!(a, b);
    assert!(!a.as_str().is_empty());
}
