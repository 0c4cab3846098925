use birthday_core::{
    BirthdayDescriptor, BirthdayRecord, BirthdayValidationError, CalendarError, CalendarKind,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn record_new_sets_defaults() {
    let record = BirthdayRecord::new("Mom", BirthdayDescriptor::lunar(8, 15, false), None).unwrap();

    assert!(!record.id.is_nil());
    assert_eq!(record.name, "Mom");
    assert_eq!(record.calendar, CalendarKind::Lunar);
    assert_eq!((record.month, record.day), (8, 15));
    assert!(!record.leap_month);
    assert_eq!(record.note, None);
}

#[test]
fn record_rejects_nil_id_and_blank_name() {
    assert_eq!(
        BirthdayRecord::with_id(Uuid::nil(), "x", BirthdayDescriptor::solar(1, 1), None)
            .unwrap_err(),
        BirthdayValidationError::NilId
    );
    assert_eq!(
        BirthdayRecord::new(" \t ", BirthdayDescriptor::solar(1, 1), None).unwrap_err(),
        BirthdayValidationError::EmptyName
    );
}

#[test]
fn record_rejects_leap_flag_on_solar_birthday() {
    let err = BirthdayRecord::new(
        "x",
        BirthdayDescriptor {
            calendar: CalendarKind::Solar,
            month: 5,
            day: 1,
            leap_month: true,
        },
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BirthdayValidationError::Date(CalendarError::InvalidDescriptor {
            calendar: CalendarKind::Solar,
            ..
        })
    ));
}

#[test]
fn birthday_label_formats_calendar_and_date() {
    let solar = BirthdayRecord::new("a", BirthdayDescriptor::solar(2, 9), None).unwrap();
    let lunar = BirthdayRecord::new("b", BirthdayDescriptor::lunar(12, 30, false), None).unwrap();

    assert_eq!(solar.birthday_label(), "阳历 02-09");
    assert_eq!(lunar.birthday_label(), "农历 12-30");
}

#[test]
fn record_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let record = BirthdayRecord::with_id(
        id,
        "Grandma",
        BirthdayDescriptor::lunar(4, 12, true),
        Some("dumplings".to_string()),
    )
    .unwrap();

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["id"], id.to_string());
    assert_eq!(value["name"], "Grandma");
    assert_eq!(value["calendar"], "lunar");
    assert_eq!(value["month"], 4);
    assert_eq!(value["day"], 12);
    assert_eq!(value["leap_month"], true);
    assert_eq!(value["note"], "dumplings");

    let decoded: BirthdayRecord = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn deserialization_defaults_optional_fields() {
    let decoded: BirthdayRecord = serde_json::from_value(json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "  Dad ",
        "calendar": "solar",
        "month": 6,
        "day": 1
    }))
    .unwrap();

    assert_eq!(decoded.name, "Dad");
    assert!(!decoded.leap_month);
    assert_eq!(decoded.note, None);
}

#[test]
fn deserialization_rejects_invalid_records() {
    let bad_day = serde_json::from_value::<BirthdayRecord>(json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "x",
        "calendar": "solar",
        "month": 2,
        "day": 30
    }));
    assert!(bad_day.is_err());

    let bad_calendar = serde_json::from_value::<BirthdayRecord>(json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "x",
        "calendar": "hebrew",
        "month": 1,
        "day": 1
    }));
    assert!(bad_calendar.is_err());

    let blank_name = serde_json::from_value::<BirthdayRecord>(json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": " ",
        "calendar": "lunar",
        "month": 1,
        "day": 1
    }));
    assert!(blank_name.is_err());
}
