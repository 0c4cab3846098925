use birthday_core::calendar::{days_in_solar_month, solar_to_lunar_with, LunarTable, LunarYear};
use birthday_core::{
    is_leap_year, resolve_solar_date, resolve_solar_date_with, solar_to_lunar, BirthdayDescriptor,
    CalendarError, CalendarKind, DayOverflowPolicy, LunarDate, DAY_OVERFLOW_POLICY,
};
use chrono::NaiveDate;
use std::ops::RangeInclusive;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn solar_dates_resolve_to_same_month_and_day() {
    for year in [1999, 2000, 2023, 2024, 2100] {
        for (month, day) in [(1, 1), (3, 31), (6, 15), (8, 19), (12, 31)] {
            let date = resolve_solar_date(&BirthdayDescriptor::solar(month, day), year).unwrap();
            assert_eq!(date, ymd(year, month, day));
        }
    }
}

#[test]
fn feb_29_falls_back_to_feb_28_in_common_years() {
    let leap_day = BirthdayDescriptor::solar(2, 29);

    assert_eq!(resolve_solar_date(&leap_day, 2024).unwrap(), ymd(2024, 2, 29));
    assert_eq!(resolve_solar_date(&leap_day, 2000).unwrap(), ymd(2000, 2, 29));
    assert_eq!(resolve_solar_date(&leap_day, 2023).unwrap(), ymd(2023, 2, 28));
    assert_eq!(resolve_solar_date(&leap_day, 1900).unwrap(), ymd(1900, 2, 28));
    assert_eq!(resolve_solar_date(&leap_day, 2100).unwrap(), ymd(2100, 2, 28));
}

#[test]
fn gregorian_leap_year_rule() {
    assert!(is_leap_year(2024));
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert!(is_leap_year(2400));
    assert!(!is_leap_year(2100));

    assert_eq!(days_in_solar_month(2024, 2), 29);
    assert_eq!(days_in_solar_month(2100, 2), 28);
    assert_eq!(days_in_solar_month(2023, 4), 30);
    assert_eq!(days_in_solar_month(2000, 2), 29);
    assert_eq!(days_in_solar_month(2024, 12), 31);
    assert_eq!(days_in_solar_month(2023, 13), 0);
}

#[test]
fn lunar_dates_follow_the_table() {
    // Spring Festival, Mid-Autumn Festival and the 11th month crossing into
    // the next solar year.
    let cases = [
        (BirthdayDescriptor::lunar(1, 1, false), 2024, ymd(2024, 2, 10)),
        (BirthdayDescriptor::lunar(8, 15, false), 2024, ymd(2024, 9, 17)),
        (BirthdayDescriptor::lunar(8, 15, false), 2025, ymd(2025, 10, 6)),
        (BirthdayDescriptor::lunar(11, 17, false), 2017, ymd(2018, 1, 3)),
        (BirthdayDescriptor::lunar(6, 29, false), 2017, ymd(2017, 7, 22)),
    ];
    for (descriptor, year, expected) in cases {
        assert_eq!(
            resolve_solar_date(&descriptor, year).unwrap(),
            expected,
            "{descriptor:?} in {year}"
        );
    }
}

#[test]
fn leap_month_birthday_uses_leap_month_when_it_exists() {
    // 2020 has a leap 4th month.
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(4, 12, true), 2020).unwrap(),
        ymd(2020, 6, 3)
    );
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(4, 12, false), 2020).unwrap(),
        ymd(2020, 5, 4)
    );
}

#[test]
fn leap_month_birthday_falls_back_to_ordinary_month() {
    // 2023 has a leap 2nd month, 2024 has none.
    for year in [2023, 2024] {
        let leap = resolve_solar_date(&BirthdayDescriptor::lunar(4, 12, true), year).unwrap();
        let ordinary = resolve_solar_date(&BirthdayDescriptor::lunar(4, 12, false), year).unwrap();
        assert_eq!(leap, ordinary, "{year}");
    }
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(4, 12, true), 2023).unwrap(),
        ymd(2023, 5, 30)
    );
}

#[test]
fn lunar_day_overflow_clamps_to_last_day_of_month() {
    assert_eq!(DAY_OVERFLOW_POLICY, DayOverflowPolicy::Clamp);

    // 12th month of lunar 2024 has 29 days: day 30 is observed on New Year's Eve.
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(12, 30, false), 2024).unwrap(),
        ymd(2025, 1, 28)
    );
    // Ordinary 6th month of 2017 has 29 days, its leap month has 30.
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(6, 30, false), 2017).unwrap(),
        ymd(2017, 7, 22)
    );
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(6, 30, true), 2017).unwrap(),
        ymd(2017, 8, 21)
    );
    // Leap 2nd month of 2023 has 29 days.
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::lunar(2, 30, true), 2023).unwrap(),
        ymd(2023, 4, 19)
    );
}

#[test]
fn resolution_is_idempotent() {
    let descriptor = BirthdayDescriptor::lunar(9, 9, false);
    let first = resolve_solar_date(&descriptor, 2031).unwrap();
    let second = resolve_solar_date(&descriptor, 2031).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_descriptor_is_rejected_before_conversion() {
    let err = resolve_solar_date(&BirthdayDescriptor::lunar(13, 1, false), 2024).unwrap_err();
    assert_eq!(
        err,
        CalendarError::InvalidDescriptor {
            calendar: CalendarKind::Lunar,
            month: 13,
            day: 1,
            leap_month: false,
        }
    );
    assert!(resolve_solar_date(&BirthdayDescriptor::lunar(1, 31, false), 2024).is_err());
    assert!(resolve_solar_date(&BirthdayDescriptor::solar(4, 31), 2024).is_err());
}

#[test]
fn lunar_years_outside_the_table_are_unsupported() {
    for year in [1899, 2101] {
        let err = resolve_solar_date(&BirthdayDescriptor::lunar(1, 1, false), year).unwrap_err();
        assert_eq!(
            err,
            CalendarError::UnsupportedYear {
                year,
                min: 1900,
                max: 2100,
            }
        );
    }
    // Solar conversion does not depend on the lunar table.
    assert_eq!(
        resolve_solar_date(&BirthdayDescriptor::solar(5, 1), 2101).unwrap(),
        ymd(2101, 5, 1)
    );
}

#[test]
fn solar_to_lunar_matches_known_dates() {
    assert_eq!(
        solar_to_lunar(ymd(2000, 1, 1)).unwrap(),
        LunarDate {
            year: 1999,
            month: 11,
            day: 25,
            leap_month: false,
        }
    );
    assert_eq!(
        solar_to_lunar(ymd(2017, 7, 23)).unwrap(),
        LunarDate {
            year: 2017,
            month: 6,
            day: 1,
            leap_month: true,
        }
    );
    assert_eq!(
        solar_to_lunar(ymd(2101, 1, 28)).unwrap(),
        LunarDate {
            year: 2100,
            month: 12,
            day: 29,
            leap_month: false,
        }
    );
    assert_eq!(solar_to_lunar(ymd(2017, 7, 23)).unwrap().to_string(), "2017-L06-01");
    assert!(solar_to_lunar(ymd(1900, 1, 30)).is_err());
    assert!(solar_to_lunar(ymd(2101, 1, 29)).is_err());
}

struct TwoYearTable {
    years: Vec<LunarYear>,
}

impl TwoYearTable {
    fn new() -> Self {
        let first = LunarYear::new(3000, ymd(3000, 2, 1), 0, [30; 12], 0);
        let second = LunarYear::new(3001, first.end(), 3, [29; 12], 30);
        Self {
            years: vec![first, second],
        }
    }
}

impl LunarTable for TwoYearTable {
    fn supported_years(&self) -> RangeInclusive<i32> {
        3000..=3001
    }

    fn year(&self, year: i32) -> Option<&LunarYear> {
        self.years.iter().find(|layout| layout.year == year)
    }
}

#[test]
fn custom_table_can_replace_builtin_data() {
    let table = TwoYearTable::new();

    // 12 months of 30 days each: the second year starts 360 days later.
    assert_eq!(table.year(3001).unwrap().new_year, ymd(3001, 1, 27));
    assert_eq!(
        resolve_solar_date_with(&table, &BirthdayDescriptor::lunar(2, 1, false), 3000).unwrap(),
        ymd(3000, 3, 3)
    );
    // Leap 3rd month follows three 29-day months.
    assert_eq!(
        resolve_solar_date_with(&table, &BirthdayDescriptor::lunar(3, 1, true), 3001).unwrap(),
        ymd(3001, 4, 24)
    );
    assert_eq!(
        solar_to_lunar_with(&table, ymd(3001, 4, 24)).unwrap(),
        LunarDate {
            year: 3001,
            month: 3,
            day: 1,
            leap_month: true,
        }
    );
    assert!(matches!(
        resolve_solar_date_with(&table, &BirthdayDescriptor::lunar(1, 1, false), 2024),
        Err(CalendarError::UnsupportedYear { min: 3000, max: 3001, .. })
    ));
}
