//! Lunar calendar reference tables.
//!
//! # Responsibility
//! - Describe one lunar year: first day, month lengths and leap month.
//! - Abstract the data source behind [`LunarTable`] so conversion code does not
//!   depend on where the table comes from.
//!
//! # Invariants
//! - Years are contiguous: `year(n).end()` is the first day of `year(n + 1)`.
//! - A leap month always directly follows the ordinary month with the same
//!   number.

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use std::ops::RangeInclusive;

/// First supported lunar year of [`ChineseLunarTable`].
pub const TABLE_FIRST_YEAR: i32 = 1900;
/// Last supported lunar year of [`ChineseLunarTable`].
pub const TABLE_LAST_YEAR: i32 = 2100;

/// One entry per lunar year starting at 1900.
///
/// Bit layout:
/// - bits 0..4: leap month number, `0` when the year has no leap month.
/// - bits 4..16: month lengths, month 1 at bit 15 down to month 12 at bit 4;
///   a set bit means 30 days, otherwise 29.
/// - bit 16: leap month length, set for 30 days.
#[rustfmt::skip]
const LUNAR_YEAR_DATA: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520, // 2100
];

static CHINESE_YEARS: Lazy<Vec<LunarYear>> = Lazy::new(build_chinese_years);

/// One month of a lunar year, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarMonth {
    /// Month number `1..=12`, shared by a leap month and its ordinary month.
    pub number: u32,
    /// Whether this is the intercalary occurrence of `number`.
    pub is_leap: bool,
    /// 29 or 30.
    pub days: u32,
}

/// Layout of one lunar year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunarYear {
    /// Solar year in which the lunar year begins.
    pub year: i32,
    /// Solar date of lunar month 1, day 1.
    pub new_year: NaiveDate,
    /// Leap month number, `0` when the year has none.
    pub leap_month: u32,
    month_days: [u32; 12],
    leap_month_days: u32,
}

impl LunarYear {
    /// Creates a year layout from explicit month lengths.
    ///
    /// `leap_month_days` is ignored when `leap_month == 0`.
    pub fn new(
        year: i32,
        new_year: NaiveDate,
        leap_month: u32,
        month_days: [u32; 12],
        leap_month_days: u32,
    ) -> Self {
        Self {
            year,
            new_year,
            leap_month,
            month_days,
            leap_month_days: if leap_month == 0 { 0 } else { leap_month_days },
        }
    }

    /// Returns `true` when `month` is this year's leap month.
    pub fn has_leap(&self, month: u32) -> bool {
        self.leap_month != 0 && self.leap_month == month
    }

    /// Length of the ordinary (`is_leap = false`) or leap month `month`.
    ///
    /// Returns `None` for a leap month that does not exist this year.
    pub fn month_days(&self, month: u32, is_leap: bool) -> Option<u32> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if is_leap {
            return self.has_leap(month).then_some(self.leap_month_days);
        }
        Some(self.month_days[month as usize - 1])
    }

    /// Iterates months in calendar order, leap month included.
    pub fn months(&self) -> impl Iterator<Item = LunarMonth> + '_ {
        (1..=12u32).flat_map(move |number| {
            let common = LunarMonth {
                number,
                is_leap: false,
                days: self.month_days[number as usize - 1],
            };
            let leap = self.has_leap(number).then_some(LunarMonth {
                number,
                is_leap: true,
                days: self.leap_month_days,
            });
            std::iter::once(common).chain(leap)
        })
    }

    /// Total number of days in the lunar year.
    pub fn total_days(&self) -> u32 {
        self.months().map(|month| month.days).sum()
    }

    /// Solar date of the first day of the following lunar year.
    pub fn end(&self) -> NaiveDate {
        self.new_year + Days::new(u64::from(self.total_days()))
    }

    /// Days from `new_year` to day 1 of the given month.
    pub fn month_offset(&self, month: u32, is_leap: bool) -> Option<u32> {
        let mut offset = 0;
        for candidate in self.months() {
            if candidate.number == month && candidate.is_leap == is_leap {
                return Some(offset);
            }
            offset += candidate.days;
        }
        None
    }
}

/// Source of lunar year layouts.
pub trait LunarTable {
    /// Inclusive range of lunar years this table can answer for.
    fn supported_years(&self) -> RangeInclusive<i32>;
    /// Layout of lunar year `year`, or `None` outside `supported_years`.
    fn year(&self, year: i32) -> Option<&LunarYear>;
}

/// Built-in table covering lunar years 1900 through 2100.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChineseLunarTable;

impl LunarTable for ChineseLunarTable {
    fn supported_years(&self) -> RangeInclusive<i32> {
        TABLE_FIRST_YEAR..=TABLE_LAST_YEAR
    }

    fn year(&self, year: i32) -> Option<&LunarYear> {
        let index = usize::try_from(year.checked_sub(TABLE_FIRST_YEAR)?).ok()?;
        CHINESE_YEARS.get(index)
    }
}

fn build_chinese_years() -> Vec<LunarYear> {
    let mut new_year =
        NaiveDate::from_ymd_opt(TABLE_FIRST_YEAR, 1, 31).expect("valid table epoch");
    let mut years = Vec::with_capacity(LUNAR_YEAR_DATA.len());
    for (year, &word) in (TABLE_FIRST_YEAR..).zip(LUNAR_YEAR_DATA.iter()) {
        let decoded = decode_year(year, new_year, word);
        new_year = decoded.end();
        years.push(decoded);
    }
    years
}

fn decode_year(year: i32, new_year: NaiveDate, word: u32) -> LunarYear {
    let mut month_days = [29; 12];
    for (index, days) in month_days.iter_mut().enumerate() {
        if word & (0x8000 >> index) != 0 {
            *days = 30;
        }
    }
    let leap_month_days = if word & 0x10000 != 0 { 30 } else { 29 };
    LunarYear::new(year, new_year, word & 0xf, month_days, leap_month_days)
}
