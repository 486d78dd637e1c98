//! Month-grid aggregation and day countdowns shared by the lesson,
//! assignment and diet calendars.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

const DAY_MS: i64 = 86_400_000;

#[derive(Debug)]
pub struct MonthGrid<'a, T> {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1; equals the weekday index of the first
    /// day (0 = Sunday), so the grid renders as 7 columns.
    pub leading_blanks: u32,
    pub days: Vec<DayCell<'a, T>>,
}

#[derive(Debug)]
pub struct DayCell<'a, T> {
    pub day: u32,
    /// YYYY-MM-DD
    pub date: String,
    pub items: Vec<&'a T>,
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(next.signed_duration_since(first).num_days() as u32)
}

pub fn first_weekday_index(year: i32, month: u32) -> Option<u32> {
    Some(
        NaiveDate::from_ymd_opt(year, month, 1)?
            .weekday()
            .num_days_from_sunday(),
    )
}

/// Buckets `items` into day cells. An item belongs to a day when its date
/// string equals the cell date or extends it with a time component, which
/// covers both plain dates and full timestamps.
pub fn month_grid<'a, T>(
    year: i32,
    month: u32,
    items: &'a [T],
    date_of: impl Fn(&T) -> &str,
) -> Option<MonthGrid<'a, T>> {
    let days_in_month = days_in_month(year, month)?;
    let leading_blanks = first_weekday_index(year, month)?;

    let mut days = Vec::with_capacity(days_in_month as usize);
    for day in 1..=days_in_month {
        let date = format!("{:04}-{:02}-{:02}", year, month, day);
        let matching: Vec<&T> = items
            .iter()
            .filter(|item| date_of(item).starts_with(date.as_str()))
            .collect();
        days.push(DayCell {
            day,
            date,
            items: matching,
        });
    }

    Some(MonthGrid {
        year,
        month,
        leading_blanks,
        days,
    })
}

/// Whole days until target midnight (UTC), never negative. A target today
/// or in the past counts as D-0.
pub fn d_day(target: NaiveDate, now: DateTime<Utc>) -> i64 {
    let target_midnight = target.and_time(NaiveTime::MIN).and_utc();
    let ms = target_midnight
        .signed_duration_since(now)
        .num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + DAY_MS - 1) / DAY_MS
    }
}

/// First 10 chars of a date or timestamp field as a calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(0..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Dated {
        id: &'static str,
        date: &'static str,
    }

    #[test]
    fn grid_shape_matches_month() {
        // 2024-02-01 was a Thursday; 2024 is a leap year.
        let grid = month_grid(2024, 2, &[] as &[Dated], |d| d.date).unwrap();
        assert_eq!(grid.leading_blanks, 4);
        assert_eq!(grid.days.len(), 29);
        assert_eq!(grid.days[0].date, "2024-02-01");
        assert_eq!(grid.days[28].date, "2024-02-29");

        // 2023-10-01 was a Sunday.
        let grid = month_grid(2023, 10, &[] as &[Dated], |d| d.date).unwrap();
        assert_eq!(grid.leading_blanks, 0);
        assert_eq!(grid.days.len(), 31);
    }

    #[test]
    fn every_dated_item_lands_in_exactly_one_cell() {
        let items = [
            Dated { id: "a", date: "2024-05-01" },
            Dated { id: "b", date: "2024-05-01" },
            Dated { id: "c", date: "2024-05-31" },
            Dated { id: "d", date: "2024-05-15T18:30:00.000Z" },
            Dated { id: "e", date: "2024-06-01" },
            Dated { id: "f", date: "2024-04-30" },
        ];
        let grid = month_grid(2024, 5, &items, |d| d.date).unwrap();

        let mut seen = Vec::new();
        for cell in &grid.days {
            for item in &cell.items {
                seen.push((item.id, cell.day));
            }
        }
        seen.sort();
        assert_eq!(seen, vec![("a", 1), ("b", 1), ("c", 31), ("d", 15)]);
    }

    #[test]
    fn timestamp_prefix_does_not_match_neighbor_days() {
        let items = [Dated { id: "a", date: "2024-05-10T00:00:00Z" }];
        let grid = month_grid(2024, 5, &items, |d| d.date).unwrap();
        assert_eq!(grid.days[9].items.len(), 1);
        assert!(grid.days[0].items.is_empty());
        assert!(grid.days[10].items.is_empty());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(month_grid(2024, 13, &[] as &[Dated], |d| d.date).is_none());
        assert!(days_in_month(2024, 0).is_none());
    }

    #[test]
    fn d_day_counts_down_and_clamps_at_zero() {
        let target = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(d_day(target, now), 5);

        // One elapsed day lowers the count by exactly one.
        for elapsed in 0..5 {
            let later = now + chrono::Duration::days(elapsed);
            assert_eq!(d_day(target, later), 5 - elapsed);
        }

        // Midnight of the target day and everything after are D-0.
        let on_day = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(d_day(target, on_day), 0);
        let after = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        assert_eq!(d_day(target, after), 0);

        // A sliver before midnight still rounds up to D-1.
        let just_before = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 59).unwrap();
        assert_eq!(d_day(target, just_before), 1);
    }
}
