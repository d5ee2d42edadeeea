//! Временные признаки рейса: период дня, высокий сезон, задержка в минутах

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::types::{DerivedFields, FlightRecord, PeriodOfDay};

/// Формат дат в исходных данных
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Порог задержки в минутах
pub const DELAY_THRESHOLD_MINUTES: f64 = 15.0;

/// Диапазоны высокого сезона: ((месяц, день) начала, (месяц, день) конца)
const HIGH_SEASON_RANGES: [((u32, u32), (u32, u32)); 4] = [
    ((12, 15), (12, 31)),
    ((1, 1), (3, 3)),
    ((7, 15), (7, 31)),
    ((9, 11), (9, 30)),
];

/// Результат разбора, который никогда не становится ошибкой
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Default(T),
}

impl<T> Parsed<T> {
    pub fn into_inner(self) -> T {
        match self {
            Parsed::Value(v) | Parsed::Default(v) => v,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Parsed::Default(_))
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT).ok()
}

/// Секунды от полуночи для ЧЧ:ММ
const fn hm(hour: u32, minute: u32) -> u32 {
    (hour * 60 + minute) * 60
}

pub fn parse_period_of_day(scheduled: &str) -> Parsed<PeriodOfDay> {
    let Some(dt) = parse_datetime(scheduled) else {
        return Parsed::Default(PeriodOfDay::Morning);
    };
    let time = dt.time().num_seconds_from_midnight();

    // Границы сравниваются с точностью до минуты, как в исходных данных
    let period = if time >= hm(5, 0) && time <= hm(11, 59) {
        PeriodOfDay::Morning
    } else if time >= hm(12, 0) && time <= hm(18, 59) {
        PeriodOfDay::Afternoon
    } else {
        PeriodOfDay::Night
    };
    Parsed::Value(period)
}

/// Период дня; при ошибке разбора - утро
pub fn period_of_day(scheduled: &str) -> PeriodOfDay {
    parse_period_of_day(scheduled).into_inner()
}

pub fn parse_high_season(scheduled: &str) -> Parsed<bool> {
    let Some(dt) = parse_datetime(scheduled) else {
        return Parsed::Default(false);
    };

    // Диапазоны строятся в году самой записи, границы - полночь
    let year = dt.year();
    let bound = |(month, day): (u32, u32)| {
        NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(0, 0, 0))
    };

    let in_season = HIGH_SEASON_RANGES.iter().any(|&(start, end)| {
        match (bound(start), bound(end)) {
            (Some(min), Some(max)) => dt >= min && dt <= max,
            _ => false,
        }
    });
    Parsed::Value(in_season)
}

/// Высокий сезон; при ошибке разбора - false
pub fn is_high_season(scheduled: &str) -> bool {
    parse_high_season(scheduled).into_inner()
}

pub fn parse_minute_diff(scheduled: &str, actual: &str) -> Parsed<f64> {
    match (parse_datetime(scheduled), parse_datetime(actual)) {
        (Some(s), Some(a)) => Parsed::Value((a - s).num_seconds() as f64 / 60.0),
        _ => Parsed::Default(0.0),
    }
}

/// Разница (фактическое - плановое) в минутах; при ошибке разбора - 0.0
pub fn minute_diff(scheduled: &str, actual: &str) -> f64 {
    parse_minute_diff(scheduled, actual).into_inner()
}

pub fn is_delayed(minute_diff: f64) -> bool {
    minute_diff > DELAY_THRESHOLD_MINUTES
}

/// Вычисление производных колонок записи.
///
/// Колонки, которые уже есть в записи, не пересчитываются.
pub fn derive(record: &FlightRecord) -> DerivedFields {
    let scheduled = record.scheduled_datetime.as_str();

    let diff = record.minute_diff.or_else(|| {
        record
            .actual_datetime
            .as_deref()
            .map(|actual| minute_diff(scheduled, actual))
    });

    DerivedFields {
        period_of_day: record
            .period_of_day
            .unwrap_or_else(|| period_of_day(scheduled)),
        is_high_season: record
            .is_high_season
            .unwrap_or_else(|| is_high_season(scheduled)),
        minute_diff: diff,
        is_delayed: record.is_delayed.or_else(|| diff.map(is_delayed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlightType;

    #[test]
    fn test_period_boundaries() {
        let cases = [
            ("2023-01-01 05:00:00", PeriodOfDay::Morning),
            ("2023-01-01 11:59:00", PeriodOfDay::Morning),
            ("2023-01-01 12:00:00", PeriodOfDay::Afternoon),
            ("2023-01-01 18:59:00", PeriodOfDay::Afternoon),
            ("2023-01-01 19:00:00", PeriodOfDay::Night),
            ("2023-01-01 23:59:00", PeriodOfDay::Night),
            ("2023-01-01 00:00:00", PeriodOfDay::Night),
            ("2023-01-01 04:59:00", PeriodOfDay::Night),
        ];
        for (date, expected) in cases {
            assert_eq!(period_of_day(date), expected, "{date}");
        }
    }

    #[test]
    fn test_period_between_minutes_falls_to_night() {
        // 11:59:30 позже 11:59 и раньше 12:00
        assert_eq!(period_of_day("2023-01-01 11:59:30"), PeriodOfDay::Night);
        assert_eq!(period_of_day("2023-01-01 18:59:30"), PeriodOfDay::Night);
        assert_eq!(period_of_day("2023-01-01 18:59:00"), PeriodOfDay::Afternoon);
    }

    #[test]
    fn test_period_parse_failure_defaults_to_morning() {
        let parsed = parse_period_of_day("not a date");
        assert!(parsed.is_default());
        assert_eq!(parsed.into_inner(), PeriodOfDay::Morning);
        assert_eq!(period_of_day(""), PeriodOfDay::Morning);
        assert_eq!(period_of_day("2023-01-01 25:00:00"), PeriodOfDay::Morning);
    }

    #[test]
    fn test_high_season_boundaries() {
        assert!(is_high_season("2023-03-03 00:00:00"));
        assert!(!is_high_season("2023-03-04 00:00:00"));
        assert!(is_high_season("2023-09-11 00:00:00"));
        assert!(is_high_season("2023-12-15 00:00:00"));
        assert!(!is_high_season("2023-12-14 23:59:59"));
        assert!(is_high_season("2023-01-01 00:00:00"));
        assert!(is_high_season("2023-07-20 14:30:00"));
        assert!(!is_high_season("2023-08-01 00:00:00"));
        assert!(!is_high_season("2023-05-10 12:00:00"));
    }

    #[test]
    fn test_high_season_upper_bounds_are_midnight() {
        assert!(!is_high_season("2023-03-03 10:00:00"));
        assert!(!is_high_season("2023-12-31 12:00:00"));
        assert!(!is_high_season("2023-07-31 15:00:00"));
        assert!(!is_high_season("2023-09-30 08:00:00"));
        assert!(is_high_season("2023-12-31 00:00:00"));
        assert!(is_high_season("2023-07-31 00:00:00"));
    }

    #[test]
    fn test_high_season_uses_record_year() {
        assert!(is_high_season("2017-12-20 08:00:00"));
        assert!(is_high_season("2024-02-29 08:00:00"));
    }

    #[test]
    fn test_high_season_parse_failure() {
        let parsed = parse_high_season("15/07/2023");
        assert!(parsed.is_default());
        assert!(!parsed.into_inner());
    }

    #[test]
    fn test_minute_diff() {
        assert_eq!(minute_diff("2023-07-15 10:00:00", "2023-07-15 10:20:00"), 20.0);
        assert_eq!(minute_diff("2023-07-15 10:00:00", "2023-07-15 09:55:00"), -5.0);
        assert_eq!(minute_diff("2023-07-15 23:50:00", "2023-07-16 00:10:30"), 20.5);
        assert_eq!(minute_diff("garbage", "2023-07-15 10:20:00"), 0.0);
        assert!(parse_minute_diff("2023-07-15 10:00:00", "").is_default());
    }

    #[test]
    fn test_delay_threshold() {
        assert!(!is_delayed(15.0));
        assert!(is_delayed(15.5));
        assert!(!is_delayed(-30.0));
    }

    #[test]
    fn test_derive_training_record() {
        let record = FlightRecord::new("Grupo LATAM", FlightType::Domestic, 7, "2023-07-15 10:00:00")
            .with_actual("2023-07-15 10:20:00");
        let derived = derive(&record);

        assert_eq!(derived.period_of_day, PeriodOfDay::Morning);
        assert!(derived.is_high_season);
        assert_eq!(derived.minute_diff, Some(20.0));
        assert_eq!(derived.is_delayed, Some(true));
    }

    #[test]
    fn test_derive_without_actual() {
        let record = FlightRecord::new("Sky Airline", FlightType::Domestic, 5, "2023-05-10 20:00:00");
        let derived = derive(&record);

        assert_eq!(derived.period_of_day, PeriodOfDay::Night);
        assert!(!derived.is_high_season);
        assert_eq!(derived.minute_diff, None);
        assert_eq!(derived.is_delayed, None);
    }

    #[test]
    fn test_derive_keeps_existing_columns() {
        let mut record = FlightRecord::new("Sky Airline", FlightType::Domestic, 5, "2023-05-10 20:00:00")
            .with_actual("2023-05-10 20:30:00");
        record.period_of_day = Some(PeriodOfDay::Afternoon);
        record.is_high_season = Some(true);
        record.is_delayed = Some(false);

        let derived = derive(&record);
        assert_eq!(derived.period_of_day, PeriodOfDay::Afternoon);
        assert!(derived.is_high_season);
        assert_eq!(derived.minute_diff, Some(30.0));
        assert_eq!(derived.is_delayed, Some(false));

        let again = derive(&record.clone().with_derived(&derived));
        assert_eq!(again, derived);
    }
}
