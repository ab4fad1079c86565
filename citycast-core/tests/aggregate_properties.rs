//! Properties of forecast aggregation over hand-built observation sequences.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use citycast_core::{Observation, aggregate};
use std::collections::HashSet;

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
}

fn obs(time: DateTime<FixedOffset>, max: f64, min: f64, condition: &str) -> Observation {
    Observation {
        time,
        temperature_c: min,
        temp_min_c: min,
        temp_max_c: max,
        condition: condition.to_string(),
        humidity_pct: 80,
        wind_speed_mps: 1.0,
        pressure_hpa: 1000.0,
        rain_mm: None,
        snow_mm: None,
    }
}

/// Five days of 3-hour steps starting at 09:00, with varying readings.
fn five_days() -> Vec<Observation> {
    let start = utc(2024, 2, 27, 9);
    let conditions = ["clear sky", "few clouds", "light rain", "overcast clouds"];
    (0..40)
        .map(|i| {
            let time = start + chrono::Duration::hours(3 * i);
            let max = 5.0 + (i % 7) as f64;
            let min = max - 1.0 - (i % 3) as f64;
            let mut o = obs(time, max, min, conditions[(i % 4) as usize]);
            if i % 5 == 0 {
                o.rain_mm = Some(0.5);
            }
            o
        })
        .collect()
}

#[test]
fn one_summary_per_distinct_date_and_no_observation_lost() {
    let input = five_days();
    let days = aggregate(&input);

    let distinct: HashSet<NaiveDate> = input.iter().map(|o| o.local_date()).collect();
    assert_eq!(days.len(), distinct.len());

    let rows: usize = days.iter().map(|d| d.details.len()).sum();
    assert_eq!(rows, input.len());
}

#[test]
fn bounds_are_max_of_max_and_min_of_min() {
    let input = five_days();

    for day in aggregate(&input) {
        let same_day: Vec<_> = input.iter().filter(|o| o.local_date() == day.date).collect();
        let max = same_day.iter().map(|o| o.temp_max_c).fold(f64::NEG_INFINITY, f64::max);
        let min = same_day.iter().map(|o| o.temp_min_c).fold(f64::INFINITY, f64::min);

        assert_eq!(day.temp_max_c, max, "max for {}", day.date);
        assert_eq!(day.temp_min_c, min, "min for {}", day.date);
        assert_eq!(day.details.len(), same_day.len());
    }
}

#[test]
fn details_follow_input_order_within_a_day() {
    let input = five_days();
    let days = aggregate(&input);

    let leap_day = days
        .iter()
        .find(|d| d.date == NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        .expect("leap day present");
    let times: Vec<&str> = leap_day.details.iter().map(|r| r.time.as_str()).collect();
    assert_eq!(
        times,
        vec!["00:00", "03:00", "06:00", "09:00", "12:00", "15:00", "18:00", "21:00"]
    );
}

#[test]
fn tie_goes_to_first_label_seen() {
    let d = utc(2024, 7, 1, 0);
    let labelled = |labels: &[&str]| -> Vec<Observation> {
        labels.iter().map(|l| obs(d, 1.0, 0.0, l)).collect()
    };

    assert_eq!(aggregate(&labelled(&["A", "B", "A", "B"]))[0].dominant_condition, "A");
    assert_eq!(aggregate(&labelled(&["B", "A", "A", "B"]))[0].dominant_condition, "B");
}

#[test]
fn precipitation_flag_tracks_strictly_positive_total() {
    let input = five_days();

    for day in aggregate(&input) {
        let total: f64 = input
            .iter()
            .filter(|o| o.local_date() == day.date)
            .map(|o| o.precipitation_mm())
            .sum();
        assert_eq!(day.has_precipitation, total > 0.0);
    }

    let dry = vec![obs(utc(2024, 7, 1, 0), 1.0, 0.0, "clear sky")];
    assert!(!aggregate(&dry)[0].has_precipitation);
}

#[test]
fn empty_input_yields_no_days() {
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn interleaved_dates_keep_first_seen_order() {
    let input = vec![
        obs(utc(2024, 3, 3, 12), 3.0, 1.0, "clear sky"),
        obs(utc(2024, 3, 1, 12), 1.0, 0.0, "clear sky"),
        obs(utc(2024, 3, 3, 15), 4.0, 2.0, "clear sky"),
        obs(utc(2024, 3, 2, 12), 2.0, 1.0, "clear sky"),
    ];

    let dates: Vec<NaiveDate> = aggregate(&input).iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        ]
    );
}

#[test]
fn two_day_example() {
    let d1 = utc(2024, 4, 10, 9);
    let d2 = utc(2024, 4, 11, 9);
    let mut rain = obs(d2, 15.0, 5.0, "rain");
    rain.rain_mm = Some(2.0);

    let input = vec![
        obs(d1, 20.0, 10.0, "clear"),
        obs(d1 + chrono::Duration::hours(3), 22.0, 12.0, "clear"),
        rain,
    ];
    let days = aggregate(&input);

    assert_eq!(days.len(), 2);

    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
    assert_eq!(days[0].temp_max_c, 22.0);
    assert_eq!(days[0].temp_min_c, 10.0);
    assert_eq!(days[0].dominant_condition, "clear");
    assert!(!days[0].has_precipitation);

    assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 4, 11).unwrap());
    assert_eq!(days[1].temp_max_c, 15.0);
    assert_eq!(days[1].temp_min_c, 5.0);
    assert_eq!(days[1].dominant_condition, "rain");
    assert!(days[1].has_precipitation);
    assert_eq!(days[1].precipitation_total_mm, 2.0);
}
