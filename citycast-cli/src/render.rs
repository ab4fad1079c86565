//! Plain-text rendering of listings and forecasts.

use citycast_core::{CityRecord, DaySummary, ForecastLocation};
use std::fmt::Write;

const MAP_ZOOM: u8 = 5;
const MISSING: &str = "-";

pub fn cities_table(cities: &[CityRecord]) -> String {
    if cities.is_empty() {
        return "No cities found.\n".to_string();
    }

    let rows: Vec<[String; 5]> = cities
        .iter()
        .map(|c| {
            [
                c.name.clone(),
                c.country.clone().unwrap_or_else(|| MISSING.into()),
                c.timezone.clone().unwrap_or_else(|| MISSING.into()),
                c.population.map_or_else(|| MISSING.into(), |p| p.to_string()),
                c.coordinates.map_or_else(|| MISSING.into(), |xy| xy.to_string()),
            ]
        })
        .collect();

    table(
        &["City Name", "Country", "Timezone", "Population", "Coordinates"],
        &rows,
    )
}

pub fn forecast_report(location: &ForecastLocation, days: &[DaySummary]) -> String {
    let mut out = String::new();
    let name = location.name.as_deref().unwrap_or("Unknown location");

    let _ = writeln!(out, "Weather Forecast for {name}");
    if let Some(country) = &location.country {
        let _ = writeln!(out, "{country}");
    }
    let _ = writeln!(out, "Map: {}", location.coordinates.map_url(MAP_ZOOM));
    let _ = writeln!(out);
    let _ = writeln!(out, "Daily Forecast");

    if days.is_empty() {
        let _ = writeln!(out, "No forecast data available.");
        return out;
    }

    for day in days {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", day.date.format("%A, %-d %B %Y"));
        let _ = writeln!(out, "  High (°C):     {}", day.temp_max_c);
        let _ = writeln!(out, "  Low (°C):      {}", day.temp_min_c);
        let _ = writeln!(out, "  Weather:       {}", day.dominant_condition);
        let _ = writeln!(
            out,
            "  Precipitation: {}",
            if day.has_precipitation { "Yes" } else { "No" }
        );
        let _ = writeln!(out);

        let rows: Vec<[String; 6]> = day
            .details
            .iter()
            .map(|d| {
                [
                    d.time.clone(),
                    d.temperature_c.to_string(),
                    d.condition.clone(),
                    d.humidity_pct.to_string(),
                    d.wind_speed_mps.to_string(),
                    d.pressure_hpa.to_string(),
                ]
            })
            .collect();
        out.push_str(&table(
            &[
                "Time",
                "Temperature (°C)",
                "Weather",
                "Humidity (%)",
                "Wind Speed (m/s)",
                "Pressure (hPa)",
            ],
            &rows,
        ));
    }

    out
}

/// Left-aligned columns sized to the widest cell, separated by two spaces.
fn table<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> String {
    let mut widths = (*headers).map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    push_row(
        &mut out,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str),
        &widths,
    );
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use citycast_core::{Coordinates, DetailRow};
    use indexmap::IndexMap;

    fn location() -> ForecastLocation {
        ForecastLocation {
            name: Some("Reykjavik".into()),
            country: Some("IS".into()),
            coordinates: Coordinates::new(64.1355, -21.8954),
            utc_offset_seconds: 0,
        }
    }

    #[test]
    fn city_table_marks_missing_fields() {
        let cities = vec![CityRecord {
            name: "Nowhere".into(),
            country: None,
            timezone: Some("Etc/UTC".into()),
            population: None,
            coordinates: None,
        }];

        let text = cities_table(&cities);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("City Name  Country  Timezone"));
        assert_eq!(lines[2], "Nowhere    -        Etc/UTC   -           -");
    }

    #[test]
    fn empty_city_table() {
        assert_eq!(cities_table(&[]), "No cities found.\n");
    }

    #[test]
    fn report_has_header_map_and_day_blocks() {
        let day = DaySummary {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            temp_max_c: 12.5,
            temp_min_c: 6.0,
            condition_counts: IndexMap::from([("light rain".to_string(), 1)]),
            dominant_condition: "light rain".into(),
            rain_mm: 0.4,
            snow_mm: 0.0,
            precipitation_total_mm: 0.4,
            has_precipitation: true,
            details: vec![DetailRow {
                time: "12:00".into(),
                temperature_c: 9.1,
                condition: "light rain".into(),
                humidity_pct: 88,
                wind_speed_mps: 6.2,
                pressure_hpa: 1002.0,
            }],
        };

        let text = forecast_report(&location(), &[day]);

        assert!(text.starts_with("Weather Forecast for Reykjavik\nIS\n"));
        assert!(text.contains("#map=5/64.1355/-21.8954"));
        assert!(text.contains("Saturday, 1 June 2024"));
        assert!(text.contains("  High (°C):     12.5"));
        assert!(text.contains("  Precipitation: Yes"));
        assert!(text.contains("12:00  9.1"));
    }

    #[test]
    fn report_without_days() {
        let text = forecast_report(&location(), &[]);
        assert!(text.ends_with("No forecast data available.\n"));
    }
}
