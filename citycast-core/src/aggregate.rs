//! Collapses 3-hour observations into per-day summaries.
//!
//! Two passes: [`accumulate`] folds observations into one accumulator per
//! local calendar date (in first-seen order), [`finalize`] turns each
//! accumulator into an immutable [`DaySummary`].

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::model::{DaySummary, DetailRow, Observation};

const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Groups `observations` by local date and summarises each day.
///
/// Days come out in the order their date is first seen in the input, never
/// sorted by date value. An empty input yields an empty output.
pub fn aggregate(observations: &[Observation]) -> Vec<DaySummary> {
    finalize(accumulate(observations))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DayAccumulator {
    temp_max_c: f64,
    temp_min_c: f64,
    condition_counts: IndexMap<String, u32>,
    rain_mm: f64,
    snow_mm: f64,
    details: Vec<DetailRow>,
}

impl Default for DayAccumulator {
    fn default() -> Self {
        Self {
            temp_max_c: f64::NEG_INFINITY,
            temp_min_c: f64::INFINITY,
            condition_counts: IndexMap::new(),
            rain_mm: 0.0,
            snow_mm: 0.0,
            details: Vec::new(),
        }
    }
}

impl DayAccumulator {
    fn add(&mut self, obs: &Observation) {
        self.temp_max_c = self.temp_max_c.max(obs.temp_max_c);
        self.temp_min_c = self.temp_min_c.min(obs.temp_min_c);

        *self.condition_counts.entry(obs.condition.clone()).or_insert(0) += 1;

        self.rain_mm += obs.rain_mm.unwrap_or(0.0);
        self.snow_mm += obs.snow_mm.unwrap_or(0.0);

        self.details.push(DetailRow {
            time: obs.time.format(TIME_OF_DAY_FORMAT).to_string(),
            temperature_c: obs.temperature_c,
            condition: obs.condition.clone(),
            humidity_pct: obs.humidity_pct,
            wind_speed_mps: obs.wind_speed_mps,
            pressure_hpa: obs.pressure_hpa,
        });
    }

    fn finish(self, date: NaiveDate) -> DaySummary {
        let dominant_condition = dominant(&self.condition_counts).unwrap_or_default();
        let precipitation_total_mm = self.rain_mm + self.snow_mm;

        DaySummary {
            date,
            temp_max_c: self.temp_max_c,
            temp_min_c: self.temp_min_c,
            condition_counts: self.condition_counts,
            dominant_condition,
            rain_mm: self.rain_mm,
            snow_mm: self.snow_mm,
            precipitation_total_mm,
            has_precipitation: precipitation_total_mm > 0.0,
            details: self.details,
        }
    }
}

pub(crate) fn accumulate(observations: &[Observation]) -> IndexMap<NaiveDate, DayAccumulator> {
    observations.iter().fold(IndexMap::new(), |mut days, obs| {
        days.entry(obs.local_date()).or_default().add(obs);
        days
    })
}

pub(crate) fn finalize(days: IndexMap<NaiveDate, DayAccumulator>) -> Vec<DaySummary> {
    days.into_iter().map(|(date, acc)| acc.finish(date)).collect()
}

/// Label with the highest count. A later label only wins with a strictly
/// greater count, so ties go to the label inserted first.
fn dominant(counts: &IndexMap<String, u32>) -> Option<String> {
    counts
        .iter()
        .fold(None, |best: Option<(&String, u32)>, (label, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((label, count)),
        })
        .map(|(label, _)| label.clone())
}
