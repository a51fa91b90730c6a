use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Number of days covered by one forecast, starting tomorrow.
pub const FORECAST_DAYS: u64 = 5;

pub const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForecastConfigError {
    #[error("minimum temperature {min} is above maximum temperature {max}")]
    InvertedTemperatureRange { min: i32, max: i32 },
}

/// Inclusive bounds for generated temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub min_temperature_c: i32,
    pub max_temperature_c: i32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            min_temperature_c: -20,
            max_temperature_c: 54,
        }
    }
}

/// One day of synthetic weather. Fahrenheit is derived on demand and never
/// serialized.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub temperature_c: i32,
    #[schema(value_type = Option<String>)]
    pub summary: Option<&'static str>,
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ForecastConfigError> {
        if self.min_temperature_c > self.max_temperature_c {
            return Err(ForecastConfigError::InvertedTemperatureRange {
                min: self.min_temperature_c,
                max: self.max_temperature_c,
            });
        }
        Ok(())
    }
}

impl ForecastEntry {
    pub fn temperature_f(&self) -> i64 {
        celsius_to_fahrenheit(self.temperature_c)
    }
}

/// Widened to `i64` since the Fahrenheit value of an extreme `i32` Celsius
/// reading does not fit in an `i32`.
pub fn celsius_to_fahrenheit(celsius: i32) -> i64 {
    (f64::from(celsius) * 9.0 / 5.0 + 32.0).round() as i64
}

/// Produces the forecast for the days following `today`. The only effect is
/// drawing from `rng`.
///
/// `config` must have passed [`ForecastConfig::validate`]; an inverted range
/// panics when drawing a temperature.
pub fn generate_forecast<R>(
    rng: &mut R,
    today: NaiveDate,
    config: &ForecastConfig,
) -> Vec<ForecastEntry>
where
    R: Rng + ?Sized,
{
    (1..=FORECAST_DAYS)
        .map(|offset| ForecastEntry {
            date: today + Days::new(offset),
            temperature_c: rng.random_range(config.min_temperature_c..=config.max_temperature_c),
            summary: SUMMARIES.choose(rng).copied(),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    struct ConstantRng(u64);

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0 as u8);
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()
    }

    #[test]
    fn test_forecast_has_five_consecutive_days_from_tomorrow() {
        let mut rng = StdRng::seed_from_u64(7);
        let forecast = generate_forecast(&mut rng, today(), &ForecastConfig::default());
        let dates: Vec<NaiveDate> = forecast.iter().map(|entry| entry.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_forecast_values_stay_within_bounds() {
        let config = ForecastConfig::default();
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..200 {
            for entry in generate_forecast(&mut rng, today(), &config) {
                assert!(entry.temperature_c >= config.min_temperature_c);
                assert!(entry.temperature_c <= config.max_temperature_c);
                let summary = entry.summary.expect("summary is always drawn");
                assert!(SUMMARIES.contains(&summary));
            }
        }
    }

    #[test]
    fn test_same_seed_gives_same_forecast() {
        let config = ForecastConfig::default();
        let first = generate_forecast(&mut StdRng::seed_from_u64(99), today(), &config);
        let second = generate_forecast(&mut StdRng::seed_from_u64(99), today(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_lowest_draw_picks_minimum_and_first_summary() {
        let forecast = generate_forecast(&mut ConstantRng(0), today(), &ForecastConfig::default());
        assert_eq!(forecast.len(), 5);
        for entry in forecast {
            assert_eq!(entry.temperature_c, -20);
            assert_eq!(entry.summary, Some("Freezing"));
            assert_eq!(entry.temperature_f(), -4);
        }
    }

    #[test]
    fn test_highest_draw_picks_maximum_and_last_summary() {
        let forecast = generate_forecast(
            &mut ConstantRng(u64::MAX),
            today(),
            &ForecastConfig::default(),
        );
        for entry in forecast {
            assert_eq!(entry.temperature_c, 54);
            assert_eq!(entry.summary, Some("Scorching"));
            assert_eq!(entry.temperature_f(), 129);
        }
    }

    #[test]
    fn test_narrow_bounds_are_respected() {
        let config = ForecastConfig {
            min_temperature_c: 12,
            max_temperature_c: 12,
        };
        let forecast = generate_forecast(&mut StdRng::seed_from_u64(3), today(), &config);
        assert!(forecast.iter().all(|entry| entry.temperature_c == 12));
    }

    #[test]
    fn test_fahrenheit_conversion() {
        assert_eq!(celsius_to_fahrenheit(0), 32);
        assert_eq!(celsius_to_fahrenheit(100), 212);
        assert_eq!(celsius_to_fahrenheit(-40), -40);
        assert_eq!(celsius_to_fahrenheit(21), 70);
        assert_eq!(celsius_to_fahrenheit(-17), 1);
    }

    #[test]
    fn test_fahrenheit_of_extreme_celsius_does_not_saturate() {
        assert_eq!(celsius_to_fahrenheit(i32::MAX), 3_865_470_597);
        assert_eq!(celsius_to_fahrenheit(i32::MIN), -3_865_470_534);
        assert!(celsius_to_fahrenheit(i32::MAX) > i64::from(i32::MAX));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert_eq!(ForecastConfig::default().validate(), Ok(()));
        let equal = ForecastConfig {
            min_temperature_c: 12,
            max_temperature_c: 12,
        };
        assert_eq!(equal.validate(), Ok(()));
        let inverted = ForecastConfig {
            min_temperature_c: 10,
            max_temperature_c: 0,
        };
        assert_eq!(
            inverted.validate(),
            Err(ForecastConfigError::InvertedTemperatureRange { min: 10, max: 0 })
        );
    }

    #[test]
    fn test_serialized_entry_has_no_fahrenheit() {
        let entry = ForecastEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            temperature_c: 21,
            summary: Some("Mild"),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"date": "2024-03-01", "temperatureC": 21, "summary": "Mild"})
        );
    }
}
