use serde::{Deserialize, Serialize};

const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - ZERO_CELSIUS_IN_KELVIN
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    (kelvin - ZERO_CELSIUS_IN_KELVIN) * 9.0 / 5.0 + 32.0
}

/// Current conditions for one place, built fresh from a single provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub place: String,
    pub country_code: String,
    pub temperature_celsius: f64,
    pub temperature_fahrenheit: f64,
    /// Provider icon code, e.g. "01d". Selects `{key}.png` from the asset dir.
    pub condition_icon_key: String,
    pub condition_label: String,
}

impl WeatherReading {
    /// Both temperature units derive from the same Kelvin value.
    pub fn from_kelvin(
        place: String,
        country_code: String,
        kelvin: f64,
        condition_icon_key: String,
        condition_label: String,
    ) -> Self {
        Self {
            place,
            country_code,
            temperature_celsius: kelvin_to_celsius(kelvin),
            temperature_fahrenheit: kelvin_to_fahrenheit(kelvin),
            condition_icon_key,
            condition_label,
        }
    }

    pub fn place_line(&self) -> String {
        format!("{}, {}", self.place, self.country_code)
    }

    pub fn temperature_line(&self) -> String {
        format!(
            "{:.2}°C {:.2}°F",
            self.temperature_celsius, self.temperature_fahrenheit
        )
    }
}
