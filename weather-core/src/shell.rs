//! Toolkit-independent state of the weather window.
//!
//! The UI layer owns a [`ShellState`], feeds it user input and lookup results,
//! and carries out the returned [`Effect`].

use crate::{
    daypart::{Background, background_for},
    model::WeatherReading,
    provider::FetchError,
};

/// The three read-only text lines under the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    pub place: String,
    pub temperature: String,
    pub condition: String,
}

impl From<&WeatherReading> for Labels {
    fn from(reading: &WeatherReading) -> Self {
        Self {
            place: reading.place_line(),
            temperature: reading.temperature_line(),
            condition: reading.condition_label.clone(),
        }
    }
}

/// What the UI must do after a lookup result has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render {
        background: Background,
        icon_key: String,
    },
    ShowError(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    pub query: String,
    pub labels: Labels,
    /// Message for the modal error; `Some` blocks the window until dismissed.
    pub error: Option<String>,
    pub searching: bool,
}

pub fn not_found_message(place: &str) -> String {
    format!("Cannot find {place}")
}

impl ShellState {
    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    /// Returns the place to look up, or `None` if nothing should be sent.
    pub fn begin_search(&mut self) -> Option<String> {
        if self.searching || self.error.is_some() {
            return None;
        }

        let place = self.query.trim();
        if place.is_empty() {
            return None;
        }

        self.searching = true;
        Some(place.to_string())
    }

    /// Apply one lookup result.
    ///
    /// `hour` is the local wall-clock hour used to pick the background.
    /// Failures other than [`FetchError::NotFound`] are handed back untouched.
    pub fn apply_lookup(
        &mut self,
        query: &str,
        result: Result<WeatherReading, FetchError>,
        hour: u32,
    ) -> Result<Effect, FetchError> {
        self.searching = false;

        match result {
            Ok(reading) => {
                self.labels = Labels::from(&reading);
                Ok(Effect::Render {
                    background: background_for(hour),
                    icon_key: reading.condition_icon_key,
                })
            }
            Err(err) if err.is_not_found() => {
                let message = not_found_message(query);
                self.error = Some(message.clone());
                Ok(Effect::ShowError(message))
            }
            Err(err) => Err(err),
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
