//! Language and region selection.
//!
//! A `Locale` is the per-session configuration that the system prompt is
//! rendered from. Region presets fix the unit system, temperature and mass
//! units and the date format together.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    /// Two-letter code handed to the TTS endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "french" | "fr" | "français" | "francais" => Ok(Self::French),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Canada,
    #[serde(rename = "USA")]
    Usa,
    International,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canada => "Canada",
            Self::Usa => "USA",
            Self::International => "International",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "canada" | "ca" => Ok(Self::Canada),
            "usa" | "us" | "united states" | "united states of america" => Ok(Self::Usa),
            "international" | "intl" => Ok(Self::International),
            other => Err(format!("unknown region: {other}")),
        }
    }
}

/// Everything the system prompt interpolates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locale {
    pub language: Language,
    pub region: Region,
    pub region_name: &'static str,
    pub measurement_system: &'static str,
    pub temperature_unit: &'static str,
    pub mass_unit: &'static str,
    pub date_format: &'static str,
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(Language::default(), Region::default())
    }
}

impl Locale {
    pub fn new(language: Language, region: Region) -> Self {
        let mut locale = Self {
            language,
            region,
            region_name: "",
            measurement_system: "",
            temperature_unit: "",
            mass_unit: "",
            date_format: "",
        };
        locale.set_region(region);
        locale
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Switch region and every unit field derived from it.
    pub fn set_region(&mut self, region: Region) {
        let (name, measurement, temperature, mass, date) = match region {
            Region::Canada => ("Canada", "metric", "celsius", "grams and kilograms", "YYYY - MM - DD"),
            Region::Usa => ("United States of America", "imperial", "fahrenheit", "pounds", "MM/DD/YYYY"),
            Region::International => ("International", "metric", "celsius", "grams and kilograms", "YYYY-MM-DD"),
        };
        self.region = region;
        self.region_name = name;
        self.measurement_system = measurement;
        self.temperature_unit = temperature;
        self.mass_unit = mass;
        self.date_format = date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usa_switches_to_imperial_units() {
        let mut locale = Locale::default();
        locale.set_region(Region::Usa);
        assert_eq!(locale.region_name, "United States of America");
        assert_eq!(locale.measurement_system, "imperial");
        assert_eq!(locale.temperature_unit, "fahrenheit");
        assert_eq!(locale.mass_unit, "pounds");
        assert_eq!(locale.date_format, "MM/DD/YYYY");
    }

    #[test]
    fn international_differs_from_canada_only_in_date_spacing() {
        let canada = Locale::new(Language::English, Region::Canada);
        let intl = Locale::new(Language::English, Region::International);
        assert_eq!(canada.measurement_system, intl.measurement_system);
        assert_eq!(canada.temperature_unit, intl.temperature_unit);
        assert_eq!(canada.date_format, "YYYY - MM - DD");
        assert_eq!(intl.date_format, "YYYY-MM-DD");
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::French.code(), "fr");
        assert_eq!("French".parse::<Language>().unwrap(), Language::French);
        assert!("Klingon".parse::<Language>().is_err());
    }

    #[test]
    fn region_parses_selector_labels() {
        assert_eq!("USA".parse::<Region>().unwrap(), Region::Usa);
        assert_eq!("Canada".parse::<Region>().unwrap(), Region::Canada);
        assert_eq!("International".parse::<Region>().unwrap(), Region::International);
    }

    #[test]
    fn region_serializes_with_selector_labels() {
        assert_eq!(serde_json::to_string(&Region::Usa).unwrap(), "\"USA\"");
        let region: Region = serde_json::from_str("\"International\"").unwrap();
        assert_eq!(region, Region::International);
    }
}
