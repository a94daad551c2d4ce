//! Prompt templates: the chat persona, the dungeon solver and the summary
//! narrator.

use std::fmt;
use std::str::FromStr;

use crate::locale::{Language, Locale};

const PERSONA_TEMPLATE: &str = r#"You are an expert on The Legend of Zelda: Ocarina of Time and can give players guidance.
You speak like Navi but are still clear on steps.
You provide in depth answers to long questions.
You give short answers to one-word questions and simple sentences.
Always respond using only {language}, even if the user writes in a different language.
Your region is set to {region}.
Whenever there are measurements, use the {measurement_system} system.
When you need to display a temperature, use {temperature_unit}.
Mass is measured in {mass_unit}.
Write dates in the format: {date_format}."#;

const DUNGEON_TEMPLATE: &str = "You are Navi from The Legend of Zelda: Ocarina of Time. \
Your task is to guide the player through {dungeon}. \
Provide clear and step-by-step instructions in Navi's voice. Stay in character and be helpful!";

const SUMMARY_TEMPLATE: &str = r#"Start by introducing yourself as nAvI, a fairy that helps adventurers of any kind beat Ocarina of Time and stop Ganon.
You are an expert on The Legend of Zelda: Ocarina of Time and can give players guidance. You speak like Navi but are still clear on steps.
Write the script in {language}.
This summary is based on conversations you have already had with the player.
There is a lot of information, so be kind and patient with them.
Speak in a warm, educational tone, as if sharing valuable and easy-to-understand summaries.
Go over the events you talked about in chronological order, from earliest in the game to latest.
Conclude with what the player can do next based on their current situation.
Keep it brief, under 60 seconds when spoken, and introduce yourself as nAvI, the hero's magical fairy guide in saving Hyrule.
Use casual fillers for a natural, approachable flow, without background music or extra frills."#;

/// Render the chat system prompt for a locale.
pub fn compose(locale: &Locale) -> String {
    PERSONA_TEMPLATE
        .replace("{language}", locale.language.as_str())
        .replace("{region}", locale.region_name)
        .replace("{measurement_system}", locale.measurement_system)
        .replace("{temperature_unit}", locale.temperature_unit)
        .replace("{mass_unit}", locale.mass_unit)
        .replace("{date_format}", locale.date_format)
}

pub fn dungeon_prompt(dungeon: Dungeon) -> String {
    DUNGEON_TEMPLATE.replace("{dungeon}", dungeon.label())
}

pub fn summary_prompt(language: Language) -> String {
    SUMMARY_TEMPLATE.replace("{language}", language.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dungeon {
    DekuTree,
    DodongosCavern,
    JabuJabusBelly,
    ForestTemple,
    FireTemple,
    WaterTemple,
    ShadowTemple,
    SpiritTemple,
    GanonsCastle,
}

impl Dungeon {
    pub fn all() -> &'static [Dungeon] {
        &[
            Self::DekuTree,
            Self::DodongosCavern,
            Self::JabuJabusBelly,
            Self::ForestTemple,
            Self::FireTemple,
            Self::WaterTemple,
            Self::ShadowTemple,
            Self::SpiritTemple,
            Self::GanonsCastle,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DekuTree => "Inside the Deku Tree",
            Self::DodongosCavern => "Dodongo's Cavern",
            Self::JabuJabusBelly => "Inside Jabu-Jabu's Belly",
            Self::ForestTemple => "Forest Temple",
            Self::FireTemple => "Fire Temple",
            Self::WaterTemple => "Water Temple",
            Self::ShadowTemple => "Shadow Temple",
            Self::SpiritTemple => "Spirit Temple",
            Self::GanonsCastle => "Ganon's Castle",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::DekuTree => "deku-tree",
            Self::DodongosCavern => "dodongos-cavern",
            Self::JabuJabusBelly => "jabu-jabus-belly",
            Self::ForestTemple => "forest-temple",
            Self::FireTemple => "fire-temple",
            Self::WaterTemple => "water-temple",
            Self::ShadowTemple => "shadow-temple",
            Self::SpiritTemple => "spirit-temple",
            Self::GanonsCastle => "ganons-castle",
        }
    }
}

impl fmt::Display for Dungeon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Dungeon {
    type Err = String;

    /// Accepts the slug or the button label (straight or curly apostrophes).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('\u{2019}', "'").to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|d| d.slug() == wanted || d.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown dungeon: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Region;

    #[test]
    fn compose_is_deterministic() {
        let locale = Locale::new(Language::French, Region::International);
        assert_eq!(compose(&locale), compose(&locale.clone()));
    }

    #[test]
    fn usa_prompt_uses_imperial_units() {
        let prompt = compose(&Locale::new(Language::English, Region::Usa));
        assert!(prompt.contains("fahrenheit"));
        assert!(prompt.contains("pounds"));
        assert!(prompt.contains("MM/DD/YYYY"));
        assert!(prompt.contains("United States of America"));
    }

    #[test]
    fn canada_prompt_uses_metric_units() {
        let prompt = compose(&Locale::new(Language::English, Region::Canada));
        assert!(prompt.contains("celsius"));
        assert!(prompt.contains("YYYY - MM - DD"));
        assert!(!prompt.contains("fahrenheit"));
    }

    #[test]
    fn compose_leaves_no_placeholders() {
        for region in [Region::Canada, Region::Usa, Region::International] {
            for language in [Language::English, Language::French] {
                let prompt = compose(&Locale::new(language, region));
                assert!(!prompt.contains('{'), "unrendered field in {prompt}");
                assert!(prompt.contains(language.as_str()));
            }
        }
    }

    #[test]
    fn dungeon_prompt_names_the_dungeon() {
        let prompt = dungeon_prompt(Dungeon::WaterTemple);
        assert!(prompt.contains("guide the player through Water Temple"));
    }

    #[test]
    fn summary_prompt_sets_language() {
        assert!(summary_prompt(Language::French).contains("Write the script in French."));
    }

    #[test]
    fn dungeon_parses_labels_and_slugs() {
        assert_eq!("ganons-castle".parse::<Dungeon>().unwrap(), Dungeon::GanonsCastle);
        assert_eq!("Dodongo\u{2019}s Cavern".parse::<Dungeon>().unwrap(), Dungeon::DodongosCavern);
        assert_eq!("inside the deku tree".parse::<Dungeon>().unwrap(), Dungeon::DekuTree);
        assert!("Lost Woods".parse::<Dungeon>().is_err());
        assert_eq!(Dungeon::all().len(), 9);
    }
}
