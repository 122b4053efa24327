//! Retrieved source records and the level ordering used to group them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Total order over authority levels, used for grouping and display.
/// `chumash < mishnah < gemara < rashi < tosfos < rishonim < rambam < tur
/// < shulchan-aruch < nosei-keilim < acharonim < other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceLevel {
    Chumash,
    Mishnah,
    Gemara,
    Rashi,
    Tosfos,
    Rishonim,
    Rambam,
    Tur,
    ShulchanAruch,
    NoseiKeilim,
    Acharonim,
    Other,
}

impl SourceLevel {
    fn order(&self) -> u8 {
        match self {
            SourceLevel::Chumash => 0,
            SourceLevel::Mishnah => 1,
            SourceLevel::Gemara => 2,
            SourceLevel::Rashi => 3,
            SourceLevel::Tosfos => 4,
            SourceLevel::Rishonim => 5,
            SourceLevel::Rambam => 6,
            SourceLevel::Tur => 7,
            SourceLevel::ShulchanAruch => 8,
            SourceLevel::NoseiKeilim => 9,
            SourceLevel::Acharonim => 10,
            SourceLevel::Other => 11,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLevel::Chumash => "chumash",
            SourceLevel::Mishnah => "mishnah",
            SourceLevel::Gemara => "gemara",
            SourceLevel::Rashi => "rashi",
            SourceLevel::Tosfos => "tosfos",
            SourceLevel::Rishonim => "rishonim",
            SourceLevel::Rambam => "rambam",
            SourceLevel::Tur => "tur",
            SourceLevel::ShulchanAruch => "shulchan-aruch",
            SourceLevel::NoseiKeilim => "nosei-keilim",
            SourceLevel::Acharonim => "acharonim",
            SourceLevel::Other => "other",
        }
    }

    pub fn all() -> [SourceLevel; 12] {
        [
            SourceLevel::Chumash,
            SourceLevel::Mishnah,
            SourceLevel::Gemara,
            SourceLevel::Rashi,
            SourceLevel::Tosfos,
            SourceLevel::Rishonim,
            SourceLevel::Rambam,
            SourceLevel::Tur,
            SourceLevel::ShulchanAruch,
            SourceLevel::NoseiKeilim,
            SourceLevel::Acharonim,
            SourceLevel::Other,
        ]
    }
}

impl PartialOrd for SourceLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order().cmp(&other.order())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Source {
    #[serde(rename = "ref")]
    pub reference: String,
    pub hebrew_label: String,
    pub author_key: Option<String>,
    pub level: SourceLevel,
    pub hebrew_body: String,
    #[serde(default)]
    pub english_body: String,
    pub char_count: usize,
}

impl Source {
    pub fn new(
        reference: impl Into<String>,
        hebrew_label: impl Into<String>,
        author_key: Option<String>,
        level: SourceLevel,
        hebrew_body: impl Into<String>,
        english_body: impl Into<String>,
    ) -> Self {
        let hebrew_body = hebrew_body.into();
        let char_count = hebrew_body.chars().count();
        Self {
            reference: reference.into(),
            hebrew_label: hebrew_label.into(),
            author_key,
            level,
            hebrew_body,
            english_body: english_body.into(),
            char_count,
        }
    }
}
