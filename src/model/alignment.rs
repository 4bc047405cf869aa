//! src/model/alignment.rs

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Alignment {
    LawfulGood,
    NeutralGood,
    ChaoticGood,
    LawfulNeutral,
    TrueNeutral,
    ChaoticNeutral,
    LawfulEvil,
    NeutralEvil,
    ChaoticEvil,
    Unaligned,
}

impl Alignment {
    pub const ALL: [Alignment; 10] = [
        Alignment::LawfulGood,
        Alignment::NeutralGood,
        Alignment::ChaoticGood,
        Alignment::LawfulNeutral,
        Alignment::TrueNeutral,
        Alignment::ChaoticNeutral,
        Alignment::LawfulEvil,
        Alignment::NeutralEvil,
        Alignment::ChaoticEvil,
        Alignment::Unaligned,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Alignment::LawfulGood => "Lawful Good",
            Alignment::NeutralGood => "Neutral Good",
            Alignment::ChaoticGood => "Chaotic Good",
            Alignment::LawfulNeutral => "Lawful Neutral",
            Alignment::TrueNeutral => "True Neutral",
            Alignment::ChaoticNeutral => "Chaotic Neutral",
            Alignment::LawfulEvil => "Lawful Evil",
            Alignment::NeutralEvil => "Neutral Evil",
            Alignment::ChaoticEvil => "Chaotic Evil",
            Alignment::Unaligned => "Unaligned",
        }
    }

    /// Accepts either the display label (`"Lawful Good"`) or the identifier
    /// form (`"Lawful_Good"`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().replace('_', " ");
        Alignment::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(&normalized))
    }
}

impl TryFrom<String> for Alignment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Alignment::parse(&value).ok_or_else(|| format!("unknown alignment '{}'", value))
    }
}

impl From<Alignment> for String {
    fn from(value: Alignment) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_identifiers() {
        assert_eq!(Alignment::parse("Chaotic Evil"), Some(Alignment::ChaoticEvil));
        assert_eq!(Alignment::parse("Lawful_Good"), Some(Alignment::LawfulGood));
        assert_eq!(Alignment::parse("true neutral"), Some(Alignment::TrueNeutral));
        assert_eq!(Alignment::parse("Mostly Harmless"), None);
    }
}
