// Team identity: the eight divisions, the two conferences, and the static
// per-team schedule entry loaded from the schedule feed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eight four-team divisions.
///
/// The serialized form matches the schedule feed ("AFC East", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "AFC East")]
    AfcEast,
    #[serde(rename = "AFC North")]
    AfcNorth,
    #[serde(rename = "AFC South")]
    AfcSouth,
    #[serde(rename = "AFC West")]
    AfcWest,
    #[serde(rename = "NFC East")]
    NfcEast,
    #[serde(rename = "NFC North")]
    NfcNorth,
    #[serde(rename = "NFC South")]
    NfcSouth,
    #[serde(rename = "NFC West")]
    NfcWest,
}

impl Division {
    /// All divisions in standings order (AFC first, each conference
    /// East/North/South/West).
    pub const ALL: [Division; 8] = [
        Division::AfcEast,
        Division::AfcNorth,
        Division::AfcSouth,
        Division::AfcWest,
        Division::NfcEast,
        Division::NfcNorth,
        Division::NfcSouth,
        Division::NfcWest,
    ];

    /// The conference this division belongs to (the division name prefix).
    pub fn conference(&self) -> Conference {
        match self {
            Division::AfcEast
            | Division::AfcNorth
            | Division::AfcSouth
            | Division::AfcWest => Conference::Afc,
            Division::NfcEast
            | Division::NfcNorth
            | Division::NfcSouth
            | Division::NfcWest => Conference::Nfc,
        }
    }

    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Division::AfcEast => "AFC East",
            Division::AfcNorth => "AFC North",
            Division::AfcSouth => "AFC South",
            Division::AfcWest => "AFC West",
            Division::NfcEast => "NFC East",
            Division::NfcNorth => "NFC North",
            Division::NfcSouth => "NFC South",
            Division::NfcWest => "NFC West",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the two 16-team conferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    #[serde(rename = "AFC")]
    Afc,
    #[serde(rename = "NFC")]
    Nfc,
}

impl Conference {
    pub const BOTH: [Conference; 2] = [Conference::Afc, Conference::Nfc];

    /// The four divisions of this conference, East/North/South/West.
    pub fn divisions(&self) -> [Division; 4] {
        match self {
            Conference::Afc => [
                Division::AfcEast,
                Division::AfcNorth,
                Division::AfcSouth,
                Division::AfcWest,
            ],
            Conference::Nfc => [
                Division::NfcEast,
                Division::NfcNorth,
                Division::NfcSouth,
                Division::NfcWest,
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Conference::Afc => "AFC",
            Conference::Nfc => "NFC",
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A team as loaded from the schedule feed. Immutable for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique short code (e.g. "KC", "BUF").
    pub id: String,
    /// Full display name.
    pub name: String,
    /// The team's division.
    pub division: Division,
    /// Redundant with the division prefix; kept for feed compatibility and
    /// cross-checked against the division at load time.
    pub conference: Conference,
    /// Ordered 17-game opponent list. Divisional rivals appear twice.
    pub opponents: Vec<String>,
}

impl Team {
    /// True if `other` is a different team in the same division.
    pub fn is_division_rival(&self, other: &Team) -> bool {
        self.id != other.id && self.division == other.division
    }
}
