use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image categories the generation service knows about. Opaque to the panel:
/// they are only passed through on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Kam,
    PhaseMap,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Kam, Category::PhaseMap];

    /// Identifier sent in the `type` field of the request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Kam => "kam",
            Category::PhaseMap => "phase_map",
        }
    }

    /// Label of the trigger that selects this category.
    pub fn trigger_label(&self) -> &'static str {
        match self {
            Category::Kam => "Generate KAM Image",
            Category::PhaseMap => "Generate Phase Map",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Kam => "KAM",
            Category::PhaseMap => "Phase Map",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "kam" => Ok(Category::Kam),
            "phase_map" | "phase" | "phasemap" => Ok(Category::PhaseMap),
            other => Err(format!("unknown image category '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Category::Kam).unwrap(), "\"kam\"");
        assert_eq!(
            serde_json::to_string(&Category::PhaseMap).unwrap(),
            "\"phase_map\""
        );
        assert_eq!(Category::PhaseMap.to_string(), "phase_map");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("KAM".parse::<Category>(), Ok(Category::Kam));
        assert_eq!("phase-map".parse::<Category>(), Ok(Category::PhaseMap));
        assert_eq!("phase".parse::<Category>(), Ok(Category::PhaseMap));
        assert!("ebsd".parse::<Category>().is_err());
    }
}
