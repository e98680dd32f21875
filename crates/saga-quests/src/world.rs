//! World conditions that gate exploration objectives.
//!
//! The world simulation owns time and weather. Quest systems only see a
//! snapshot of the current period and weather each frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Period of the day, as reported by the world clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimePeriod {
    /// Early morning
    Dawn,
    /// Morning through afternoon
    #[default]
    Day,
    /// Evening
    Dusk,
    /// Night
    Night,
}

impl TimePeriod {
    /// Check if this period is considered daytime.
    #[must_use]
    pub fn is_daytime(self) -> bool {
        matches!(self, Self::Dawn | Self::Day | Self::Dusk)
    }
}

/// Weather states in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    /// Clear skies
    #[default]
    Clear,
    /// Overcast
    Cloudy,
    /// Rain
    Raining,
    /// Heavy rain and wind
    Storm,
    /// Low visibility
    Fog,
    /// Snowfall
    Snow,
}

impl Weather {
    /// All weather states in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Clear,
        Self::Cloudy,
        Self::Raining,
        Self::Storm,
        Self::Fog,
        Self::Snow,
    ];

    /// Returns the content tag for this weather.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Clear => "CLEAR",
            Self::Cloudy => "CLOUDY",
            Self::Raining => "RAINING",
            Self::Storm => "STORM",
            Self::Fog => "FOG",
            Self::Snow => "SNOW",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|w| w.tag() == upper)
            .ok_or_else(|| format!("unknown weather '{s}'"))
    }
}

/// Day/night requirement of a gated exploration objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    /// Only while it is daytime
    Day,
    /// Only while it is night
    Night,
}

impl FromStr for DayPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(Self::Day),
            "NIGHT" => Ok(Self::Night),
            _ => Err(format!("unknown day phase '{s}'")),
        }
    }
}

/// Environmental requirements of an exploration objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExploreGate {
    /// Required day phase, if any
    pub phase: Option<DayPhase>,
    /// Required weather, if any
    pub weather: Option<Weather>,
}

impl ExploreGate {
    /// Gate with no requirements.
    pub const NONE: Self = Self {
        phase: None,
        weather: None,
    };

    /// Whether the gate imposes any requirement at all.
    #[must_use]
    pub const fn is_gated(&self) -> bool {
        self.phase.is_some() || self.weather.is_some()
    }
}

/// Snapshot of world time and weather for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldConditions {
    /// Current period of day
    pub period: TimePeriod,
    /// Current weather
    pub weather: Weather,
}

impl WorldConditions {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(period: TimePeriod, weather: Weather) -> Self {
        Self { period, weather }
    }

    /// Checks whether the current conditions satisfy a gate.
    #[must_use]
    pub fn satisfies(&self, gate: &ExploreGate) -> bool {
        let phase_ok = match gate.phase {
            Some(DayPhase::Day) => self.period.is_daytime(),
            Some(DayPhase::Night) => !self.period.is_daytime(),
            None => true,
        };
        let weather_ok = gate.weather.map_or(true, |w| w == self.weather);
        phase_ok && weather_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ungated_always_satisfied() {
        let night_storm = WorldConditions::new(TimePeriod::Night, Weather::Storm);
        assert!(night_storm.satisfies(&ExploreGate::NONE));
        assert!(!ExploreGate::NONE.is_gated());
    }

    #[test]
    fn test_night_gate() {
        let gate = ExploreGate {
            phase: Some(DayPhase::Night),
            weather: None,
        };
        assert!(WorldConditions::new(TimePeriod::Night, Weather::Clear).satisfies(&gate));
        assert!(!WorldConditions::new(TimePeriod::Dusk, Weather::Clear).satisfies(&gate));
    }

    #[test]
    fn test_combined_gate() {
        let gate = ExploreGate {
            phase: Some(DayPhase::Day),
            weather: Some(Weather::Fog),
        };
        assert!(WorldConditions::new(TimePeriod::Dawn, Weather::Fog).satisfies(&gate));
        assert!(!WorldConditions::new(TimePeriod::Day, Weather::Clear).satisfies(&gate));
        assert!(!WorldConditions::new(TimePeriod::Night, Weather::Fog).satisfies(&gate));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("storm".parse::<Weather>(), Ok(Weather::Storm));
        assert_eq!("Night".parse::<DayPhase>(), Ok(DayPhase::Night));
        assert!("hail".parse::<Weather>().is_err());
    }
}
