//! Lap-record builders shared by the unit tests of this crate.

use chrono::Duration;
use pitwall_core::models::{LapRecord, TireCompound};

/// A lap with defaults: team "Team", one lap of stint 1 on mediums.
pub fn lap(race: &str, driver: &str, lap_number: u32, lap_time: Option<f64>) -> LapRecord {
    LapRecord {
        race: race.to_string(),
        driver: driver.to_string(),
        team: "Team".to_string(),
        lap_number,
        lap_time,
        compound: Some(TireCompound::Medium),
        stint: None,
        stint_length: Some(1),
        pit_in_time: None,
        is_personal_best: false,
        air_temp_c: None,
        track_temp_c: None,
        round: None,
        circuit: None,
        total_pit_stops: None,
    }
}

/// Chainable setters for test lap records.
pub trait LapBuilder {
    fn stint(self, stint: u32) -> Self;
    fn compound(self, compound: TireCompound) -> Self;
    fn no_compound(self) -> Self;
    fn stint_length(self, length: u32) -> Self;
    fn team(self, team: &str) -> Self;
    fn personal_best(self) -> Self;
    fn pit_in(self, seconds: i64) -> Self;
    fn round(self, round: u32) -> Self;
    fn circuit(self, circuit: &str) -> Self;
    fn temps(self, air: Option<f64>, track: Option<f64>) -> Self;
    fn pit_stops(self, stops: f64) -> Self;
}

impl LapBuilder for LapRecord {
    fn stint(mut self, stint: u32) -> Self {
        self.stint = Some(stint);
        self
    }

    fn compound(mut self, compound: TireCompound) -> Self {
        self.compound = Some(compound);
        self
    }

    fn no_compound(mut self) -> Self {
        self.compound = None;
        self
    }

    fn stint_length(mut self, length: u32) -> Self {
        self.stint_length = Some(length);
        self
    }

    fn team(mut self, team: &str) -> Self {
        self.team = team.to_string();
        self
    }

    fn personal_best(mut self) -> Self {
        self.is_personal_best = true;
        self
    }

    fn pit_in(mut self, seconds: i64) -> Self {
        self.pit_in_time = Some(Duration::seconds(seconds));
        self
    }

    fn round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    fn circuit(mut self, circuit: &str) -> Self {
        self.circuit = Some(circuit.to_string());
        self
    }

    fn temps(mut self, air: Option<f64>, track: Option<f64>) -> Self {
        self.air_temp_c = air;
        self.track_temp_c = track;
        self
    }

    fn pit_stops(mut self, stops: f64) -> Self {
        self.total_pit_stops = Some(stops);
        self
    }
}
