//! Ordering checks over a loaded lap table.
//!
//! Within one (race, driver) group, lap numbers must strictly increase and
//! stint numbers must never decrease, in table order.

use std::collections::HashMap;
use std::fmt;

use pitwall_core::models::LapRecord;

/// A single ordering violation found in the lap table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A lap number did not increase over the previous row of the group.
    LapOrder {
        race: String,
        driver: String,
        previous: u32,
        lap: u32,
    },
    /// A stint number decreased over the previous row of the group.
    StintOrder {
        race: String,
        driver: String,
        lap: u32,
        previous: u32,
        stint: u32,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::LapOrder {
                race,
                driver,
                previous,
                lap,
            } => write!(
                f,
                "{} / {}: lap {} follows lap {}",
                race, driver, lap, previous
            ),
            InvariantViolation::StintOrder {
                race,
                driver,
                lap,
                previous,
                stint,
            } => write!(
                f,
                "{} / {}: stint drops from {} to {} on lap {}",
                race, driver, previous, stint, lap
            ),
        }
    }
}

/// Report every ordering violation in `records`, in table order.
pub fn check_invariants(records: &[LapRecord]) -> Vec<InvariantViolation> {
    // (race, driver) → (last lap number, last known stint)
    let mut last: HashMap<(&str, &str), (u32, Option<u32>)> = HashMap::new();
    let mut violations = Vec::new();

    for record in records {
        let key = (record.race.as_str(), record.driver.as_str());
        if let Some(&(prev_lap, prev_stint)) = last.get(&key) {
            if record.lap_number <= prev_lap {
                violations.push(InvariantViolation::LapOrder {
                    race: record.race.clone(),
                    driver: record.driver.clone(),
                    previous: prev_lap,
                    lap: record.lap_number,
                });
            }
            if let (Some(prev), Some(stint)) = (prev_stint, record.stint) {
                if stint < prev {
                    violations.push(InvariantViolation::StintOrder {
                        race: record.race.clone(),
                        driver: record.driver.clone(),
                        lap: record.lap_number,
                        previous: prev,
                        stint,
                    });
                }
            }
        }

        let stint = match (last.get(&key), record.stint) {
            (_, Some(s)) => Some(s),
            (Some(&(_, prev)), None) => prev,
            (None, None) => None,
        };
        last.insert(key, (record.lap_number, stint));
    }

    violations
}
