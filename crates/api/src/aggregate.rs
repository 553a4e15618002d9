//! Inverse-distance weighting of station readings into one value per variable.
//!
//! Weights are `max_distance - distance`, where `max_distance` is the largest
//! distance in the whole camera/station table. Each variable is normalized
//! over only the stations that reported it, so a station missing humidity
//! still contributes fully to temperature.

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{wind, RawObservation, Variable};

const VARIABLE_COUNT: usize = Variable::ALL.len();

/// One station's values for every variable, at a known distance from the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub station_id: String,
    /// Distance from the camera in miles.
    pub distance: f64,
    values: [Option<f64>; VARIABLE_COUNT],
}

impl StationReading {
    pub fn new(station_id: impl Into<String>, distance: f64) -> Self {
        Self {
            station_id: station_id.into(),
            distance,
            values: [None; VARIABLE_COUNT],
        }
    }

    /// Copies the raw variables and derives `u`/`v` from wind speed and direction.
    pub fn from_observation(observation: &RawObservation, distance: f64) -> Self {
        let mut reading = Self::new(observation.station_id.clone(), distance);
        for variable in Variable::RAW {
            reading.set(variable, observation.value(variable));
        }
        if let Some(components) =
            wind::decompose(observation.wind_speed, observation.wind_direction)
        {
            reading.set(Variable::U, Some(components.u));
            reading.set(Variable::V, Some(components.v));
        }
        reading
    }

    pub fn with(mut self, variable: Variable, value: f64) -> Self {
        self.set(variable, Some(value));
        self
    }

    pub fn set(&mut self, variable: Variable, value: Option<f64>) {
        self.values[variable.index()] = value;
    }

    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.values[variable.index()]
    }
}

/// Weighted estimate for every variable; `None` where no station reported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedResult {
    values: [Option<f64>; VARIABLE_COUNT],
}

impl WeightedResult {
    pub fn get(&self, variable: Variable) -> Option<f64> {
        self.values[variable.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, Option<f64>)> + '_ {
        Variable::ALL.iter().map(|v| (*v, self.get(*v)))
    }
}

impl Serialize for WeightedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(VARIABLE_COUNT))?;
        for (variable, value) in self.iter() {
            map.serialize_entry(variable.name(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    weight_sum: f64,
    contributors: usize,
}

impl Accumulator {
    /// Share of the total weight carried by one contributor.
    ///
    /// When every contributor sits at the maximum distance the total is zero,
    /// in which case they share the weight evenly.
    fn share(&self, weight: f64) -> f64 {
        if self.weight_sum == 0.0 {
            1.0 / self.contributors as f64
        } else {
            weight / self.weight_sum
        }
    }
}

pub fn inverse_distance(max_distance: f64, distance: f64) -> f64 {
    max_distance - distance
}

/// Combine station readings into one distance-weighted value per variable.
pub fn compute(readings: &[StationReading], max_distance: f64) -> WeightedResult {
    let mut totals = [Accumulator::default(); VARIABLE_COUNT];
    for reading in readings {
        let weight = inverse_distance(max_distance, reading.distance);
        for variable in Variable::ALL {
            if reading.value(variable).is_some() {
                let total = &mut totals[variable.index()];
                total.weight_sum += weight;
                total.contributors += 1;
            }
        }
    }

    let mut values = [None; VARIABLE_COUNT];
    for reading in readings {
        let weight = inverse_distance(max_distance, reading.distance);
        for variable in Variable::ALL {
            if let Some(value) = reading.value(variable) {
                let share = totals[variable.index()].share(weight);
                *values[variable.index()].get_or_insert(0.0) += value * share;
            }
        }
    }

    WeightedResult { values }
}
