use log::{debug, error, info, warn};
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::{collections::HashMap, sync::Arc};

use crate::{
    aggregate::{self, StationReading, WeightedResult},
    ObservationSource, StationLookup,
};

/// Outcome of a camera weather query.
///
/// `NoStations` and `NoData` both serialize as an empty object.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraWeather {
    /// No stations are mapped to the camera.
    NoStations,
    /// Stations are mapped but none returned a recent observation.
    NoData,
    Weighted(WeightedResult),
}

impl CameraWeather {
    pub fn weighted(&self) -> Option<&WeightedResult> {
        match self {
            CameraWeather::Weighted(result) => Some(result),
            CameraWeather::NoStations | CameraWeather::NoData => None,
        }
    }
}

impl Serialize for CameraWeather {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CameraWeather::Weighted(result) => result.serialize(serializer),
            CameraWeather::NoStations | CameraWeather::NoData => {
                serializer.serialize_map(Some(0))?.end()
            }
        }
    }
}

pub struct WeatherService {
    stations: Arc<dyn StationLookup>,
    observations: Arc<dyn ObservationSource>,
}

impl WeatherService {
    pub fn new(stations: Arc<dyn StationLookup>, observations: Arc<dyn ObservationSource>) -> Self {
        Self {
            stations,
            observations,
        }
    }

    /// Distance-weighted current weather for a camera.
    pub async fn camera_weather(&self, camera_id: &str) -> CameraWeather {
        let stations = self.stations.lookup_stations(camera_id);
        if stations.is_empty() {
            info!("no stations mapped to camera {}", camera_id);
            return CameraWeather::NoStations;
        }

        let station_ids: Vec<String> = stations.iter().map(|s| s.station_id.clone()).collect();
        let observations = match self.observations.fetch_latest(&station_ids).await {
            Ok(observations) => observations,
            Err(e) => {
                error!(
                    "error fetching observations for camera {}: {}",
                    camera_id, e
                );
                return CameraWeather::NoData;
            }
        };

        let distances: HashMap<&str, f64> = stations
            .iter()
            .map(|s| (s.station_id.as_str(), s.distance))
            .collect();

        let mut readings: Vec<StationReading> = Vec::with_capacity(observations.len());
        for observation in &observations {
            let Some(distance) = distances.get(observation.station_id.as_str()) else {
                warn!(
                    "ignoring observation from unmapped station {} for camera {}",
                    observation.station_id, camera_id
                );
                continue;
            };
            if readings
                .iter()
                .any(|r| r.station_id == observation.station_id)
            {
                warn!(
                    "ignoring duplicate observation from station {}",
                    observation.station_id
                );
                continue;
            }
            readings.push(StationReading::from_observation(observation, *distance));
        }

        if readings.is_empty() {
            info!("no recent observations for camera {}", camera_id);
            return CameraWeather::NoData;
        }

        debug!(
            "weighting {} of {} mapped stations for camera {}",
            readings.len(),
            stations.len(),
            camera_id
        );
        CameraWeather::Weighted(aggregate::compute(
            &readings,
            self.stations.max_distance(),
        ))
    }
}
