use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    io,
    path::Path,
};

pub const CAMERA_ID_COLUMN: &str = "camera_id";
pub const STATION_ID_COLUMN: &str = "stid";
pub const DISTANCE_COLUMN: &str = "distance_mi";

#[derive(thiserror::Error, Debug)]
pub enum MappingError {
    #[error("Failed to read station mapping table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Station mapping table is missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("Station mapping table has no rows")]
    Empty,
    #[error("Invalid distance {distance} for camera {camera_id} and station {station_id}")]
    InvalidDistance {
        camera_id: String,
        station_id: String,
        distance: f64,
    },
    #[error("Duplicate mapping for camera {camera_id} and station {station_id}")]
    Duplicate {
        camera_id: String,
        station_id: String,
    },
}

/// One row of the camera to station table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StationMapping {
    pub camera_id: String,
    #[serde(rename = "stid")]
    pub station_id: String,
    /// Distance from the camera in miles.
    #[serde(rename = "distance_mi")]
    pub distance: f64,
}

impl StationMapping {
    pub fn new(camera_id: impl Into<String>, station_id: impl Into<String>, distance: f64) -> Self {
        Self {
            camera_id: camera_id.into(),
            station_id: station_id.into(),
            distance,
        }
    }
}

/// A station near a camera.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDistance {
    pub station_id: String,
    pub distance: f64,
}

/// Source of candidate stations for a camera.
pub trait StationLookup: Send + Sync {
    /// Stations mapped to `camera_id`, empty when the camera is unknown.
    fn lookup_stations(&self, camera_id: &str) -> Vec<StationDistance>;
    /// Largest distance across the whole table.
    fn max_distance(&self) -> f64;
}

/// Camera to station table, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct StationMappings {
    by_camera: HashMap<String, Vec<StationDistance>>,
    max_distance: f64,
    rows: usize,
}

impl StationMappings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let path = path.as_ref();
        info!("loading station mappings from {}", path.display());
        let reader = csv_reader().from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, MappingError> {
        Self::from_csv(csv_reader().from_reader(reader))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, MappingError> {
        let headers = reader.headers()?.clone();
        for column in [CAMERA_ID_COLUMN, STATION_ID_COLUMN, DISTANCE_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(MappingError::MissingColumn(column));
            }
        }

        let mappings = reader
            .deserialize::<StationMapping>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_mappings(mappings)
    }

    pub fn from_mappings(mappings: Vec<StationMapping>) -> Result<Self, MappingError> {
        if mappings.is_empty() {
            return Err(MappingError::Empty);
        }

        let mut seen = HashSet::new();
        let mut by_camera: HashMap<String, Vec<StationDistance>> = HashMap::new();
        let mut max_distance = f64::MIN;
        let rows = mappings.len();

        for mapping in mappings {
            if !mapping.distance.is_finite() || mapping.distance <= 0.0 {
                return Err(MappingError::InvalidDistance {
                    camera_id: mapping.camera_id,
                    station_id: mapping.station_id,
                    distance: mapping.distance,
                });
            }
            if !seen.insert((mapping.camera_id.clone(), mapping.station_id.clone())) {
                return Err(MappingError::Duplicate {
                    camera_id: mapping.camera_id,
                    station_id: mapping.station_id,
                });
            }

            max_distance = max_distance.max(mapping.distance);
            by_camera
                .entry(mapping.camera_id)
                .or_default()
                .push(StationDistance {
                    station_id: mapping.station_id,
                    distance: mapping.distance,
                });
        }

        debug!(
            "loaded {} station mappings for {} cameras, max distance {} mi",
            rows,
            by_camera.len(),
            max_distance
        );

        Ok(Self {
            by_camera,
            max_distance,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn camera_count(&self) -> usize {
        self.by_camera.len()
    }
}

fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All);
    builder
}

impl StationLookup for StationMappings {
    fn lookup_stations(&self, camera_id: &str) -> Vec<StationDistance> {
        self.by_camera.get(camera_id).cloned().unwrap_or_default()
    }

    fn max_distance(&self) -> f64 {
        self.max_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
camera_id,stid,distance_mi,station_name
hpwren30_south,SDG20,2.5,Julian
hpwren30_south,HPWR1,7.0,Palomar
hpwren30_north,SDG20,11.25,Julian
";

    #[test]
    fn loads_table_and_global_max_distance() {
        let mappings = StationMappings::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings.camera_count(), 2);
        assert_eq!(mappings.max_distance(), 11.25);

        let stations = mappings.lookup_stations("hpwren30_south");
        assert_eq!(
            stations,
            vec![
                StationDistance {
                    station_id: String::from("SDG20"),
                    distance: 2.5
                },
                StationDistance {
                    station_id: String::from("HPWR1"),
                    distance: 7.0
                },
            ]
        );
    }

    #[test]
    fn unknown_camera_has_no_stations() {
        let mappings = StationMappings::from_reader(TABLE.as_bytes()).unwrap();
        assert!(mappings.lookup_stations("not_a_camera").is_empty());
    }

    #[test]
    fn missing_column_is_rejected() {
        let table = "camera_id,stid\nhpwren30_south,SDG20\n";
        let err = StationMappings::from_reader(table.as_bytes()).unwrap_err();
        assert!(matches!(err, MappingError::MissingColumn(DISTANCE_COLUMN)));
    }

    #[test]
    fn unparsable_distance_is_rejected() {
        let table = "camera_id,stid,distance_mi\nhpwren30_south,SDG20,far\n";
        let err = StationMappings::from_reader(table.as_bytes()).unwrap_err();
        assert!(matches!(err, MappingError::Csv(_)));
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        let err = StationMappings::from_mappings(vec![StationMapping::new("cam", "SDG20", 0.0)])
            .unwrap_err();
        assert!(matches!(err, MappingError::InvalidDistance { .. }));
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let err = StationMappings::from_mappings(vec![
            StationMapping::new("cam", "SDG20", 1.0),
            StationMapping::new("cam", "SDG20", 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, MappingError::Duplicate { .. }));
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = StationMappings::from_reader("camera_id,stid,distance_mi\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, MappingError::Empty));
    }
}
