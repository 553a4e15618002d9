use serde::Serialize;
use std::fmt;
use time::OffsetDateTime;

/// A weather variable reported for a camera.
///
/// The first six are read straight from the station observations, `U` and `V`
/// are derived from wind speed and direction. Serialized names match the
/// Synoptic observation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Variable {
    #[serde(rename = "air_temp_value_1")]
    AirTemp,
    #[serde(rename = "relative_humidity_value_1")]
    RelativeHumidity,
    #[serde(rename = "wind_speed_value_1")]
    WindSpeed,
    #[serde(rename = "wind_gust_value_1")]
    WindGust,
    #[serde(rename = "wind_direction_value_1")]
    WindDirection,
    #[serde(rename = "dew_point_temperature_value_1d")]
    DewPoint,
    #[serde(rename = "u")]
    U,
    #[serde(rename = "v")]
    V,
}

impl Variable {
    /// Every variable, in output order.
    pub const ALL: [Variable; 8] = [
        Variable::AirTemp,
        Variable::RelativeHumidity,
        Variable::WindSpeed,
        Variable::WindGust,
        Variable::WindDirection,
        Variable::DewPoint,
        Variable::U,
        Variable::V,
    ];

    /// Variables present on a raw station observation.
    pub const RAW: [Variable; 6] = [
        Variable::AirTemp,
        Variable::RelativeHumidity,
        Variable::WindSpeed,
        Variable::WindGust,
        Variable::WindDirection,
        Variable::DewPoint,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variable::AirTemp => "air_temp_value_1",
            Variable::RelativeHumidity => "relative_humidity_value_1",
            Variable::WindSpeed => "wind_speed_value_1",
            Variable::WindGust => "wind_gust_value_1",
            Variable::WindDirection => "wind_direction_value_1",
            Variable::DewPoint => "dew_point_temperature_value_1d",
            Variable::U => "u",
            Variable::V => "v",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Latest reading from a single weather station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawObservation {
    pub station_id: String,
    pub name: String,
    pub observed_at: Option<OffsetDateTime>,
    pub air_temp: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
    pub dew_point: Option<f64>,
}

impl RawObservation {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            ..Default::default()
        }
    }

    /// Raw value for `variable`; derived variables are never stored here.
    pub fn value(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::AirTemp => self.air_temp,
            Variable::RelativeHumidity => self.relative_humidity,
            Variable::WindSpeed => self.wind_speed,
            Variable::WindGust => self.wind_gust,
            Variable::WindDirection => self.wind_direction,
            Variable::DewPoint => self.dew_point,
            Variable::U | Variable::V => None,
        }
    }

    pub fn set_value(&mut self, variable: Variable, value: Option<f64>) {
        match variable {
            Variable::AirTemp => self.air_temp = value,
            Variable::RelativeHumidity => self.relative_humidity = value,
            Variable::WindSpeed => self.wind_speed = value,
            Variable::WindGust => self.wind_gust = value,
            Variable::WindDirection => self.wind_direction = value,
            Variable::DewPoint => self.dew_point = value,
            Variable::U | Variable::V => {}
        }
    }

    pub fn with(mut self, variable: Variable, value: f64) -> Self {
        self.set_value(variable, Some(value));
        self
    }
}
