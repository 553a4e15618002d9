mod camera_weather;
mod helpers;
