pub mod camera;
pub mod home;

pub use camera::*;
pub use home::*;
