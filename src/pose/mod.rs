pub mod keypoint;
pub mod scheme;

pub use keypoint::Keypoint;
pub use scheme::KeypointScheme;
