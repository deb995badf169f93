pub mod numeric;
pub mod parsing;
pub mod sensors;

// Re-export commonly used items
pub use numeric::{clamp, fraction_of_byte};
pub use sensors::SystemSensors;
