pub mod asteroid;
pub mod geo;
