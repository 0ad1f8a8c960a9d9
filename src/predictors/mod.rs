pub mod asteroid_paths;
pub mod proximity;
pub mod transitions;
