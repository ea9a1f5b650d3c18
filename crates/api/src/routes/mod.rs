pub mod predictions;
pub mod system;
