pub mod describe;
pub mod profile;
pub mod wait;
