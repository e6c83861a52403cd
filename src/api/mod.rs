pub mod presence;
pub mod upload;
