pub mod comparison;
pub mod message;
pub mod preferences;
pub mod scope;
pub mod stat;
