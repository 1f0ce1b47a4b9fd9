pub mod dashboard;
pub mod quote;
