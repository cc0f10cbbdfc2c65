pub mod analyze;
pub mod check;
pub mod render;
pub mod scan;
