//! Page components.

pub mod constellation;
