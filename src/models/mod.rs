//! Row and payload types, one module per resource family.

pub mod doctor;
pub mod officer;
pub mod patient;
pub mod prescription;
pub mod report;
pub mod ward;
