//! Shared data shapes. Plain records, no behavior beyond small accessors.

pub mod appointment;
pub mod enums;
pub mod result;
pub mod service;
pub mod template;
pub mod user;

pub use appointment::Appointment;
pub use enums::{AppointmentStatus, UserRole};
pub use result::{TestParameter, TestResult};
pub use service::DiagnosticService;
pub use template::{Template, TemplateParam};
pub use user::User;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
