pub mod enums;
pub mod medication;
pub mod patient;
pub mod prescription;
pub mod reminder;
pub mod user;

pub use enums::{Frequency, ReminderAction, UserRole};
pub use medication::Medication;
pub use patient::{EmergencyContact, Patient};
pub use prescription::{Prescription, Schedule};
pub use reminder::ReminderLog;
pub use user::User;
