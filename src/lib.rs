//! MediMinder — medication reminder and adherence tracking backend.
//!
//! The core of the system is an append-only reminder log: patients (or
//! their caregivers) report dose actions, stock counts deplete as doses
//! are taken, and adherence statistics are pure reads over the log. A
//! local Ollama instance powers medicine label OCR and plain-language
//! explanations.

pub mod adherence;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod llm;
pub mod medications;
pub mod models;
pub mod patients;
pub mod prescriptions;
pub mod reminders;
