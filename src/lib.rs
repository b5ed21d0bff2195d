//! Shared library for the Lavender reservation services.
//!
//! This crate provides the common client wrappers used across the Lavender
//! backend: DynamoDB record access, Google Calendar queries, SNS/SQS
//! notification delivery, string encryption, JSON property files, and
//! email template rendering.

pub mod calendar;
pub mod config;
pub mod crypto;
pub mod db;
pub mod email;
pub mod error;
pub mod messaging;
pub mod models;

pub use calendar::{CalendarClient, CalendarEvent, EventTime};
pub use config::{CalendarProperties, Secrets, TableProperties};
pub use crypto::{NonceMode, StringCipher};
pub use db::DynamoStore;
pub use email::{EmailTemplate, TemplateValues};
pub use error::{Error, Result};
pub use messaging::{Publisher, QueueSender};
pub use models::{DeletionAuditRecord, ReservationRecord, UserRecord, CLEARED};
