//! Database repositories
//!
//! Provides data access layer for database operations. Every function takes
//! any [`sqlx::PgExecutor`], so it runs on the pool or inside a transaction.

pub mod onboarding;
pub mod outbox;
pub mod profile;
pub mod weight;

pub use onboarding::{OnboardingRecord, OnboardingRepository};
pub use outbox::OutboxRepository;
pub use profile::{ProfileRecord, ProfileRepository};
pub use weight::{CreateWeightEntry, WeightEntryRecord, WeightRepository};
