//! Business logic services
//!
//! Services wrap the pure engine in transactions and coordinate between
//! repositories, the outbox and metrics.

pub mod nutrition;
pub mod onboarding;
pub mod weight;

pub use nutrition::NutritionService;
pub use onboarding::OnboardingService;
pub use weight::WeightService;
