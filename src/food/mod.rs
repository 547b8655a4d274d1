//! Food logging: product lookup followed by a grams reply.

pub mod session;

pub use session::FoodLogSession;
