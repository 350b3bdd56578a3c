//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Captcha)
//! - Domain value objects (Operator, MathProblem)
//! - Domain services (problem generation, answer parsing)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
