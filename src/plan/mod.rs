//! Plans — typed content, target math, and lifecycle.

pub mod engine;
pub mod model;
pub mod nutrition;

pub use engine::PlanEngine;
pub use model::{Plan, PlanContent, PlanKind};
