pub mod costs;
pub mod credits;
pub mod health;

pub use costs::create_cost_routes;
pub use credits::create_credits_routes;
pub use health::create_health_routes;
