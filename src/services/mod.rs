// Core services
pub mod categories;
pub mod items;
pub mod members;
pub mod orders;

// Read-side strategy wrappers for the versioned listings
pub mod order_queries;
