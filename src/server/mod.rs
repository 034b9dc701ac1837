//! Bot and dashboard backend.
//!
//! The Discord gateway and the web dashboard are two front ends over the same services.
//! Gateway events are normalised into [`bot::event::BotEvent`] values and routed by the
//! dispatcher; dashboard requests go through axum controllers. Both end in the service
//! layer, so a setting changed from either surface is validated the same way.
//!
//! # Layers
//!
//! - **Bot** (`bot/`) - Gateway handler, event dispatcher, command registry and the
//!   `Platform` trait that hides Discord from the services
//! - **Controller** (`controller/`) - Dashboard HTTP handlers, access control and DTO conversion
//! - **Service** (`service/`) - Feature workflows: moderation, modmail, giveaways and the rest
//! - **Data** (`data/`) - SeaORM repositories converting entities to domain models
//! - **Model** (`model/`) - Domain models and operation-specific parameter types
//! - **Error** (`error/`) - `AppError`, its HTTP mapping and its chat reply text
//! - **Middleware** (`middleware/`) - Session wrappers and the dashboard auth guard
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based configuration
//! - **State** (`state`) - Shared dashboard state
//! - **Startup** (`startup`) - Database, session, HTTP and OAuth client setup
//! - **Router** (`router`) - Route table and OpenAPI document
//! - **Scheduler** (`scheduler/`) - Minute tick that ends due giveaways

pub mod bot;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
