//! # Room Gateway Library
//!
//! A WebSocket gateway that groups connections into rooms named by the
//! request path:
//! - plain HTTP requests are redirected (`/`) or told to upgrade
//! - upgrades to `/{room}` join that room; `/` alone is refused
//! - every connection is pinged each TTL and terminated after TTL + margin
//!   without a pong
//! - data frames are handed to a pluggable room synchronizer
//!
//! ## Architecture
//!
//! - **Domain Layer**: identifiers, frames and the synchronizer contract
//! - **Application Layer**: room routing and heartbeat monitoring
//! - **Infrastructure Layer**: in-memory relay synchronizer, metrics
//! - **Presentation Layer**: HTTP entry point and connection handling
//!
//! ## Module Structure
//!
//! ```text
//! room_gateway/
//! +-- config/         Configuration management
//! +-- domain/         RoomId, ClientId, Frame, RoomSynchronizer
//! +-- application/    RoomRouter, HeartbeatMonitor
//! +-- infrastructure/ RelaySynchronizer, Prometheus metrics
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Errors and validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer
pub mod domain;

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
