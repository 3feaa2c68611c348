//! lparflow Cloud Client Abstraction
//!
//! This crate defines what lparflow needs from a remote Power Systems
//! compute API: the [`InstanceClient`] trait, the instance snapshot model,
//! request bodies and composite instance handles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               lparflow-lifecycle                 │
//! │   LifecycleController / ResizeOrchestrator       │
//! │   poller + wait profiles                         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                lparflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Client Abstraction               │   │
//! │  │  trait InstanceClient { ... }             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   Snapshot   │  │   Handles    │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │  remote API   │
//!           │ implementation│
//!           └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod handle;
pub mod instance;
pub mod provider;
pub mod request;

// Re-exports
pub use action::{ActionRequest, InstanceAction};
pub use error::{CloudError, Result};
pub use handle::{InstanceHandle, ReplicaSet};
pub use instance::{
    Capacity, Health, HealthStatus, Instance, InstanceStatus, NetworkAddress, PinPolicy,
    ProcessorType, SystemType,
};
pub use provider::InstanceClient;
pub use request::{
    CreateInstanceRequest, ReplicantNamingScheme, ReplicationPolicy, UpdateInstanceRequest,
};
