//! lparflow Lifecycle Orchestration
//!
//! Provisions, resizes and decommissions remote LPAR instances through an
//! [`InstanceClient`](lparflow_cloud::InstanceClient), confirming every
//! mutating call by polling the instance until it settles.
//!
//! # Components
//!
//! - [`poller`]: one generic polling loop driven by a [`WaitProfile`]
//! - [`state`] / [`waits`]: state classification and the four named waits
//!   ([`AVAILABLE`], [`STOPPED`], [`RESIZED`], [`DELETED`])
//! - [`resize`]: in-place versus stop / modify / start capacity changes
//! - [`controller`]: create, read, update, delete and exists
//!
//! ```text
//! LifecycleController ──▶ InstanceClient (mutating call)
//!         │
//!         └──▶ wait_for(profile) ──▶ probe ──▶ LifecycleState::classify
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod poller;
pub mod resize;
pub mod state;
pub mod waits;

// Re-exports
pub use config::{LifecycleConfig, OperationTimeouts};
pub use controller::LifecycleController;
pub use error::{LifecycleError, Result};
pub use model::{ChangeSet, DesiredResources, InstanceRecord, InstanceSpec, validate_user_data};
pub use poller::{WaitProfile, wait_for};
pub use resize::{ResizeOrchestrator, ResizePath, ResizeRequest};
pub use state::LifecycleState;
pub use waits::{AVAILABLE, DELETED, RESIZED, STOPPED};
