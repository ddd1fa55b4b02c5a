//! Party node — wires the flow layer to its collaborators.
//!
//! A node owns one party's identity, keys and vault, runs the responder
//! loop for incoming sessions, and exposes the operations a presentation
//! layer consumes: issue, transfer, live-record queries, identity lookups.
//! The network, notary and identity directory collaborators ship here as
//! in-process reference implementations; everything reaches the flows
//! through the trait seams, so other backends can be substituted without
//! touching the protocol core.

pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod network;
pub mod node;
pub mod notary;

pub use config::NodeConfig;
pub use error::NodeError;
pub use events::CommitBus;
pub use identity::{IdentityDirectory, IdentityError};
pub use logging::{init_logging, LogFormat};
pub use metrics::FlowMetrics;
pub use network::InProcessNetwork;
pub use node::Node;
pub use notary::InProcessNotary;
