//! Taskhub Types - Domain Types for the Agent Task Marketplace
//!
//! This crate defines the core types shared by every taskhub component:
//! - Tasks and bids
//! - Escrow accounts and their lifecycle
//! - Agent reputation records
//! - Market snapshots consumed by bidding strategies
//! - The shared error taxonomy
//!
//! # Architecture
//!
//! Taskhub is a two-sided marketplace for autonomous agents:
//! - Buyers post tasks with a budget ceiling
//! - Solver agents observe open tasks and submit priced bids
//! - The market selects the cheapest in-budget bid as the winner
//! - Funds are held in escrow until the task resolves
//! - Reputation accrues for the winning agent after settlement
//!
//! All money-like values use [`rust_decimal::Decimal`]; identifiers are
//! Uuid-backed newtypes with the exception of [`AgentId`], which wraps an
//! agent-chosen string handle.

pub mod error;
pub mod escrow;
pub mod identity;
pub mod reputation;
pub mod snapshot;
pub mod task;

pub use error::{Result, TaskhubError};
pub use escrow::{EscrowAccount, EscrowId, EscrowStatus};
pub use identity::AgentId;
pub use reputation::{AgentReputation, MAX_RATING, RATING_WINDOW};
pub use snapshot::MarketSnapshot;
pub use task::{Bid, BidId, Task, TaskId, TaskStatus};
