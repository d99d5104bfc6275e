//! Rivulet Core Types and Definitions
//!
//! This crate provides the foundational types shared by every stage of the
//! Rivulet pipeline. It includes:
//!
//! - **Identifiers**: Sequential node identities ([`identifier::NodeId`])
//! - **Spans**: Byte ranges into the loaded source text ([`span::Span`])
//! - **Geometry**: Normalized points and vertical bands ([`geometry`] module)
//! - **Tables**: The staged flow table and the tag table ([`table`] module)
//! - **Flow**: Graph vertices and transitions ([`flow`] module)

pub mod flow;
pub mod geometry;
pub mod identifier;
pub mod span;
pub mod table;
