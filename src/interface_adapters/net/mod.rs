// Network adapter modules split by presentation clients vs sync peers.

pub mod client;
pub mod peer;

pub use client::report_serializer;
