// Trainpush Infrastructure - Registry Adapter
// Implements: ArtifactPublisher over the hub's HTTP commit API

pub mod hub_publisher;

pub use hub_publisher::HubPublisher;
