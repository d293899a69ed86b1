// Domain layer: core simulation types and rules.

pub mod anchor;
pub mod entity;
pub mod events;
pub mod systems;
pub mod tuning;
pub mod vector;
pub mod world;

pub use anchor::{WorldAnchor, WorldAnchorSnapshot};
pub use entity::{DestroyCause, EntityId, EntityKind, PlayerPose};
pub use events::WorldEvent;
pub use vector::Vec3;
pub use world::World;
