//! Physics module
//!
//! Мир rapier2d, testbed settings, контакты и базовый физический emitter
//! (мышь, бомбы, debug draw) поверх которого строятся сцены.

pub mod contact;
pub mod defs;
pub mod emitter;
pub mod profile;
pub mod settings;
pub mod world;


// Re-export основных типов
pub use contact::{
    ContactBuffer, ContactEvent, ContactImpulse, ContactPoint, PointState, StepEvents,
    MAX_CONTACT_POINTS,
};
pub use defs::{BodyDef, BodyType, FixtureDef, Shape};
pub use emitter::{PhysicsEmitter, PhysicsScene, StepReport, BOMB_SPAWN_MULTIPLIER};
pub use profile::{ProfileStats, StepProfile};
pub use settings::{DrawFlags, Settings};
pub use world::{BodyState, DrawStyle, PhysicsWorld, WorldStats, DEFAULT_GRAVITY};

// Handles движка нужны сценам (джоинты, коллайдеры в хуках)
pub use rapier2d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};
