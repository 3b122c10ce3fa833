//! The CV document: data model, section layout, id allocation, the store and its
//! persistence subscriber, plus the HTTP handlers the editor talks to.

pub mod handlers;
pub mod ids;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod restore;
pub mod shared;
pub mod store;

pub use shared::SharedStore;
pub use store::DocumentStore;
