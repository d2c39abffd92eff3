//! Turns store contents into something ready to be drawn. Nothing in here touches storage.

pub mod locale;
pub mod projector;
