pub mod carousel;
pub mod config;
pub mod error;
pub mod events;
pub mod picture;
pub mod processing {
    pub mod label;
    pub mod shadow;
}
pub mod render;
pub mod tasks {
    pub mod loader;
    pub mod viewer;
}
