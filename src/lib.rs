pub mod config;
pub mod events;
pub mod frames;
pub mod mapper;
pub mod scroll;
pub mod theme;
pub mod gpu {
    pub mod presenter;
}
pub mod processing {
    pub mod filter;
    pub mod layout;
}
pub mod render {
    pub mod canvas;
    pub mod renderer;
}
pub mod tasks {
    pub mod loader;
    pub mod scheduler;
    pub mod snapshot;
    pub mod viewer;
}
