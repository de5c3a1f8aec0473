pub mod bank;
pub mod debounce;
pub mod geomsaek;
pub mod munje;
pub mod view;
