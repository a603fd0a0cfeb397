pub mod destroy;
pub mod repair;
