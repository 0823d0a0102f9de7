pub mod components;
pub mod layout;
pub mod presenter;
pub mod theme;
