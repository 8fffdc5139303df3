pub mod components;
pub mod layouts;
pub mod pages;

// Re-exports for convenience
pub use components::{estado_badge, fmt_fecha, fmt_fecha_corta};
pub use layouts::desktop::desktop_layout;
