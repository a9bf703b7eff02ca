pub mod animation;
pub mod events;
pub mod render;

pub use animation::{SharedSound, animation_task, revert_task};
pub use events::event_loop;
pub use render::render_task;
