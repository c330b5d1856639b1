pub mod task;
pub mod category;
pub mod checklist;
pub mod settings;

pub use task::*;
pub use category::*;
pub use checklist::*;
pub use settings::*;
