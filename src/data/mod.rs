// Data structures exchanged with the JukeBox plugin and the chat host

pub mod injection;
pub mod lyrics;
pub mod responses;
pub mod track;

// Re-export types from child modules
pub use injection::*;
pub use lyrics::*;
pub use responses::*;
pub use track::*;
