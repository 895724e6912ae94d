pub mod generation;
pub mod history;
pub mod upload;

pub use generation::*;
pub use history::*;
pub use upload::*;
