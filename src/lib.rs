pub mod draft;
pub mod logging;
pub mod utils;
