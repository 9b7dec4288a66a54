pub mod classifier;
pub mod cli;
pub mod ctx;
pub mod decision;
pub mod error;
pub mod history;
pub mod io;
pub mod panel;
pub mod pipeline;
pub mod reference;
pub mod rules;
pub mod schema;

pub use error::ScreenError;
