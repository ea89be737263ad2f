pub mod app;
pub mod audit;
pub mod config;
pub mod error;
pub mod paths;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod storage;

pub use app::AppContext;
pub use server::Dispatcher;
