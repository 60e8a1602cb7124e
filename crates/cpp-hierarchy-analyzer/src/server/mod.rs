pub(crate) mod handler;
pub mod settings;
pub(crate) mod state;

pub use settings::ServerSettings;
pub use state::HierarchyLanguageServer;
