pub mod audit;
pub mod chat;
pub mod state;
pub mod tabs;
pub mod tasks;

pub use state::StudyApp;
pub use tabs::AppTab;
pub use tasks::{OperationKind, Ticket};
