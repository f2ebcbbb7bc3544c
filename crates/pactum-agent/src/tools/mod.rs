//! Tool modules for the Pactum agents.

pub mod base;
pub mod checker;
pub mod communication;
pub mod documents;
pub mod management;
pub mod registry;
pub mod scope;
pub mod terms;

pub use base::{require_object, require_string, require_u64, Tool};
pub use checker::CheckerTool;
pub use communication::CommunicationTool;
pub use management::ManagementTool;
pub use registry::{parse_arguments, render_result, ToolRegistry};
pub use scope::ToolScope;
pub use terms::TermsTool;
