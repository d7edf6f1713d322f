pub mod sandbox;
pub mod scripted;

pub use sandbox::SandboxGateway;
pub use scripted::ScriptedGateway;
