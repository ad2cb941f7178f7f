pub mod call;

// Re-export command handlers
pub use call::CallCommand;
