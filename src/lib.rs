//! Rewrites Minecraft 1.8 commands into their 1.9 equivalents.
//!
//! The heavy lifting happens in three stages: a scanner parses the
//! command's structured payload into an untyped value tree, the rewriter
//! applies the 1.9 tag migrations to that tree, and a rule table matches
//! whole command lines and splices the rewritten payload back in.

pub mod error;
pub mod formatter;
pub mod items;
pub mod parser;
pub mod pattern;
mod rewrite;
mod say;
pub mod selector;
pub mod value;

pub use error::UpdateError;
pub use formatter::{Options, SayMode, Updater};

#[cfg(test)]
mod tests;
