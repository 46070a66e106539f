pub mod candidate;
pub mod issue;
pub mod milestone;
