pub mod credential;
pub mod deadline;
pub mod migration;
