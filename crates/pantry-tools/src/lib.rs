//! Tool management and execution framework for pantry
//!
//! A tool is a named function the hosted model may ask to run. Each tool
//! declares a [`ParameterSchema`]; the [`ToolRegistry`] validates incoming
//! arguments against it before the tool ever sees them, and reports bad
//! arguments as a [`ToolError`] value the model can read and correct.

pub mod error;
pub mod registry;
pub mod schema;
pub mod tool;

pub use error::{RegistryError, ToolError, ToolResult};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use schema::{ParamType, Parameter, ParameterSchema};
pub use tool::Tool;
