//! MCP tool host access: the stdio transport and the trait the loop calls.

mod error;
mod interface;
mod process;

pub use error::ToolInvokeError;
pub use interface::{ToolDescriptor, ToolHost, ToolResult};
pub use process::{McpProcess, PROTOCOL_VERSION};
