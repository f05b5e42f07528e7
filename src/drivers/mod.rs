//! Provider 驱动层：对话格式与厂商 wire 格式之间的转换
//!
//! Provider driver layer. Drivers are pure: they turn the provider-agnostic
//! conversation into a wire request and read typed facts out of a wire response.
//! Network I/O lives in [`crate::transport`].

pub mod gemini;

pub use gemini::{
    Content, FunctionCall, FunctionDeclaration, GeminiDriver, GenerateContentRequest,
    GenerationConfig, Part, ProviderResponse, SafetySetting, ToolDeclarations,
};
