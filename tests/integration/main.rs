//! Integration tests against a mock Gemini endpoint.

mod mock_server;
mod query;
mod session_log;
mod vcr_replay;
