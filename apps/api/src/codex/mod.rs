// The codex module: static reference table, fragment resolution, and
// prompt assembly for readings.
// All LLM calls go through llm_client — no direct API calls here.

pub mod handlers;
pub mod prompts;
pub mod resolver;
pub mod table;
