// Resume ranking: prompt → chat model → parsed score → ranked table.
// All model calls go through llm_client.

pub mod aggregator;
pub mod export;
pub mod handlers;
pub mod json_block;
pub mod prompts;
pub mod scorer;
