//! Retrieval-augmented answering over hosted search results.
//!
//! Context assembly, stuff and map-reduce generation, citation parsing,
//! orchestration and rendering.

pub mod answer;
pub mod ask;
pub mod chain;
pub mod context;
pub mod render;
pub mod types;

pub use answer::{parse_answer, parse_citations, CitationError, NOT_AVAILABLE, SOURCES_DELIMITER};
pub use ask::QaService;
pub use chain::{AnswerGenerator, Generation, GenerationParams, PromptSet};
pub use context::{assemble_context, pick_language};
pub use render::{render_json, render_markdown};
pub use types::{
    validate_temperature, AnswerMode, ChainType, Citations, ContextUnit, Notice, ParsedAnswer,
    QueryOutcome, DEFAULT_TEMPERATURE,
};
