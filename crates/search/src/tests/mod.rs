//! Cross-module tests for the answering pipeline.

mod pipeline;
mod support;
