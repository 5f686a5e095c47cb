//! Source composition for [`AnalyzerConfig`](super::AnalyzerConfig).

pub mod service;
