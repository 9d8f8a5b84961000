//! Core analysis components: normalization, taxonomy, extraction, job
//! requirement resolution, gap analysis, demand scoring, and roadmaps.

pub mod demand;
pub mod extractor;
pub mod gap;
pub mod normalizer;
pub mod resolver;
pub mod roadmap;
pub mod taxonomy;
