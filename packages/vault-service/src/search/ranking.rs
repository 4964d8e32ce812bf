mod diversity;
mod grouping;
mod policy;
mod retrieval;
mod text;

pub use diversity::{DedupDecision, DedupRule, dedupe_groups};
pub use grouping::{DocumentGroup, ScoredChunk, group_by_document};
pub use policy::{RankPolicy, RankStage, cmp_date_desc, cmp_relevance, rank_groups};
pub use retrieval::{score_chunks, sort_by_date};
pub use text::{BoostWeights, QueryTerms, keyword_boost, tokenize_query};
