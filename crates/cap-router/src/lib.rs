//! Capibara6 generation router: tier resolution, upstream calls and the
//! fallback walk across tiers, plus incremental decoding of streamed replies.

pub mod types;
pub mod wire;
pub mod backend;
pub mod fallback;
pub mod stream;
pub mod router;

pub use types::*;
pub use backend::{GenerationBackend, HttpBackend};
pub use fallback::FallbackPlan;
pub use stream::{decode_stream, parse_stream_line, LineBuffer};
pub use router::GenerationRouter;
