pub mod error;
pub mod configuration;

pub mod equality;
pub mod policy_map;

pub mod sequence;
pub mod source;
pub mod pipeline;
pub mod materialize;
pub mod pipe;
pub mod builder;

pub mod cancellation;
pub mod async_seq;
pub mod fanout;
pub mod cache;

// Re-export the everyday surface at the crate root
pub use async_seq::{AsyncSeq, Producer, ProducerState};
pub use builder::{FrozenList, ImmutableBuilder};
pub use cancellation::CancellationToken;
pub use equality::{EqualityPolicy, StructuralEquality};
pub use error::{SeqError, SeqResult};
pub use pipeline::Group;
pub use sequence::Seq;
pub use source::LiveSource;
