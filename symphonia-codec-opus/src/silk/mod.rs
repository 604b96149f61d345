mod filter;
mod frame;
mod vq;
mod excitation;
mod table;
mod codebook;
mod error;
mod decoder;

pub(crate) use decoder::Decoder;
pub use error::Error;
pub use frame::{Frame, FrameType, QuantizationOffsetType};