//! Asset descriptor formats.
//!
//! Parsing for the three JSON descriptor kinds a mirror serves (models,
//! blockstates, item definitions) and decoding/encoding of texture images.

pub mod blockstate;
pub mod item;
pub mod model;
pub mod texture;

pub use blockstate::{BlockstateDefinition, ModelVariant};
pub use item::{HeadKind, ItemDefinition, ItemModel};
pub use model::{BoxElement, FaceDescriptor, ModelDescriptor, TextureMap, TextureRef};
pub use texture::{encode_png, load_texture_from_bytes, TextureData};
