//! # Item Icon Renderer
//!
//! A Rust library for turning Minecraft item and block references into
//! isometric icons.
//!
//! ## Overview
//!
//! A reference such as `pylon:machines/pipes/tin_pipe` or `minecraft:item/diamond`
//! is resolved against two asset mirrors (model, blockstate and item
//! descriptors, with parent inheritance and `#key` texture indirections) into
//! either one concrete texture or one fully merged model. The result is then
//! drawn as a PNG icon: models with box elements are rasterized in 3D, single
//! textures become 2D isometric cubes, mob heads or flat icons.
//!
//! ## Quick Start
//!
//! ```ignore
//! use item_icon_renderer::{HttpFetcher, IconConfig, IconPipeline};
//! use std::rc::Rc;
//!
//! let config = IconConfig::default();
//! let fetcher = Rc::new(HttpFetcher::new(config.http_timeout())?);
//! let pipeline = IconPipeline::new(fetcher, config);
//!
//! let result = pipeline.icon_for("pylon:machines/pipes/tin_pipe", None, Some(64)).await;
//! if let Some(icon) = result.output.icon() {
//!     icon.save("tin_pipe.png")?;
//! }
//! ```
//!
//! ## Local assets
//!
//! Any [`AssetFetcher`] works. [`DirectoryFetcher`] and [`ZipFetcher`] read an
//! extracted or zipped resource pack; point the mirrors at paths inside it:
//!
//! ```ignore
//! use item_icon_renderer::{IconConfig, MirrorConfig, ZipFetcher};
//!
//! let fetcher = Rc::new(ZipFetcher::from_path("pack.zip")?);
//! let config = IconConfig::default()
//!     .with_minecraft_mirror(MirrorConfig::with_base("assets/minecraft"))
//!     .with_pylon_mirror(MirrorConfig::with_base("assets/pylonbase"));
//! ```
//!
//! Everything runs on a single-threaded executor; futures are not `Send`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod resource_pack;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use catalog::{load_catalog, CatalogItem, Category, ImageReference};
pub use config::{IconConfig, MirrorConfig, RenderConfig};
pub use error::{IconError, Result};
pub use pipeline::{IconPipeline, IconResult, RequestState, RequestTrace};
pub use render::{
    CameraPreset, Icon, IsometricCompositor, ModelRenderer, RenderDispatcher, RenderKind,
    RenderOutput, RenderPayload, RenderStrategy,
};
pub use resolver::{AssetResolver, ResolvedAsset, ResolvedModel};
pub use resource_pack::{ModelDescriptor, TextureData, TextureRef};
pub use source::{AssetFetcher, DirectoryFetcher, HttpFetcher, MemoryFetcher, ZipFetcher};
pub use types::{Direction, ModelLocation, Namespace, TexturePath};
