//! # Zamara - StarCraft II replay reader
//!
//! Reads the MPQ (Mo'PaQ) archives StarCraft II packages its replays in, and
//! decodes the tagged serialized values replay metadata is stored as.
//!
//! ## Features
//!
//! - MPQ v1/v2 headers, including the leading user data block of replays
//! - Hash and block table decryption
//! - Independent, interleavable file streams (stored and BZip2)
//! - Serialized value decoding with positional navigation
//! - Replay details and lobby attributes
//!
//! ## Example
//!
//! ```no_run
//! use zamara::{Archive, Replay};
//!
//! # fn main() -> Result<(), zamara::Error> {
//! let mut archive = Archive::open_path("game.SC2Replay")?;
//!
//! for name in archive.list_files() {
//!     println!("{}", name);
//! }
//!
//! let replay = Replay::from_archive(&mut archive)?;
//! println!("{} on {}", replay.game_type, replay.map_name);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod archive;
pub mod compression;
pub mod crypto;
pub mod error;
pub mod header;
pub mod replay;
pub mod serialized;
pub mod special_files;
pub mod stream;
pub mod tables;

// Re-export commonly used types
pub use archive::{Archive, FileHandle, OpenOptions};
pub use error::{Error, Result};
pub use replay::{Player, Replay};
pub use serialized::SerializedValue;
pub use stream::{FileStream, ReadStatus};
