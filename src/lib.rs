//! # emx-datachunk
//!
//! Embed text and binary data directly inside the chunks of a literate
//! document, so the document and its data travel as one file.
//!
//! ## Data Chunks
//!
//! A rendering pipeline hands each data chunk to a [`Decoder`] as a set of
//! options plus the chunk body lines:
//!
//! ~~~text
//! ```{data output.var="t1"}
//! 1,2,3,4,5,6
//! 7,8,9
//! ```
//! ~~~
//!
//! The decoder resolves the options, decodes the body and binds the result
//! into an [`Environment`] and/or writes it to a file.
//!
//! ## Options
//!
//! | key             | meaning                                         |
//! |-----------------|-------------------------------------------------|
//! | `format`        | `text` (default) or `binary`                    |
//! | `encoding`      | `asis` (text default), `base64` (binary default), `pgp` |
//! | `decoding.ops`  | mapping passed to the codec (`passphrase`, ...) |
//! | `output.var`    | name to bind the decoded value under            |
//! | `output.file`   | path to write the decoded value to              |
//! | `external.file` | file whose text replaces the chunk body         |
//! | `line.sep`      | separator joining `asis` lines (default `\n`)   |
//! | `echo`, `max.echo` | show the body (first N lines) in the output  |
//! | `checksum`      | expected SHA-256 of the decoded value           |
//!
//! ## Encoding Files
//!
//! [`Encoder`] goes the other way: it turns a file into base64 (wrapped at
//! 64 columns) or armored PGP text ready to paste into a chunk.
//!
//! ```
//! use emx_datachunk::{Decoder, Encoder, Environment, OptionValue, RawOptions, Value};
//!
//! let encoded = Encoder::new()
//!     .encode(&[1, 2, 3, 4], "base64", &Default::default())
//!     .unwrap();
//! assert_eq!(encoded, "AQIDBA==");
//!
//! let mut options = RawOptions::new();
//! options.insert("format".into(), OptionValue::from("binary"));
//! options.insert("output.var".into(), OptionValue::from("bytes"));
//!
//! let mut env = Environment::new();
//! Decoder::new()
//!     .run_chunk("example", &options, &[encoded], &mut env)
//!     .unwrap();
//! assert_eq!(env.get("bytes"), Some(&Value::Bytes(vec![1, 2, 3, 4])));
//! ```

pub mod binder;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod directive;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod namespace;
pub mod options;

pub use codec::{Codec, CodecRegistry, DecodeRequest, GpgCli, PgpBackend, PgpCodec};
pub use config::EngineConfig;
pub use decoder::Decoder;
pub use directive::{ChunkDirective, Format, OutputTarget};
pub use encoder::Encoder;
pub use error::{ChunkError, CodecFailure};
pub use namespace::{Environment, Value};
pub use options::{DecodingOptions, OptionResolver, OptionValue, RawOptions};
