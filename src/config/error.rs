//! Errors raised while loading or validating `mkweb.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed mkweb.toml")]
    Toml(#[from] toml::de::Error),

    #[error("[build.source] `{0}` is not a directory")]
    SourceNotDir(PathBuf),

    /// 1-based position in the `[[path_map]]` array.
    #[error("[[path_map]] entry {0} has an empty base")]
    EmptyPathMapBase(usize),

    #[error("[build.converter.command] must have at least one element")]
    EmptyConverter,

    #[error("converter `{command}` not found, please install it first")]
    ConverterMissing {
        command: String,
        #[source]
        source: which::Error,
    },
}
