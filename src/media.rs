pub(crate) mod asset;
pub(crate) mod audio;
pub(crate) mod probe;
pub(crate) mod source;
