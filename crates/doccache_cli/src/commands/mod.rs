pub(crate) mod catalog;
pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod sync;
