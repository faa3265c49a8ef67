pub(crate) mod compound;
pub(crate) mod script;
pub(crate) mod scroll;
pub(crate) mod timeline;
