pub(crate) mod decode;
pub(crate) mod features;
pub(crate) mod fetch;
pub(crate) mod filter;
pub(crate) mod model;
pub(crate) mod watermark;
