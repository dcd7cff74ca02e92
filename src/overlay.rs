pub(crate) mod canvas;
pub(crate) mod draw;
pub(crate) mod fit;
pub(crate) mod font;
pub(crate) mod renderer;
pub(crate) mod style;
