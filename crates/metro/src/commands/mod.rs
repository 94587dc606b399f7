//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod publish;
pub(crate) mod render;

pub(crate) use check::CheckArgs;
pub(crate) use publish::PublishArgs;
pub(crate) use render::RenderArgs;
