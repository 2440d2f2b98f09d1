pub mod emitter;
pub mod js;
