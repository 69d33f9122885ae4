use std::any::Any;

/// A value stored in [`StateCtx`](crate::StateCtx).
///
/// States are cloned into a [`CommandSnapshot`](crate::CommandSnapshot) every time a
/// command is flushed, so keep them cheap to clone.
pub trait State: Any + Clone + Send + 'static {}
