//! A value that is either fixed at connector-authoring time or computed from
//! the flow context (e.g. an HTTP body built from an earlier form's answers).

use std::fmt;
use std::sync::Arc;

use crate::context::FlowContext;

pub enum Templated<T> {
    Literal(T),
    Derived(Arc<dyn Fn(&FlowContext) -> T + Send + Sync>),
}

impl<T: Clone> Templated<T> {
    pub fn literal(value: T) -> Self {
        Templated::Literal(value)
    }

    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&FlowContext) -> T + Send + Sync + 'static,
    {
        Templated::Derived(Arc::new(f))
    }

    pub fn resolve(&self, ctx: &FlowContext) -> T {
        match self {
            Templated::Literal(v) => v.clone(),
            Templated::Derived(f) => f(ctx),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Templated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Templated::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Templated::Derived(_) => write!(f, "Derived(<fn>)"),
        }
    }
}

impl<T: Clone> Clone for Templated<T> {
    fn clone(&self) -> Self {
        match self {
            Templated::Literal(v) => Templated::Literal(v.clone()),
            Templated::Derived(f) => Templated::Derived(f.clone()),
        }
    }
}
