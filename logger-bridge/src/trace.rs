//! Function tracing
//!
//! Wraps a function so that each call logs
//!
//! - `Starting function: <name>` before the call,
//! - `Completed function: <name>` after a normal return,
//! - `Error in function <name>: <error>` when it returns `Err` or panics.
//!
//! Arguments, return values, errors and panic payloads pass through
//! untouched. [`log_function`](crate::log_function) applies the same wrapping
//! to a function definition.
//!
//! ```rust
//! use logger_bridge::trace::trace;
//!
//! fn double(x: i32) -> i32 {
//!     x * 2
//! }
//!
//! let traced = trace(double);
//! assert_eq!(traced.name(), "double");
//! assert_eq!(traced.call(3), 6);
//! ```

use futures::FutureExt;
use std::any::Any;
use std::borrow::Cow;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// A function that logs its calls.
#[derive(Debug, Clone)]
pub struct Traced<F> {
    name: Cow<'static, str>,
    f: F,
}

/// Wrap `f`, naming it after the function item (`double` for `fn double`).
pub fn trace<F>(f: F) -> Traced<F> {
    Traced {
        name: Cow::Owned(function_name::<F>()),
        f,
    }
}

impl<F> Traced<F> {
    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &F {
        &self.f
    }

    pub fn into_inner(self) -> F {
        self.f
    }

    /// Call the wrapped function; multiple arguments are passed as a tuple.
    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Fn(A) -> R,
    {
        run(&self.name, || (self.f)(args))
    }

    /// Call a fallible wrapped function, logging `Err` values.
    ///
    /// # Errors
    ///
    /// Returns the wrapped function's error unchanged.
    pub fn try_call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        E: Display,
    {
        try_run(&self.name, || (self.f)(args))
    }
}

/// Run `body` between start and completion records.
pub fn run<R>(name: &str, body: impl FnOnce() -> R) -> R {
    tracing::info!("Starting function: {name}");
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => {
            tracing::info!("Completed function: {name}");
            value
        }
        Err(payload) => {
            report_panic(name, payload.as_ref());
            panic::resume_unwind(payload)
        }
    }
}

/// Like [`run`], logging an `Err` result at error severity.
///
/// # Errors
///
/// Returns the error produced by `body` unchanged.
pub fn try_run<T, E: Display>(name: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    tracing::info!("Starting function: {name}");
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => {
            tracing::info!("Completed function: {name}");
            Ok(value)
        }
        Ok(Err(error)) => {
            tracing::error!("Error in function {name}: {error}");
            Err(error)
        }
        Err(payload) => {
            report_panic(name, payload.as_ref());
            panic::resume_unwind(payload)
        }
    }
}

/// Async counterpart of [`run`].
pub async fn run_async<R>(name: &str, body: impl Future<Output = R>) -> R {
    tracing::info!("Starting function: {name}");
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(value) => {
            tracing::info!("Completed function: {name}");
            value
        }
        Err(payload) => {
            report_panic(name, payload.as_ref());
            panic::resume_unwind(payload)
        }
    }
}

/// Async counterpart of [`try_run`].
///
/// # Errors
///
/// Returns the error produced by `body` unchanged.
pub async fn try_run_async<T, E: Display>(
    name: &str,
    body: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    tracing::info!("Starting function: {name}");
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(Ok(value)) => {
            tracing::info!("Completed function: {name}");
            Ok(value)
        }
        Ok(Err(error)) => {
            tracing::error!("Error in function {name}: {error}");
            Err(error)
        }
        Err(payload) => {
            report_panic(name, payload.as_ref());
            panic::resume_unwind(payload)
        }
    }
}

fn report_panic(name: &str, payload: &(dyn Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string());
    tracing::error!("Error in function {name}: {message}");
}

/// Last path segment of `F`'s type name, without generics or closure markers.
fn function_name<F>() -> String {
    let full = std::any::type_name::<F>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::")
        .find(|segment| !segment.starts_with('{'))
        .unwrap_or(path)
        .to_string()
}
