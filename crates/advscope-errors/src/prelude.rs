//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use advscope_errors::prelude::*;
//!
//! fn tolerance(value: f64) -> Result<f64> {
//!     if !(0.0..1.0).contains(&value) {
//!         return Err(ValidationError::out_of_range("tolerance", value, 0.0, 1.0).into());
//!     }
//!     Ok(value)
//! }
//! # assert!(tolerance(2.0).is_err());
//! ```

pub use crate::{
    Result,
    assertion::AssertionFailure,
    catalog::CatalogError,
    common::{AdvScopeError, ErrorCategory, ErrorContext, ErrorSeverity, ResultExt},
    scan::ScanError,
    schedule::{Bound, Contract, ScheduleError, ScheduleViolation},
    validation::ValidationError,
};

/// Macro for creating an error with context.
///
/// # Example
///
/// ```
/// use advscope_errors::error_context;
///
/// let ctx = error_context!("expect_sequence", "series" => "A,B,C");
/// assert!(ctx.to_string().contains("series: A,B,C"));
/// ```
#[macro_export]
macro_rules! error_context {
    ($operation:expr, $($key:expr => $value:expr),* $(,)?) => {
        {
            let mut ctx = $crate::ErrorContext::new($operation);
            $(
                ctx = ctx.with($key, $value);
            )*
            ctx
        }
    };
}

/// Return early with a range error when a value falls outside `[min, max]`.
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $value:expr, $min:expr, $max:expr) => {
        if !($value >= $min && $value <= $max) {
            return Err($crate::ValidationError::out_of_range($field, $value, $min, $max).into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_macro() {
        let ctx = error_context!("expect_interval", "check_all" => "true");
        assert!(ctx.to_string().contains("expect_interval"));
    }

    #[test]
    fn test_validate_range_macro() {
        fn check(v: f64) -> Result<()> {
            validate_range!("relative_tolerance", v, 0.0, 1.0);
            Ok(())
        }
        assert!(check(0.1).is_ok());
        assert!(check(1.5).is_err());
        assert!(check(f64::NAN).is_err());
    }
}
