// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for enum names and chained setters.

/// Give a fieldless enum a stable lowercase name.
///
/// Generates `as_str()` and a `Display` impl that writes it. Every variant
/// must be listed.
///
/// ```ignore
/// pw_core::simple_display! {
///     AgentStatus {
///         Bound => "bound",
///         Failed => "failed",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $str:literal ),+ $(,)? }) => {
        impl $enum {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Chained by-value setters for configuration structs.
///
/// - `into { field: Type }`: takes `impl Into<Type>`
/// - `set { field: Type }`: takes `Type` as is
/// - `option { field: Type }`: the field is `Option<Type>`; takes
///   `impl Into<Type>` and stores `Some`
///
/// ```ignore
/// impl CloudConfig {
///     pw_core::setters! {
///         into { namespace: String }
///         option { context: String }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(into { $( $into_field:ident : $into_ty:ty ),* $(,)? })?
        $(set { $( $set_field:ident : $set_ty:ty ),* $(,)? })?
        $(option { $( $opt_field:ident : $opt_ty:ty ),* $(,)? })?
    ) => {
        $($(
            pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                self.$into_field = v.into();
                self
            }
        )*)?
        $($(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*)?
        $($(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*)?
    };
}
