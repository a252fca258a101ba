//! Convenience macros for building a [`Schema`](crate::schema::Schema) by hand, in the spirit of
//! `gong`'s `gong_longopt!`/`gong_option_set_fixed!` family: thin, declarative wrappers around
//! struct literals, not a DSL of their own.

/// Build a `flag` option descriptor with the given surface names.
///
/// ```
/// use declarg::{flag_option, schema::OptionSpec};
/// let _spec: OptionSpec = flag_option!("verbose", "v");
/// ```
#[macro_export]
macro_rules! flag_option {
    ( $( $name:expr ),+ $(,)? ) => {
        $crate::schema::OptionSpec::flag(&[ $( $name ),+ ])
    };
}

/// Build a `single`-valued option descriptor with the given surface names.
#[macro_export]
macro_rules! single_option {
    ( $( $name:expr ),+ $(,)? ) => {
        $crate::schema::OptionSpec::single(&[ $( $name ),+ ])
    };
}

/// Build an `array`-valued option descriptor with the given surface names.
#[macro_export]
macro_rules! array_option {
    ( $( $name:expr ),+ $(,)? ) => {
        $crate::schema::OptionSpec::array(&[ $( $name ),+ ])
    };
}

/// Build a [`Schema`](crate::schema::Schema) from `key => descriptor` pairs, in declaration order.
///
/// ```
/// use declarg::{schema, flag_option, single_option};
/// let _s = schema! {
///     "verbose" => flag_option!("verbose", "v"),
///     "out" => single_option!("out", "o"),
/// };
/// ```
#[macro_export]
macro_rules! schema {
    ( $( $key:expr => $spec:expr ),* $(,)? ) => {{
        let mut schema = $crate::schema::Schema::new();
        $( schema.insert($key, $spec); )*
        schema
    }};
}
