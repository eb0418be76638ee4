//! Command line arguments and helpers shared between the binaries.

pub use {observe, tracing::level_filters::LevelFilter};
use std::fmt::{self, Display, Formatter};

/// Declares a `$struct_name` holding the logging flags, with `$default_filter`
/// as the default `--log-filter`.
#[macro_export]
macro_rules! logging_args_with_default_filter {
    ($struct_name:ident, $default_filter:literal) => {
        #[derive(clap::Parser)]
        #[group(skip)]
        pub struct $struct_name {
            #[clap(long, env, default_value = $default_filter)]
            pub log_filter: String,

            #[clap(long, env, default_value = "error")]
            pub log_stderr_threshold: $crate::LevelFilter,

            /// Emit one JSON object per log line.
            #[clap(long, env)]
            pub use_json_logs: bool,
        }

        impl $struct_name {
            pub fn observe_config(&self) -> $crate::observe::Config {
                $crate::observe::Config::new(
                    &self.log_filter,
                    self.log_stderr_threshold.into_level(),
                    self.use_json_logs,
                )
            }
        }

        impl ::std::fmt::Display for $struct_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let Self {
                    log_filter,
                    log_stderr_threshold,
                    use_json_logs,
                } = self;

                writeln!(f, "log_filter: {log_filter}")?;
                writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
                writeln!(f, "use_json_logs: {use_json_logs}")?;
                Ok(())
            }
        }
    };
}

pub fn display_secret_option<T>(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<T>,
) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

pub fn display_option(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<impl Display>,
) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}
