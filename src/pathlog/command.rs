//! # Command Resolver
//!
//! Maps a typed subcommand token to one registered name. An exact name wins;
//! otherwise a prefix is accepted when exactly one registered name starts with
//! it. Anything else is left as typed, so dispatch reports it as unknown.
//!
//! Resolution happens on the raw argument vector, before clap sees it:
//! [`CommandRegistry::resolve_args`] finds the command token (the first
//! argument that is neither an option nor an option's value) and substitutes
//! the resolved name in place.

use std::ffi::OsString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Exact(String),
    Prefix { typed: String, name: String },
    Ambiguous { typed: String, candidates: Vec<String> },
    Unmatched(String),
}

impl Resolution {
    /// The registered name selected, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Resolution::Exact(name) | Resolution::Prefix { name, .. } => Some(name),
            Resolution::Ambiguous { .. } | Resolution::Unmatched(_) => None,
        }
    }
}

/// Outcome of resolving a whole argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedArgs {
    /// The argument vector with the command token replaced by its full name.
    Command { name: String, args: Vec<OsString> },
    /// No command token was given. The arguments are returned untouched so
    /// flags such as `--help` and `--version` can still be honoured.
    NoCommand(Vec<OsString>),
    /// The token matched nothing, or more than one name.
    Unresolved(String),
}

/// Option spellings that consume the following argument as their value.
#[derive(Debug, Clone, Default)]
pub struct ValueOptions {
    longs: Vec<String>,
    shorts: Vec<char>,
}

impl ValueOptions {
    pub fn new<L, S>(longs: L, shorts: S) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        S: IntoIterator<Item = char>,
    {
        Self {
            longs: longs.into_iter().map(Into::into).collect(),
            shorts: shorts.into_iter().collect(),
        }
    }
}

/// Ordered, read-only set of subcommand names.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    names: Vec<String>,
    value_options: ValueOptions,
}

impl CommandRegistry {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut registry = Self::default();
        for name in names {
            let name = name.into();
            if !registry.names.contains(&name) {
                registry.names.push(name);
            }
        }
        registry
    }

    pub fn with_value_options(mut self, value_options: ValueOptions) -> Self {
        self.value_options = value_options;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn resolve(&self, token: &str) -> Resolution {
        if self.contains(token) {
            return Resolution::Exact(token.to_string());
        }

        let candidates: Vec<String> = self
            .names
            .iter()
            .filter(|name| name.starts_with(token))
            .cloned()
            .collect();

        match candidates.len() {
            0 => Resolution::Unmatched(token.to_string()),
            1 => Resolution::Prefix {
                typed: token.to_string(),
                name: candidates[0].clone(),
            },
            _ => Resolution::Ambiguous {
                typed: token.to_string(),
                candidates,
            },
        }
    }

    /// Locate the command token in `args` (index 0 is the program name) and
    /// resolve it.
    pub fn resolve_args<I, T>(&self, args: I) -> ResolvedArgs
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let Some(index) = self.command_index(&args) else {
            return ResolvedArgs::NoCommand(args);
        };

        let token = args[index].to_string_lossy().into_owned();
        let resolution = self.resolve(&token);
        tracing::debug!(?resolution, "resolved command token");

        match resolution.name() {
            Some(name) => {
                let name = name.to_string();
                args[index] = OsString::from(&name);
                ResolvedArgs::Command { name, args }
            }
            None => ResolvedArgs::Unresolved(token),
        }
    }

    fn command_index(&self, args: &[OsString]) -> Option<usize> {
        let mut skip_value = false;
        for (index, arg) in args.iter().enumerate().skip(1) {
            if skip_value {
                skip_value = false;
                continue;
            }
            let arg = arg.to_string_lossy();
            if arg == "--" {
                return None;
            }
            if let Some(long) = arg.strip_prefix("--") {
                skip_value = !long.contains('=') && self.value_options.longs.iter().any(|l| l == long);
                continue;
            }
            if let Some(shorts) = arg.strip_prefix('-')
                && !shorts.is_empty()
            {
                // In a cluster like `-vd`, only a trailing value option takes
                // the next argument; `-dfile` carries its value inline.
                skip_value = shorts
                    .chars()
                    .position(|c| self.value_options.shorts.contains(&c))
                    .is_some_and(|pos| pos == shorts.chars().count() - 1);
                continue;
            }
            return Some(index);
        }
        None
    }
}
