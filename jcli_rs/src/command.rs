//! Command descriptors and the declarative registration model.
//!
//! Commands are declared through [`CommandModel`]: one chained call per field
//! naming its role (named / positional / raw sink), its aliases, and an
//! accessor the binder closure is derived from. The model erases the concrete
//! command type into a [`CommandDescriptor`] — boxed bind/construct/execute
//! closures over `dyn Any` — so the registry and trie stay non-generic.
//!
//! There is no attribute scanning and no type discovery: what is not declared
//! here does not exist.

use std::any::Any;

use crate::binder::{BindError, BindValue};
use crate::registry::RegistryError;
use crate::scope::ServiceScope;

pub(crate) type BindFn = Box<dyn Fn(&mut dyn Any, &str) -> Result<(), BindError> + Send + Sync>;
pub(crate) type RawSinkFn = Box<dyn Fn(&mut dyn Any, Vec<String>) + Send + Sync>;
pub(crate) type ConstructFn = Box<dyn Fn(&ServiceScope<'_>) -> Box<dyn Any> + Send + Sync>;
pub(crate) type ExecuteFn = Box<dyn Fn(&mut dyn Any) -> Result<i32, anyhow::Error> + Send + Sync>;
pub(crate) type CompleteFn = Box<dyn Fn(&[String], &str, &[String]) -> Vec<String> + Send + Sync>;

/// Render an alias the way it is typed: one dash for single-character
/// aliases, two for everything longer.
pub(crate) fn flag_display(alias: &str) -> String {
    if alias.chars().count() == 1 {
        format!("-{alias}")
    } else {
        format!("--{alias}")
    }
}

/// A named (flag-style) argument of one command.
pub struct NamedArgumentSpec {
    /// Alias set; single-character aliases are reached via `-x`,
    /// multi-character ones via `--xyz`.
    pub aliases: Vec<String>,
    pub description: String,
    /// False when the field type is `Option<T>`.
    pub required: bool,
    /// True for `bool` / `Option<bool>` fields: no value word is consumed
    /// unless the next token is literally `true` or `false`.
    pub boolean: bool,
    pub(crate) bind: BindFn,
}

/// A positional argument of one command, keyed by zero-based position.
pub struct PositionalArgumentSpec {
    pub position: usize,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub(crate) bind: BindFn,
}

/// One registered command: pattern, argument specs, and the closures that
/// construct, bind, and execute its instance. Immutable after registry
/// construction and safe to share across threads.
pub struct CommandDescriptor {
    /// Alternatives joined by `|`; each alternative may span several
    /// space-separated words. Empty for the default command.
    pub pattern: String,
    pub description: String,
    pub named: Vec<NamedArgumentSpec>,
    pub positional: Vec<PositionalArgumentSpec>,
    pub(crate) raw_sink: Option<RawSinkFn>,
    pub(crate) construct: ConstructFn,
    pub(crate) execute: ExecuteFn,
    pub(crate) complete_override: Option<CompleteFn>,
}

impl CommandDescriptor {
    /// Pattern alternatives in declaration order.
    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        self.pattern.split('|').map(str::trim).filter(|a| !a.is_empty())
    }

    pub fn is_default(&self) -> bool {
        self.pattern.trim().is_empty()
    }

    /// Name used in help output: the first alternative, or a placeholder for
    /// the default command.
    pub fn display_name(&self) -> &str {
        self.alternatives().next().unwrap_or("(default)")
    }

    /// Locate a named spec by the exact alias carried in a flag token.
    /// Form-sensitive: short-hand tokens reach single-character aliases only,
    /// long-hand tokens multi-character ones only.
    pub(crate) fn find_named(&self, name: &str, shorthand: bool) -> Option<usize> {
        self.named.iter().position(|spec| {
            spec.aliases.iter().any(|alias| {
                alias == name && (alias.chars().count() == 1) == shorthand
            })
        })
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("pattern", &self.pattern)
            .field("named", &self.named.len())
            .field("positional", &self.positional.len())
            .field("raw_sink", &self.raw_sink.is_some())
            .finish()
    }
}

/// Conversion from an execute closure's return value to a status code.
///
/// `()` maps to 0, an integer is used verbatim, and `Err` is caught at the
/// pipeline boundary and mapped to -1.
pub trait IntoStatus {
    fn into_status(self) -> Result<i32, anyhow::Error>;
}

impl IntoStatus for () {
    fn into_status(self) -> Result<i32, anyhow::Error> {
        Ok(0)
    }
}

impl IntoStatus for i32 {
    fn into_status(self) -> Result<i32, anyhow::Error> {
        Ok(self)
    }
}

impl IntoStatus for Result<(), anyhow::Error> {
    fn into_status(self) -> Result<i32, anyhow::Error> {
        self.map(|_| 0)
    }
}

impl IntoStatus for Result<i32, anyhow::Error> {
    fn into_status(self) -> Result<i32, anyhow::Error> {
        self
    }
}

/// Declarative builder for one command.
///
/// ```
/// use jcli::{CommandModel, CommandRegistry};
///
/// #[derive(Default)]
/// struct Greet {
///     name: String,
///     loud: Option<bool>,
/// }
///
/// let registry = CommandRegistry::builder()
///     .command(
///         CommandModel::<Greet>::new("greet|hello", "Print a greeting")
///             .positional("name", "Who to greet", |c| &mut c.name)
///             .named(&["l", "loud"], "Shout it", |c| &mut c.loud)
///             .run(|c| {
///                 let bang = if c.loud.unwrap_or(false) { "!" } else { "" };
///                 println!("{}{}", c.name, bang);
///             }),
///     )
///     .build()
///     .unwrap();
/// # let _ = registry;
/// ```
pub struct CommandModel<C: 'static> {
    pattern: String,
    description: String,
    named: Vec<NamedArgumentSpec>,
    positional: Vec<PositionalArgumentSpec>,
    raw_sink: Option<RawSinkFn>,
    duplicate_raw_sink: bool,
    construct: ConstructFn,
    execute: Option<ExecuteFn>,
    complete_override: Option<CompleteFn>,
    _marker: std::marker::PhantomData<fn() -> C>,
}

impl<C: Default + 'static> CommandModel<C> {
    /// Declare a command whose instance is `C::default()`. An empty pattern
    /// declares the registry-wide default command.
    pub fn new(pattern: &str, description: &str) -> Self {
        Self::with_factory(pattern, description, |_| C::default())
    }
}

impl<C: 'static> CommandModel<C> {
    /// Declare a command constructed through the call's service scope, for
    /// commands that take injected collaborators.
    pub fn with_factory(
        pattern: &str,
        description: &str,
        factory: impl Fn(&ServiceScope<'_>) -> C + Send + Sync + 'static,
    ) -> Self {
        CommandModel {
            pattern: pattern.trim().to_string(),
            description: description.to_string(),
            named: Vec::new(),
            positional: Vec::new(),
            raw_sink: None,
            duplicate_raw_sink: false,
            construct: Box::new(move |scope| Box::new(factory(scope))),
            execute: None,
            complete_override: None,
            _marker: std::marker::PhantomData,
        }
    }

    fn make_bind<T: BindValue>(
        access: impl Fn(&mut C) -> &mut T + Send + Sync + 'static,
        check: Option<Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>>,
    ) -> BindFn {
        Box::new(move |instance, raw| {
            let command = instance
                .downcast_mut::<C>()
                .expect("descriptor invoked with a foreign instance type");
            let value = T::bind_value(raw)?;
            if let Some(check) = &check {
                check(&value).map_err(BindError::new)?;
            }
            *access(command) = value;
            Ok(())
        })
    }

    /// Declare a named argument bound into the field behind `access`.
    /// Optionality and boolean-ness derive from the field type.
    pub fn named<T: BindValue>(
        self,
        aliases: &[&str],
        description: &str,
        access: impl Fn(&mut C) -> &mut T + Send + Sync + 'static,
    ) -> Self {
        self.push_named::<T>(aliases, description, Self::make_bind(access, None))
    }

    /// Like [`CommandModel::named`], with a validator run on every bound
    /// value before assignment.
    pub fn named_checked<T: BindValue>(
        self,
        aliases: &[&str],
        description: &str,
        access: impl Fn(&mut C) -> &mut T + Send + Sync + 'static,
        check: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.push_named::<T>(aliases, description, Self::make_bind(access, Some(Box::new(check))))
    }

    fn push_named<T: BindValue>(mut self, aliases: &[&str], description: &str, bind: BindFn) -> Self {
        self.named.push(NamedArgumentSpec {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            description: description.to_string(),
            required: !T::OPTIONAL,
            boolean: T::BOOLEAN,
            bind,
        });
        self
    }

    /// Declare the next positional argument (positions are assigned in
    /// declaration order, starting at 0).
    pub fn positional<T: BindValue>(
        self,
        name: &str,
        description: &str,
        access: impl Fn(&mut C) -> &mut T + Send + Sync + 'static,
    ) -> Self {
        self.push_positional::<T>(name, description, Self::make_bind(access, None))
    }

    /// Like [`CommandModel::positional`], with a validator.
    pub fn positional_checked<T: BindValue>(
        self,
        name: &str,
        description: &str,
        access: impl Fn(&mut C) -> &mut T + Send + Sync + 'static,
        check: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.push_positional::<T>(name, description, Self::make_bind(access, Some(Box::new(check))))
    }

    fn push_positional<T: BindValue>(mut self, name: &str, description: &str, bind: BindFn) -> Self {
        let position = self.positional.len();
        self.positional.push(PositionalArgumentSpec {
            position,
            name: name.to_string(),
            description: description.to_string(),
            required: !T::OPTIONAL,
            bind,
        });
        self
    }

    /// Declare the raw-argument sink: everything after `---` lands here
    /// verbatim. At most one per command.
    pub fn raw_args(
        mut self,
        access: impl Fn(&mut C) -> &mut Vec<String> + Send + Sync + 'static,
    ) -> Self {
        if self.raw_sink.is_some() {
            self.duplicate_raw_sink = true;
            return self;
        }
        self.raw_sink = Some(Box::new(move |instance, tail| {
            let command = instance
                .downcast_mut::<C>()
                .expect("descriptor invoked with a foreign instance type");
            *access(command) = tail;
        }));
        self
    }

    /// Attach the execute closure. Required: a model without one is a fatal
    /// registration error.
    pub fn run<R: IntoStatus>(
        mut self,
        body: impl Fn(&mut C) -> R + Send + Sync + 'static,
    ) -> Self {
        self.execute = Some(Box::new(move |instance| {
            let command = instance
                .downcast_mut::<C>()
                .expect("descriptor invoked with a foreign instance type");
            body(command).into_status()
        }));
        self
    }

    /// Replace the default completion behavior with a custom
    /// `(before, current, after) -> suggestions` closure.
    pub fn complete_with(
        mut self,
        complete: impl Fn(&[String], &str, &[String]) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.complete_override = Some(Box::new(complete));
        self
    }

    pub(crate) fn into_descriptor(self) -> Result<CommandDescriptor, RegistryError> {
        let label = if self.pattern.is_empty() {
            "(default)".to_string()
        } else {
            self.pattern.clone()
        };
        if self.duplicate_raw_sink {
            return Err(RegistryError::DuplicateRawSink { pattern: label });
        }
        let Some(execute) = self.execute else {
            return Err(RegistryError::MissingExecute { pattern: label });
        };
        for spec in &self.named {
            if spec.aliases.is_empty() {
                return Err(RegistryError::InvalidAlias {
                    pattern: label,
                    alias: String::new(),
                });
            }
            for alias in &spec.aliases {
                if alias.is_empty() || alias.chars().any(char::is_whitespace) {
                    return Err(RegistryError::InvalidAlias {
                        pattern: label,
                        alias: alias.clone(),
                    });
                }
            }
        }
        Ok(CommandDescriptor {
            pattern: self.pattern,
            description: self.description,
            named: self.named,
            positional: self.positional,
            raw_sink: self.raw_sink,
            construct: self.construct,
            execute,
            complete_override: self.complete_override,
        })
    }
}
