//! Diagnostics for load-time failures.

use std::fmt::Display;

use miette::Diagnostic;
use rtti_core::{RegistryError, TypeError};
use rtti_types::TableError;
use thiserror::Error;

/// A descriptor or value rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl Error {
    /// Stable code naming the failure, e.g. `rtti::registry::duplicate`.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Registry(e) => match e {
                RegistryError::DuplicateTypeCtor { .. } => "rtti::registry::duplicate",
                RegistryError::VersionMismatch { .. } => "rtti::registry::version",
                RegistryError::MalformedTable { source, .. } => table_code(source),
                RegistryError::UnresolvedTypeCtor { .. } => "rtti::registry::unresolved",
                RegistryError::ArityMismatch { .. } => "rtti::registry::arity",
                RegistryError::EquivCycle { .. } => "rtti::registry::equiv_cycle",
                RegistryError::AlreadyInstalled => "rtti::registry::installed",
            },
            Error::Type(e) => match e {
                TypeError::Mismatch { .. } => "rtti::type::mismatch",
                TypeError::UnknownTypeCtor { .. } => "rtti::type::unknown_ctor",
                TypeError::WrongTypeArity { .. } => "rtti::type::arity",
                TypeError::UnknownFunctor { .. } => "rtti::type::unknown_functor",
                TypeError::WrongKind { .. } => "rtti::type::kind",
                TypeError::ExistConflict { .. } => "rtti::type::exist_conflict",
            },
            Error::Table(e) => table_code(e),
        }
    }

    fn help_text(&self) -> Option<&'static str> {
        let help = match self {
            Error::Registry(e) => match e {
                RegistryError::DuplicateTypeCtor { .. } => {
                    "each (module, name, arity) may be registered once; drop the second registration"
                }
                RegistryError::VersionMismatch { .. } => {
                    "regenerate the descriptor with a matching compiler, or widen RegistryOptions::accepted_versions"
                }
                RegistryError::MalformedTable { source, .. } => return table_help(source),
                RegistryError::UnresolvedTypeCtor { .. } => {
                    "register the missing constructor in the same initialization phase"
                }
                RegistryError::ArityMismatch { .. } => {
                    "the number of type arguments must match the arity in the constructor's key"
                }
                RegistryError::EquivCycle { .. } => {
                    "an equivalence must eventually name a type with its own representation"
                }
                RegistryError::AlreadyInstalled => {
                    "install the global registry once; use Registry values directly for more"
                }
            },
            Error::Type(e) => match e {
                TypeError::Mismatch { .. } => "build the argument with the type the functor expects",
                TypeError::UnknownTypeCtor { .. } => "check the module, name and arity of the lookup",
                TypeError::WrongTypeArity { .. } => {
                    "apply the constructor to as many type arguments as its arity"
                }
                TypeError::UnknownFunctor { .. } => "functors are matched by name and arity",
                TypeError::WrongKind { .. } => return None,
                TypeError::ExistConflict { .. } => {
                    "all arguments mentioning one existential variable must share its type"
                }
            },
            Error::Table(e) => return table_help(e),
        };
        Some(help)
    }
}

fn table_code(e: &TableError) -> &'static str {
    match e {
        TableError::EmptyFunctorTable
        | TableError::OrdinalMismatch { .. }
        | TableError::DuplicateFunctor { .. }
        | TableError::FieldNamesLength { .. }
        | TableError::EnumHasArguments { .. }
        | TableError::NoTagShape => "rtti::table::functors",
        TableError::ParamOutOfRange { .. }
        | TableError::ExistOutOfRange { .. }
        | TableError::UnboundExist { .. }
        | TableError::ExistOutsideDu => "rtti::table::variables",
        _ => "rtti::table::layout",
    }
}

fn table_help(e: &TableError) -> Option<&'static str> {
    match e {
        TableError::TagOrder { .. } => {
            Some("assign tags in declaration order so tag order and ordinal order agree")
        }
        TableError::LocalWithCell { .. } => {
            Some("only constants can keep their secondary tag in the word itself")
        }
        TableError::UnboundExist { .. } => {
            Some("an existential variable must occur in at least one argument type")
        }
        TableError::TooManyPtags { .. } => {
            Some("let the last primary tag be shared through remote secondary tags")
        }
        _ => None,
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(Error::code(self)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help_text()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }
}
