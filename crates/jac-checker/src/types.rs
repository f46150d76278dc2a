//! Checked type representations

use std::fmt;

use jac_ast::{Span, TypeExpr};

/// A type as seen by the checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    None,

    /// List type
    List(Box<Type>),

    /// Function type; `params: None` accepts any number of arguments
    Fn {
        params: Option<Vec<Type>>,
        ret: Box<Type>,
    },

    /// Statically unknown; compatible with everything
    Any,

    /// Error type (for error recovery); never reported twice
    Error,
}

impl Type {
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Fn {
            params: Some(params),
            ret: Box::new(ret),
        }
    }

    pub fn variadic(ret: Type) -> Self {
        Type::Fn {
            params: None,
            ret: Box::new(ret),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Any or Error: nothing useful can be said about the value
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Any | Type::Error)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether a value of this type may be stored where `target` is expected
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        match (self, target) {
            (a, b) if a.is_unknown() || b.is_unknown() => true,
            (Type::Int, Type::Float) => true,
            (Type::List(a), Type::List(b)) => a.is_assignable_to(b),
            (Type::Fn { .. }, Type::Fn { .. }) => true,
            (a, b) => a == b,
        }
    }

    /// Resolve an annotation; `None` for names the checker does not know
    pub fn from_annotation(ty: &TypeExpr) -> Option<Type> {
        let resolved = match ty.name.as_str() {
            "int" => Type::Int,
            "float" => Type::Float,
            "str" => Type::Str,
            "bool" => Type::Bool,
            "none" => Type::None,
            "any" => Type::Any,
            "fn" => Type::variadic(Type::Any),
            "list" => match &ty.arg {
                Some(arg) => Type::list(Type::from_annotation(arg)?),
                None => Type::list(Type::Any),
            },
            _ => return None,
        };
        Some(resolved)
    }

    /// Annotation syntax for this type, used to fill `inferred` slots
    pub fn to_type_expr(&self, span: Span) -> Option<TypeExpr> {
        let name = match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "str",
            Type::Bool => "bool",
            Type::None => "none",
            Type::Any => "any",
            Type::Fn { .. } => "fn",
            Type::List(elem) => {
                let arg = elem.to_type_expr(span)?;
                return Some(TypeExpr::with_arg("list", arg, span));
            }
            Type::Error => return None,
        };
        Some(TypeExpr::named(name, span))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Str => f.write_str("str"),
            Type::Bool => f.write_str("bool"),
            Type::None => f.write_str("none"),
            Type::List(elem) => write!(f, "list[{}]", elem),
            Type::Fn { params: None, ret } => write!(f, "fn(...) -> {}", ret),
            Type::Fn {
                params: Some(params),
                ret,
            } => {
                let params: Vec<String> = params.iter().map(|t| t.to_string()).collect();
                write!(f, "fn({}) -> {}", params.join(", "), ret)
            }
            Type::Any => f.write_str("any"),
            Type::Error => f.write_str("<error>"),
        }
    }
}
