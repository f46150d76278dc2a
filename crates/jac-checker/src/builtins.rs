//! Builtin functions available in every module

use crate::Type;

pub const NAMES: &[&str] = &["print", "len", "str", "int", "float", "range"];

/// Declared signature of a builtin. Argument kinds that a plain signature
/// cannot express (`len` of str or list) are checked by the type checker.
pub fn signature(name: &str) -> Option<Type> {
    let ty = match name {
        "print" => Type::variadic(Type::None),
        "len" => Type::function(vec![Type::Any], Type::Int),
        "str" => Type::function(vec![Type::Any], Type::Str),
        "int" => Type::function(vec![Type::Any], Type::Int),
        "float" => Type::function(vec![Type::Any], Type::Float),
        "range" => Type::variadic(Type::list(Type::Int)),
        _ => return None,
    };
    Some(ty)
}
