//! Argument materialization: lowered expressions to registry values.
//!
//! Total over [`Expr`]: shapes the registry has no model for become
//! [`Value::Opaque`] instead of failing.

use crate::config::ConstructorConfig;
use crate::syntax::{Call, Expr};
use crate::types::{Literal, Reference, Value};

/// Convert one argument expression into a [`Value`].
pub fn materialize(expr: &Expr, constructors: &ConstructorConfig) -> Value {
    match expr {
        Expr::Str(s) => Value::Literal(Literal::String(s.clone())),
        Expr::Integer(v) => match i64::try_from(*v) {
            Ok(v) => Value::Literal(Literal::Integer(v)),
            Err(_) => Value::opaque("integer"),
        },
        Expr::Float(v) => Value::Literal(Literal::Float(*v)),
        Expr::Bool(b) => Value::Literal(Literal::Bool(*b)),
        Expr::None => Value::Literal(Literal::None),
        Expr::Name(name) => Value::reference(name.clone()),
        Expr::Attribute { .. } => match expr.dotted_name() {
            Some(dotted) => Value::reference(dotted),
            None => Value::opaque("attribute"),
        },
        Expr::List(items) | Expr::Tuple(items) => Value::Sequence(
            items
                .iter()
                .map(|item| materialize(item, constructors))
                .collect(),
        ),
        Expr::Call(call) => materialize_call(call, constructors),
        Expr::Other(kind) => Value::opaque(kind.clone()),
    }
}

fn materialize_call(call: &Call, constructors: &ConstructorConfig) -> Value {
    if let Expr::Name(callee) = call.callee.as_ref() {
        if constructors.is_wrapper(callee) {
            if let Some(inner) = call.keyword("agent").and_then(Expr::dotted_name) {
                return Value::Reference(Reference::wrapped(inner, callee.clone()));
            }
        }
    }
    match call.callee.dotted_name() {
        Some(name) => Value::Call { call: name },
        None => Value::opaque("call"),
    }
}
