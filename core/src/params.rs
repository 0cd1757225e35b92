//! Parameter validation.
//!
//! RULE: Nothing reaches the data source until every supplied parameter
//! has been matched to a declared `ParamSpec`, type-checked and passed its
//! rule. Values are then bound by name, never spliced into SQL text.

use crate::{
    catalog::{ParamKind, ParamRule, ParamSpec},
    error::ParamError,
    types::{Params, Value},
};

/// A validated parameter, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name:  &'static str,
    pub value: Value,
}

/// Check `params` against `specs`. Returns bindings in declaration order.
pub fn validate(specs: &[ParamSpec], params: &Params) -> Result<Vec<BoundParam>, ParamError> {
    if let Some(name) = params.keys().find(|k| !specs.iter().any(|s| s.name == k.as_str())) {
        return Err(ParamError::Unexpected { name: name.clone() });
    }

    specs
        .iter()
        .map(|spec| {
            let value = params.get(spec.name).ok_or_else(|| ParamError::Missing {
                name: spec.name.to_string(),
            })?;
            check_kind(spec, value)?;
            check_rule(spec, value)?;
            Ok(BoundParam { name: spec.name, value: value.clone() })
        })
        .collect()
}

fn check_kind(spec: &ParamSpec, value: &Value) -> Result<(), ParamError> {
    let ok = match spec.kind {
        ParamKind::Text    => matches!(value, Value::Text(_)),
        ParamKind::Integer => matches!(value, Value::Integer(_)),
    };
    if ok {
        Ok(())
    } else {
        Err(ParamError::TypeMismatch {
            name:     spec.name.to_string(),
            expected: match spec.kind {
                ParamKind::Text    => "text",
                ParamKind::Integer => "an integer",
            },
        })
    }
}

fn check_rule(spec: &ParamSpec, value: &Value) -> Result<(), ParamError> {
    match spec.rule {
        ParamRule::Any => Ok(()),
        ParamRule::Identifier { max_len } => {
            let text = value.as_text().unwrap_or_default();
            if is_identifier(text, max_len) {
                Ok(())
            } else {
                Err(ParamError::Rejected {
                    name: spec.name.to_string(),
                    rule: "identifier",
                })
            }
        }
    }
}

fn is_identifier(text: &str, max_len: usize) -> bool {
    !text.is_empty()
        && text.chars().count() <= max_len
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
