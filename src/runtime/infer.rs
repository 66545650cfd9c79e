//! Best-effort type descriptors for untyped runtime values.

use super::value::Value;

/// Sentinel used when element classes disagree
pub const ANY: &str = "Any";

/// Infer a type descriptor such as `int`, `list[str]` or `dict[str, int]`.
///
/// Only one level is inspected: elements contribute their class name, not
/// their own shape. Sequences sample their first two elements only.
pub fn infer(value: &Value) -> String {
    match value {
        Value::None => "None".to_string(),
        Value::Dict(entries) => infer_mapping(entries),
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
            infer_sequence(value.class_name(), items)
        }
        // str is iterable but always a scalar here
        _ => value.class_name().to_string(),
    }
}

fn infer_mapping(entries: &[(Value, Value)]) -> String {
    if entries.is_empty() {
        return "dict".to_string();
    }

    let keys = unify(entries.iter().map(|(k, _)| k));
    let values = unify(entries.iter().map(|(_, v)| v));
    format!("dict[{keys}, {values}]")
}

fn infer_sequence(container: &str, items: &[Value]) -> String {
    match items {
        [] => container.to_string(),
        [only] => format!("{container}[{}]", only.class_name()),
        [first, second, ..] => {
            if first.class_name() != second.class_name() {
                format!("{container}[{ANY}]")
            } else {
                format!("{container}[{}]", first.class_name())
            }
        }
    }
}

/// One shared class name, or `Any`
fn unify<'a>(mut values: impl Iterator<Item = &'a Value>) -> String {
    let Some(first) = values.next() else {
        return ANY.to_string();
    };
    let class = first.class_name();
    if values.all(|v| v.class_name() == class) {
        class.to_string()
    } else {
        ANY.to_string()
    }
}
