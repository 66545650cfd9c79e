//! Size-limited textual examples, following the reprlib policy.
//!
//! Output is meant to sit on a single documentation line, so strings and
//! integers are cut in the middle and containers stop after a few items.

use super::value::{Object, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

const FILL: &str = "...";

/// Truncation limits, defaults match Python's `reprlib.Repr`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReprLimits {
    pub maxlevel: usize,
    pub maxtuple: usize,
    pub maxlist: usize,
    pub maxset: usize,
    pub maxdict: usize,
    pub maxstring: usize,
    pub maxlong: usize,
    pub maxother: usize,
}

impl Default for ReprLimits {
    fn default() -> Self {
        Self {
            maxlevel: 6,
            maxtuple: 6,
            maxlist: 6,
            maxset: 6,
            maxdict: 4,
            maxstring: 30,
            maxlong: 40,
            maxother: 30,
        }
    }
}

/// Bounded renderer for example values
#[derive(Debug, Clone, Default)]
pub struct Repr {
    limits: ReprLimits,
}

impl Repr {
    pub fn new(limits: ReprLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ReprLimits {
        &self.limits
    }

    /// Render `value` for embedding in a docstring
    pub fn repr(&self, value: &Value) -> String {
        self.repr1(value, self.limits.maxlevel)
    }

    fn repr1(&self, value: &Value, level: usize) -> String {
        match value {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => truncate_middle(&i.to_string(), self.limits.maxlong),
            Value::Float(f) => truncate_middle(&float_repr(*f), self.limits.maxother),
            Value::Str(s) => self.repr_str(s),
            Value::List(items) => {
                let refs: Vec<&Value> = items.iter().collect();
                self.repr_iterable(&refs, level, "[", "]", self.limits.maxlist, "")
            }
            Value::Tuple(items) => {
                let refs: Vec<&Value> = items.iter().collect();
                self.repr_iterable(&refs, level, "(", ")", self.limits.maxtuple, ",")
            }
            Value::Set(items) => {
                if items.is_empty() {
                    return "set()".to_string();
                }
                let sorted = possibly_sorted(items.iter().collect());
                self.repr_iterable(&sorted, level, "{", "}", self.limits.maxset, "")
            }
            Value::Dict(entries) => self.repr_dict(entries, level),
            Value::Object(object) => self.repr_object(object),
        }
    }

    fn repr_iterable(
        &self,
        items: &[&Value],
        level: usize,
        left: &str,
        right: &str,
        maxiter: usize,
        trail: &str,
    ) -> String {
        let n = items.len();
        let body = if level == 0 && n > 0 {
            FILL.to_string()
        } else {
            let mut pieces: Vec<String> = items
                .iter()
                .take(maxiter)
                .map(|item| self.repr1(item, level.saturating_sub(1)))
                .collect();
            if n > maxiter {
                pieces.push(FILL.to_string());
            }
            pieces.join(", ")
        };
        let trail = if n == 1 { trail } else { "" };
        format!("{left}{body}{trail}{right}")
    }

    fn repr_dict(&self, entries: &[(Value, Value)], level: usize) -> String {
        let n = entries.len();
        if n == 0 {
            return "{}".to_string();
        }
        if level == 0 {
            return format!("{{{FILL}}}");
        }

        let keys = possibly_sorted(entries.iter().map(|(k, _)| k).collect());
        let mut pieces = Vec::new();
        for key in keys.into_iter().take(self.limits.maxdict) {
            let value = entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v)
                .unwrap_or(&Value::None);
            pieces.push(format!(
                "{}: {}",
                self.repr1(key, level - 1),
                self.repr1(value, level - 1)
            ));
        }
        if n > self.limits.maxdict {
            pieces.push(FILL.to_string());
        }
        format!("{{{}}}", pieces.join(", "))
    }

    fn repr_str(&self, s: &str) -> String {
        let max = self.limits.maxstring;
        let head: String = s.chars().take(max).collect();
        let quoted = quote_str(&head);
        if quoted.chars().count() <= max {
            return quoted;
        }

        let i = max.saturating_sub(3) / 2;
        let j = max.saturating_sub(3).saturating_sub(i);
        let chars: Vec<char> = s.chars().collect();
        let kept: String = chars[..i.min(chars.len())]
            .iter()
            .chain(&chars[chars.len().saturating_sub(j)..])
            .collect();
        truncate_middle_with(&quote_str(&kept), i, j)
    }

    fn repr_object(&self, object: &Object) -> String {
        match &object.repr {
            Some(text) if !is_address_placeholder(text) => {
                truncate_middle(text, self.limits.maxother)
            }
            _ => format!("<{}>", object.class),
        }
    }
}

/// Default-limit rendering
pub fn repr(value: &Value) -> String {
    Repr::default().repr(value)
}

/// True for the generic `<module.Class object at 0x...>` form
pub fn is_address_placeholder(text: &str) -> bool {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| {
            Regex::new(r"^<[\w.]+ object at 0x[0-9A-Fa-f]+>$").expect("placeholder pattern is valid")
        })
        .is_match(text)
}

fn truncate_middle(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let i = max.saturating_sub(3) / 2;
    let j = max.saturating_sub(3).saturating_sub(i);
    truncate_middle_with(s, i, j)
}

fn truncate_middle_with(s: &str, i: usize, j: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let i = i.min(chars.len());
    let tail_start = chars.len().saturating_sub(j).max(i);
    let head: String = chars[..i].iter().collect();
    let tail: String = chars[tail_start..].iter().collect();
    format!("{head}{FILL}{tail}")
}

/// Python-style quoting of a string literal
fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Float formatting close to Python's `repr(float)`
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let s = format!("{f:?}");
    match s.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// Sort numbers or strings; leave mixed collections in their given order
fn possibly_sorted(mut items: Vec<&Value>) -> Vec<&Value> {
    let all_numeric = items
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Float(_) | Value::Bool(_)));
    let all_strings = items.iter().all(|v| matches!(v, Value::Str(_)));

    if all_numeric {
        items.sort_by(|a, b| {
            numeric(a)
                .partial_cmp(&numeric(b))
                .unwrap_or(Ordering::Equal)
        });
    } else if all_strings {
        items.sort_by(|a, b| match (a, b) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => Ordering::Equal,
        });
    }
    items
}

fn numeric(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}
