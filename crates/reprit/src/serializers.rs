//! Argument serializers: render a single [`Value`] as source text.
//!
//! Literals use Python syntax, matching the `Head(arg, kw=value)` call shape
//! the generator emits.

use std::fmt::Write as _;

use crate::errors::ReprResult;
use crate::object::ClassRef;
use crate::value::Value;

/// Renders one argument value.
pub trait ArgumentSerializer: Send + Sync {
    fn serialize(&self, value: &Value) -> ReprResult<String>;
}

impl<F> ArgumentSerializer for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn serialize(&self, value: &Value) -> ReprResult<String> {
        Ok(self(value))
    }
}

/// The generic literal renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSerializer;

impl ArgumentSerializer for SimpleSerializer {
    fn serialize(&self, value: &Value) -> ReprResult<String> {
        literal(value)
    }
}

/// Renders modules, functions, classes and methods as dotted references, and
/// everything else like [`SimpleSerializer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexSerializer;

impl ArgumentSerializer for ComplexSerializer {
    fn serialize(&self, value: &Value) -> ReprResult<String> {
        reference(value)
    }
}

/// Dotted-reference rendering used by [`ComplexSerializer`].
pub fn reference(value: &Value) -> ReprResult<String> {
    match value {
        Value::Module(module) => Ok(module.name.clone()),
        Value::Function(function) => Ok(dotted(&function.module, &function.qualname)),
        Value::Class(class) => Ok(dotted(class.module(), class.qualname())),
        Value::BoundMethod { owner, name } => Ok(format!("{}.{name}", reference(owner)?)),
        Value::Descriptor { owner, name } => {
            Ok(format!("{}.{name}", dotted(owner.module(), owner.qualname())))
        }
        _ => literal(value),
    }
}

fn dotted(module: &str, qualname: &str) -> String {
    if module.is_empty() {
        qualname.to_string()
    } else {
        format!("{module}.{qualname}")
    }
}

/// Generic literal rendering used by [`SimpleSerializer`].
pub fn literal(value: &Value) -> ReprResult<String> {
    let mut out = String::new();
    write_literal(&mut out, value)?;
    Ok(out)
}

fn write_literal(out: &mut String, value: &Value) -> ReprResult<()> {
    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(number) => out.push_str(&number.to_string()),
        Value::Float(number) => out.push_str(&float_literal(*number)),
        Value::Str(text) => out.push_str(&str_literal(text)),
        Value::Bytes(bytes) => out.push_str(&bytes_literal(bytes)),
        Value::Ellipsis => out.push_str("Ellipsis"),
        Value::Tuple(items) => {
            out.push('(');
            write_items(out, items)?;
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::List(items) => {
            out.push('[');
            write_items(out, items)?;
            out.push(']');
        }
        Value::Dict(entries) => {
            out.push('{');
            for (index, (key, item)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_literal(out, key)?;
                out.push_str(": ");
                write_literal(out, item)?;
            }
            out.push('}');
        }
        Value::Module(module) => {
            let _ = write!(out, "<module {}>", str_literal(&module.name));
        }
        Value::Function(function) => {
            let _ = write!(out, "<function {}>", function.qualname);
        }
        Value::Class(class) => out.push_str(&class_literal(class)),
        Value::BoundMethod { owner, name } => {
            let _ = write!(
                out,
                "<bound method {}.{name} of {}>",
                owner_name(owner),
                literal(owner)?
            );
        }
        Value::Descriptor { owner, name } => {
            let _ = write!(out, "<attribute '{name}' of '{}' objects>", owner.qualname());
        }
        Value::Iterator(iterator) => {
            let _ = write!(out, "<{} object>", iterator.type_name());
        }
        Value::Instance(object) => out.push_str(&object.represent()?),
    }
    Ok(())
}

fn write_items(out: &mut String, items: &[Value]) -> ReprResult<()> {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_literal(out, item)?;
    }
    Ok(())
}

/// Class name a method is looked up on: the class itself for class-bound
/// methods, the owner's type otherwise.
fn owner_name(owner: &Value) -> String {
    match owner {
        Value::Class(class) => class.qualname().to_string(),
        other => {
            let type_name = other.type_name();
            match type_name.rsplit_once('.') {
                Some((_, name)) => name.to_string(),
                None => type_name,
            }
        }
    }
}

fn class_literal(class: &ClassRef) -> String {
    if class.module() == "builtins" {
        format!("<class '{}'>", class.qualname())
    } else {
        format!("<class '{}'>", class.qualified())
    }
}

/// Shortest round-tripping float text, switching to exponent form outside
/// `1e-4 <= |x| < 1e16`.
pub fn float_literal(number: f64) -> String {
    if number.is_nan() {
        return "nan".into();
    }
    if number.is_infinite() {
        return if number > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let scientific = format!("{number:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if number == 0.0 || (-4..16).contains(&exponent) {
        let fixed = number.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{fixed}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// Quoted string literal: single quotes unless the text holds a `'` but no `"`.
pub fn str_literal(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = u32::from(c);
                let _ = if code <= 0xff {
                    write!(out, "\\x{code:02x}")
                } else if code <= 0xffff {
                    write!(out, "\\u{code:04x}")
                } else {
                    write!(out, "\\U{code:08x}")
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn bytes_literal(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(char::from(quote));
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
    out.push(char::from(quote));
    out
}
