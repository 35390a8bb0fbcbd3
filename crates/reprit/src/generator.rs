//! Representation generation from constructor signatures.
//!
//! [`generate_repr`] closes over a routine's [`Signature`], a field seeker, an
//! argument serializer and a [`Policy`], and yields a [`Repr`]: an immutable,
//! thread-safe function from instances to `Head(arg, ..., kw=value)` strings.
//!
//! # Argument rules
//!
//! Parameters are walked in declaration order:
//!
//! - positional-only parameters render as bare values;
//! - positional-or-keyword parameters render bare, or as `name=value` when
//!   `prefer_keyword` is set and the variadic positional slot is empty, or
//!   once keyword fallback has been entered;
//! - the variadic positional expands element by element, except single-use
//!   iterators, which render as one placeholder entry so that rendering never
//!   consumes them;
//! - keyword-only parameters render as `name=value`;
//! - the variadic keyword mapping renders one `key=value` per entry, in order.
//!
//! With `skip_defaults`, a field equal to its parameter's default is left out,
//! unless it is positional and a later positional still has to be shown. A
//! skipped positional, or a kept positional-or-keyword default, enters keyword
//! fallback: every later positional-or-keyword parameter renders as
//! `name=value` so the call shape stays valid.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::errors::{ReprError, ReprResult};
use crate::object::{Field, Object};
use crate::seekers::{FieldSeeker, SimpleSeeker};
use crate::serializers::{ArgumentSerializer, SimpleSerializer};
use crate::signature::{Parameter, ParameterKind, Routine, Signature, SignatureError};
use crate::value::{Represent, Value};

/// Rendering options, fixed when a representation is generated.
///
/// ```
/// use reprit::Policy;
///
/// let policy = Policy::builder().skip_defaults(true).build();
/// assert!(policy.skip_defaults && !policy.prefer_keyword);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, bon::Builder)]
pub struct Policy {
    /// Render positional-or-keyword parameters as `name=value` where possible.
    #[builder(default)]
    pub prefer_keyword: bool,
    /// Leave out parameters whose field equals the declared default.
    #[builder(default)]
    pub skip_defaults: bool,
    /// Prefix the class name with its module's dotted path.
    #[builder(default)]
    pub with_module_name: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Class,
    Method(String),
}

/// A generated representation for instances of `T`.
///
/// Cheap to clone; clones share the seeker and serializer.
pub struct Repr<T: ?Sized> {
    signature: Signature,
    head: Head,
    seeker: Arc<dyn FieldSeeker<T>>,
    serializer: Arc<dyn ArgumentSerializer>,
    policy: Policy,
}

/// Generates a representation for instances constructed through `routine`.
///
/// Callers guarantee that construction discards nothing: every field the
/// seeker reads was set from exactly one parameter, directly or after a
/// reversible transformation. The generator cannot check this.
///
/// Fails only when the routine's parameter list is malformed.
#[tracing::instrument(
    name = "reprit.generate",
    level = "debug",
    skip_all,
    fields(routine = %routine.name(), policy = ?policy)
)]
pub fn generate_repr<T, S, A>(
    routine: &Routine,
    seeker: S,
    serializer: A,
    policy: Policy,
) -> Result<Repr<T>, SignatureError>
where
    T: Object + ?Sized,
    S: FieldSeeker<T> + 'static,
    A: ArgumentSerializer + 'static,
{
    Repr::new(routine, Arc::new(seeker), Arc::new(serializer), policy)
}

/// [`generate_repr`] with the simple seeker and serializer.
pub fn generate_repr_simple<T>(routine: &Routine, policy: Policy) -> Result<Repr<T>, SignatureError>
where
    T: Object + ?Sized,
{
    generate_repr(routine, SimpleSeeker, SimpleSerializer, policy)
}

impl<T: Object + ?Sized> Repr<T> {
    fn new(
        routine: &Routine,
        seeker: Arc<dyn FieldSeeker<T>>,
        serializer: Arc<dyn ArgumentSerializer>,
        policy: Policy,
    ) -> Result<Self, SignatureError> {
        let signature = routine.signature()?;
        let head = if routine.is_initializer() {
            Head::Class
        } else {
            Head::Method(routine.name().to_string())
        };
        tracing::debug!(parameters = signature.len(), "generated representation");
        Ok(Self {
            signature,
            head,
            seeker,
            serializer,
            policy,
        })
    }

    /// Starts a builder defaulting to the simple seeker and serializer.
    pub fn builder(routine: &Routine) -> ReprBuilder<T> {
        ReprBuilder::new(routine)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// `ClassName` or `ClassName.method`, named after the instance's runtime class.
    pub fn head(&self, instance: &T) -> String {
        let class = instance.class();
        let class_name = if self.policy.with_module_name {
            class.qualified()
        } else {
            class.qualname().to_string()
        };
        match &self.head {
            Head::Class => class_name,
            Head::Method(method) => format!("{class_name}.{method}"),
        }
    }

    /// Renders `instance`, or fails without partial output.
    #[tracing::instrument(name = "reprit.render", level = "trace", skip_all)]
    pub fn render(&self, instance: &T) -> ReprResult<String> {
        let arguments = self.arguments(instance)?;
        Ok(format!("{}({})", self.head(instance), arguments.join(", ")))
    }

    /// The rendered argument list, in call order.
    pub fn arguments(&self, instance: &T) -> ReprResult<Vec<String>> {
        let fields = self.recover_fields(instance)?;
        let parameters: Vec<&Parameter> = self.signature.iter().collect();

        let populated = parameters
            .iter()
            .zip(&fields)
            .any(|(parameter, field)| {
                parameter.kind() == ParameterKind::VarPositional && field.is_populated()
            });
        let skip_defaults = self.policy.skip_defaults;
        let defaulted: Vec<bool> = parameters
            .iter()
            .zip(&fields)
            .map(|(parameter, field)| skip_defaults && parameter.is_default(field))
            .collect();
        let later_required = later_positional_required(&parameters, &defaulted);

        let mut keyword = self.policy.prefer_keyword && !populated;
        let mut arguments = Vec::with_capacity(fields.len());

        for (index, (parameter, field)) in parameters.iter().zip(&fields).enumerate() {
            let name = parameter.name();
            let skippable = defaulted[index] && !populated;
            match parameter.kind() {
                ParameterKind::PositionalOnly => {
                    if skippable && !later_required[index] {
                        trace!(parameter = name, "skipping default");
                        keyword = true;
                        continue;
                    }
                    arguments.push(self.serialize(field)?);
                }
                ParameterKind::PositionalOrKeyword => {
                    if skippable {
                        if !later_required[index] {
                            trace!(parameter = name, "skipping default");
                            keyword = true;
                            continue;
                        }
                        if !keyword {
                            trace!(parameter = name, "falling back to keyword arguments");
                            keyword = true;
                        }
                    }
                    let text = self.serialize(field)?;
                    arguments.push(if keyword {
                        format!("{name}={text}")
                    } else {
                        text
                    });
                }
                ParameterKind::VarPositional => match field {
                    Value::Iterator(_) => arguments.push(self.serialize(field)?),
                    Value::Tuple(items) | Value::List(items) => {
                        for item in items {
                            arguments.push(self.serialize(item)?);
                        }
                    }
                    other => {
                        return Err(unexpected(name, "a tuple, list or iterator", other));
                    }
                },
                ParameterKind::KeywordOnly => {
                    if defaulted[index] {
                        trace!(parameter = name, "skipping default");
                        continue;
                    }
                    arguments.push(format!("{name}={}", self.serialize(field)?));
                }
                ParameterKind::VarKeyword => {
                    let Value::Dict(entries) = field else {
                        return Err(unexpected(name, "a mapping with string keys", field));
                    };
                    for (key, item) in entries {
                        let Value::Str(key) = key else {
                            return Err(unexpected(name, "a mapping with string keys", key));
                        };
                        arguments.push(format!("{key}={}", self.serialize(item)?));
                    }
                }
            }
        }

        Ok(arguments)
    }

    fn recover_fields(&self, instance: &T) -> ReprResult<Vec<Value>> {
        self.signature
            .iter()
            .map(|parameter| -> ReprResult<Value> {
                let field = self.seeker.seek(instance, parameter.name())?;
                if field.is_computed() {
                    trace!(parameter = parameter.name(), "invoking computed field");
                }
                Ok(Field::resolve(field))
            })
            .collect()
    }

    fn serialize(&self, value: &Value) -> ReprResult<String> {
        self.serializer.serialize(value)
    }
}

/// For each parameter, whether some later positional parameter must be shown.
fn later_positional_required(parameters: &[&Parameter], defaulted: &[bool]) -> Vec<bool> {
    let mut required = vec![false; parameters.len()];
    let mut seen = false;
    for index in (0..parameters.len()).rev() {
        required[index] = seen;
        if parameters[index].kind().is_positional() && !defaulted[index] {
            seen = true;
        }
    }
    required
}

fn unexpected(parameter: &str, expected: &'static str, found: &Value) -> ReprError {
    ReprError::UnexpectedValue {
        parameter: parameter.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl<T: ?Sized> Clone for Repr<T> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            head: self.head.clone(),
            seeker: Arc::clone(&self.seeker),
            serializer: Arc::clone(&self.serializer),
            policy: self.policy,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Repr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repr")
            .field("head", &self.head)
            .field("signature", &self.signature)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [`Repr`].
///
/// ```
/// use reprit::{ComplexSeeker, DynObject, Repr, Routine};
///
/// let repr = Repr::<DynObject>::builder(&Routine::initializer().positional_or_keyword("id_"))
///     .seeker(ComplexSeeker)
///     .prefer_keyword(true)
///     .build()
///     .unwrap();
/// assert!(repr.policy().prefer_keyword);
/// ```
pub struct ReprBuilder<T: ?Sized> {
    routine: Routine,
    seeker: Arc<dyn FieldSeeker<T>>,
    serializer: Arc<dyn ArgumentSerializer>,
    policy: Policy,
}

impl<T: Object + ?Sized> ReprBuilder<T> {
    pub fn new(routine: &Routine) -> Self {
        Self {
            routine: routine.clone(),
            seeker: Arc::new(SimpleSeeker),
            serializer: Arc::new(SimpleSerializer),
            policy: Policy::default(),
        }
    }

    pub fn seeker(mut self, seeker: impl FieldSeeker<T> + 'static) -> Self {
        self.seeker = Arc::new(seeker);
        self
    }

    pub fn serializer(mut self, serializer: impl ArgumentSerializer + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn prefer_keyword(mut self, prefer_keyword: bool) -> Self {
        self.policy.prefer_keyword = prefer_keyword;
        self
    }

    pub fn skip_defaults(mut self, skip_defaults: bool) -> Self {
        self.policy.skip_defaults = skip_defaults;
        self
    }

    pub fn with_module_name(mut self, with_module_name: bool) -> Self {
        self.policy.with_module_name = with_module_name;
        self
    }

    pub fn build(self) -> Result<Repr<T>, SignatureError> {
        Repr::new(&self.routine, self.seeker, self.serializer, self.policy)
    }
}

/// An instance paired with its generated representation.
///
/// Wrap one in [`Value::Instance`] to nest it inside another instance's
/// arguments; it also implements `Display`.
pub struct Bound<T> {
    instance: T,
    repr: Arc<Repr<T>>,
}

impl<T: Object> Bound<T> {
    pub fn new(instance: T, repr: Arc<Repr<T>>) -> Self {
        Self { instance, repr }
    }

    pub fn instance(&self) -> &T {
        &self.instance
    }

    pub fn into_value(self) -> Value
    where
        T: Send + Sync + 'static,
    {
        Value::instance(self)
    }
}

impl<T> fmt::Debug for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("repr", &self.repr)
            .finish_non_exhaustive()
    }
}

impl<T: Object + Send + Sync> Represent for Bound<T> {
    fn represent(&self) -> ReprResult<String> {
        self.repr.render(&self.instance)
    }

    fn type_name(&self) -> String {
        self.instance.class().qualified()
    }
}

impl<T: Object> fmt::Display for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr.render(&self.instance) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{} object>", self.instance.class().qualname()),
        }
    }
}
