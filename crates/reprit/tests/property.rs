mod common;

use proptest::collection::vec;
use proptest::prelude::*;
use reprit::{
    ClassRef, ComplexSeeker, DynObject, Parameter, ParameterKind, Policy, Repr, Routine, Value,
};

use common::{bind, parse_call};

const MODULE: &str = "pkg.models";

#[derive(Debug, Clone, Copy)]
enum Storage {
    Exact,
    Prefixed,
    Suffixed,
}

#[derive(Debug, Clone)]
struct ParamSeed {
    has_default: bool,
    default: Value,
    reuse_default: bool,
    value: Value,
    storage: Storage,
    computed: bool,
}

#[derive(Debug, Clone)]
struct Case {
    routine: Routine,
    object: DynObject,
    fields: Vec<(String, Value)>,
    policy: Policy,
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-3i64..3).prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite floats", |number| number.is_finite())
            .prop_map(Value::Float),
        vec(any::<char>(), 0..8).prop_map(|chars| Value::Str(chars.into_iter().collect())),
        vec(any::<u8>(), 0..6).prop_map(Value::Bytes),
        vec(-5i64..5, 0..3).prop_map(|items| Value::Tuple(items.into_iter().map(Value::from).collect())),
    ]
}

fn arb_storage() -> impl Strategy<Value = Storage> {
    prop_oneof![Just(Storage::Exact), Just(Storage::Prefixed), Just(Storage::Suffixed)]
}

fn arb_seed() -> impl Strategy<Value = ParamSeed> {
    (
        any::<bool>(),
        arb_scalar(),
        any::<bool>(),
        arb_scalar(),
        arb_storage(),
        any::<bool>(),
    )
        .prop_map(
            |(has_default, default, reuse_default, value, storage, computed)| ParamSeed {
                has_default,
                default,
                reuse_default,
                value,
                storage,
                computed,
            },
        )
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    any::<(bool, bool, bool)>().prop_map(|(prefer_keyword, skip_defaults, with_module_name)| {
        Policy::builder()
            .prefer_keyword(prefer_keyword)
            .skip_defaults(skip_defaults)
            .with_module_name(with_module_name)
            .build()
    })
}

fn store(object: DynObject, name: &str, value: Value, storage: Storage, computed: bool) -> DynObject {
    let name = match storage {
        Storage::Exact => name.to_string(),
        Storage::Prefixed => format!("_{name}"),
        Storage::Suffixed => format!("{name}_"),
    };
    if computed {
        object.with_computed(name, move |_| value.clone())
    } else {
        object.with(name, value)
    }
}

struct CaseBuilder {
    routine: Routine,
    object: DynObject,
    fields: Vec<(String, Value)>,
    complex: bool,
}

impl CaseBuilder {
    fn next_name(&self) -> String {
        format!("p{}", self.fields.len())
    }

    fn add(mut self, kind: ParameterKind, seed: ParamSeed) -> Self {
        let name = self.next_name();
        let mut parameter = Parameter::new(name.clone(), kind);
        let value = if seed.has_default {
            parameter = parameter.with_default(seed.default.clone());
            if seed.reuse_default { seed.default } else { seed.value }
        } else {
            seed.value
        };
        let storage = if self.complex { seed.storage } else { Storage::Exact };

        self.routine = self.routine.parameter(parameter);
        self.object = store(self.object, &name, value.clone(), storage, seed.computed);
        self.fields.push((name, value));
        self
    }

    fn add_variadic(mut self, kind: ParameterKind, value: Value) -> Self {
        let name = self.next_name();
        self.routine = self.routine.parameter(Parameter::new(name.clone(), kind));
        self.object = store(self.object, &name, value.clone(), Storage::Exact, false);
        self.fields.push((name, value));
        self
    }
}

prop_compose! {
    fn arb_case()(
        positional_only in vec(arb_seed(), 0..3),
        positional_or_keyword in vec(arb_seed(), 0..3),
        var_positional in proptest::option::of(vec(arb_scalar(), 0..3)),
        keyword_only in vec(arb_seed(), 0..3),
        var_keyword in proptest::option::of(vec(arb_scalar(), 0..3)),
        routine_kind in 0u8..3,
        policy in arb_policy(),
        complex in any::<bool>(),
    ) -> (Case, bool) {
        let routine = match routine_kind {
            0 => Routine::initializer(),
            1 => Routine::class_method("create"),
            _ => Routine::static_method("create"),
        };
        let mut builder = CaseBuilder {
            routine,
            object: DynObject::new(ClassRef::new(MODULE, "Sample")),
            fields: Vec::new(),
            complex,
        };

        // positional defaults must form a suffix
        let mut defaulted = false;
        let positional = positional_only
            .into_iter()
            .map(|seed| (ParameterKind::PositionalOnly, seed))
            .chain(
                positional_or_keyword
                    .into_iter()
                    .map(|seed| (ParameterKind::PositionalOrKeyword, seed)),
            );
        for (kind, mut seed) in positional {
            defaulted |= seed.has_default;
            seed.has_default = defaulted;
            builder = builder.add(kind, seed);
        }
        if let Some(items) = var_positional {
            builder = builder.add_variadic(ParameterKind::VarPositional, Value::Tuple(items));
        }
        for seed in keyword_only {
            builder = builder.add(ParameterKind::KeywordOnly, seed);
        }
        if let Some(values) = var_keyword {
            let entries = values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (Value::Str(format!("extra_{index}")), value))
                .collect();
            builder = builder.add_variadic(ParameterKind::VarKeyword, Value::Dict(entries));
        }

        let case = Case {
            routine: builder.routine,
            object: builder.object,
            fields: builder.fields,
            policy,
        };
        (case, complex)
    }
}

fn build_repr(case: &Case, complex: bool) -> Repr<DynObject> {
    let builder = Repr::<DynObject>::builder(&case.routine).policy(case.policy);
    let builder = if complex {
        builder.seeker(ComplexSeeker)
    } else {
        builder
    };
    builder.build().expect("generated routines are well formed")
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn rendered_calls_rebuild_fields((case, complex) in arb_case()) {
        let repr = build_repr(&case, complex);

        let rendered = repr.render(&case.object).expect("render");
        let call = parse_call(&rendered)
            .map_err(|error| TestCaseError::fail(format!("{rendered}: {error}")))?;
        let bound = bind(repr.signature(), &call)
            .map_err(|error| TestCaseError::fail(format!("{rendered}: {error}")))?;

        for (name, expected) in &case.fields {
            prop_assert_eq!(bound.get(name), Some(expected), "{}", rendered);
        }

        let mut head = if case.policy.with_module_name {
            format!("{MODULE}.Sample")
        } else {
            "Sample".to_string()
        };
        if !case.routine.is_initializer() {
            head.push_str(".create");
        }
        prop_assert_eq!(&call.head, &head);
        if case.policy.with_module_name {
            prop_assert!(rendered.starts_with(MODULE));
        }
    }

    #[test]
    fn skipping_defaults_never_adds_arguments((case, complex) in arb_case()) {
        let shown = build_repr(
            &Case { policy: Policy { skip_defaults: false, ..case.policy }, ..case.clone() },
            complex,
        );
        let skipped = build_repr(
            &Case { policy: Policy { skip_defaults: true, ..case.policy }, ..case.clone() },
            complex,
        );

        let all = shown.arguments(&case.object).expect("render");
        let fewer = skipped.arguments(&case.object).expect("render");

        prop_assert!(fewer.len() <= all.len());
        prop_assert_eq!(skipped.render(&case.object).expect("render"), skipped.render(&case.object).expect("render"));
    }
}
