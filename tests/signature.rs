//! Call-shape checks against built signatures.

use eidos_syntax::{
    DefaultValue, Error, Shaped, Signature, TypeErrorKind, ValueMask, ValueShape, ValueType,
};

fn int() -> ValueShape {
    ValueShape::singleton(ValueType::Int)
}

fn string() -> ValueShape {
    ValueShape::singleton(ValueType::String)
}

fn int_then_optional_string() -> Signature {
    Signature::build("f")
        .returns(ValueMask::VOID)
        .add_int("n")
        .add_string_os("label")
        .finish()
}

// -----------------------------------------------------------
// Required plus optional singleton.
// -----------------------------------------------------------

#[test]
fn accepts_required_only() {
    assert!(int_then_optional_string().check_arguments("function", &[int()]).is_ok());
}

#[test]
fn accepts_required_and_optional() {
    let sig = int_then_optional_string();
    assert!(sig.check_arguments("function", &[int(), string()]).is_ok());
}

#[test]
fn rejects_wrong_type_in_first_position() {
    let err = int_then_optional_string()
        .check_arguments("function", &[string()])
        .unwrap_err();
    assert_eq!(
        err.kind,
        TypeErrorKind::ArgumentType {
            position: 1,
            name: "n".to_string(),
            expected: ValueMask::INT,
            found: ValueType::String,
        }
    );
}

#[test]
fn rejects_too_many() {
    let err = int_then_optional_string()
        .check_arguments("function", &[int(), string(), string()])
        .unwrap_err();
    assert_eq!(
        err.kind,
        TypeErrorKind::TooManyArguments {
            max: 2,
            supplied: 3,
        }
    );
}

#[test]
fn rejects_non_singleton_optional() {
    let err = int_then_optional_string()
        .check_arguments("function", &[int(), ValueShape::new(ValueType::String, 3)])
        .unwrap_err();
    assert_eq!(
        err.kind,
        TypeErrorKind::ArgumentNotSingleton {
            position: 2,
            name: "label".to_string(),
            count: 3,
        }
    );
    assert_eq!(
        err.to_string(),
        "argument 2 (label) must be a singleton (size() == 1), but size() == 3 in function f()"
    );
}

#[test]
fn rejects_missing_required() {
    let empty: [ValueShape; 0] = [];
    let err = int_then_optional_string()
        .check_arguments("function", &empty)
        .unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::MissingArgument { position: 1, .. }));
}

// -----------------------------------------------------------
// Masks and flavours.
// -----------------------------------------------------------

#[test]
fn numeric_accepts_int_and_float_vectors() {
    let sig = Signature::build("sum").returns(ValueMask::NUMERIC).add_numeric("x").finish();
    for ty in [ValueType::Int, ValueType::Float] {
        assert!(sig.check_arguments("function", &[ValueShape::new(ty, 5)]).is_ok());
    }
    assert!(sig.check_arguments("function", &[string()]).is_err());
}

#[test]
fn logical_equivalent_and_any_base() {
    let sig = Signature::build("g")
        .add_logical_equiv("a")
        .add_any_base("b")
        .add_any_o("c")
        .finish();
    let ok = [
        ValueShape::singleton(ValueType::Logical),
        ValueShape::null(),
        ValueShape::singleton(ValueType::Object),
    ];
    assert!(sig.check_arguments("function", &ok).is_ok());

    let bad = [ValueShape::singleton(ValueType::Logical), ValueShape::singleton(ValueType::Object)];
    let err = sig.check_arguments("function", &bad).unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::ArgumentType { position: 2, .. }));
}

#[test]
fn optional_flavours_mark_arguments() {
    let sig = Signature::build("h")
        .add_float("a")
        .add_object_s("b")
        .add_logical_o("c")
        .add_int_os("d")
        .finish();
    let flags: Vec<(bool, bool)> = sig
        .arguments()
        .iter()
        .map(|a| (a.is_optional(), a.is_singleton()))
        .collect();
    assert_eq!(flags, [(false, false), (false, true), (true, false), (true, true)]);
    assert_eq!(sig.required_count(), 2);
}

#[test]
fn custom_masks() {
    let sig = Signature::build("k")
        .add_arg(ValueMask::INT | ValueMask::STRING, "key")
        .add_arg_o(ValueMask::FLOAT | ValueMask::SINGLETON, "weight")
        .finish();
    assert_eq!(sig.to_string(), "(void)k(integer|string key, [float$ weight])");
    assert!(sig.check_arguments("function", &[string()]).is_ok());
}

#[test]
fn add_arg_drops_optional_bit() {
    let sig = Signature::build("k")
        .add_arg(ValueMask::INT | ValueMask::OPTIONAL, "x")
        .finish();
    assert_eq!(sig.required_count(), 1);
}

#[test]
fn ellipsis_after_optional() {
    let sig = Signature::build("cat")
        .add_any("first")
        .add_string_o("sep")
        .add_ellipsis()
        .finish();
    assert!(sig.has_ellipsis());
    assert_eq!(sig.to_string(), "(void)cat(* first, [string sep], ...)");
    let args = vec![int(); 7];
    // only declared positions are checked
    let err = sig.check_arguments("function", &args).unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::ArgumentType { position: 2, .. }));
}

#[test]
fn identity_is_kept() {
    let sig = Signature::build("rnorm").identity(42).returns(ValueMask::FLOAT).finish();
    assert_eq!(sig.identity(), 42);
    assert_eq!(sig.name(), "rnorm");
    assert_eq!(sig.return_mask(), ValueMask::FLOAT);
}

// -----------------------------------------------------------
// Returns.
// -----------------------------------------------------------

#[test]
fn return_check_for_methods() {
    let sig = Signature::build("size")
        .returns(ValueMask::INT | ValueMask::SINGLETON)
        .finish();
    assert!(sig.check_return("method", &int()).is_ok());

    let err = sig.check_return("method", &ValueShape::new(ValueType::Float, 1)).unwrap_err();
    assert_eq!(err.call_kind, "method");
    assert_eq!(err.callee, "size");
    assert_eq!(
        err.to_string(),
        "return value cannot be type float; expected integer$ in method size()"
    );
}

#[test]
fn type_errors_convert_into_crate_error() {
    let sig = int_then_optional_string();
    let err: Error = sig.check_arguments("function", &[string()]).unwrap_err().into();
    assert!(matches!(err, Error::Type(_)));
    assert_eq!(err.span(), None);
}

// -----------------------------------------------------------
// Host value types.
// -----------------------------------------------------------

struct HostVector {
    ty: ValueType,
    values: Vec<f64>,
}

impl Shaped for HostVector {
    fn value_type(&self) -> ValueType {
        self.ty
    }

    fn count(&self) -> usize {
        self.values.len()
    }
}

#[test]
fn host_values_through_references() {
    let sig = Signature::build("mean").add_numeric("x").add_float_os("trim").finish();
    let x = HostVector {
        ty: ValueType::Float,
        values: vec![1.0, 2.0, 3.0],
    };
    let trim = HostVector {
        ty: ValueType::Float,
        values: vec![0.1],
    };
    let args: Vec<&HostVector> = vec![&x, &trim];
    assert!(sig.check_arguments("function", &args).is_ok());

    let boxed: Vec<Box<dyn Shaped>> = vec![Box::new(x), Box::new(trim)];
    assert!(sig.check_arguments("function", &boxed).is_ok());
}

// -----------------------------------------------------------
// Object classes and defaults.
// -----------------------------------------------------------

fn add_new_mutation() -> Signature {
    Signature::build("addNewMutation")
        .returns(ValueMask::OBJECT | ValueMask::SINGLETON)
        .returns_class("Mutation")
        .add_int_object_of_s("mutationType", "MutationType")
        .add_numeric_s("selectionCoeff")
        .add_int_s("position")
        .add_int_osn("originGeneration")
        .add_int_object_of_osn("originSubpop", "Subpopulation")
        .finish()
}

#[test]
fn object_class_is_checked() {
    let sig = add_new_mutation();
    let ok = [
        ValueShape::objects("MutationType", 1),
        ValueShape::singleton(ValueType::Float),
        int(),
    ];
    assert!(sig.check_arguments("method", &ok).is_ok());

    let wrong = [
        ValueShape::objects("Subpopulation", 1),
        ValueShape::singleton(ValueType::Float),
        int(),
    ];
    let err = sig.check_arguments("method", &wrong).unwrap_err();
    assert_eq!(
        err.kind,
        TypeErrorKind::ArgumentClass {
            position: 1,
            name: "mutationType".to_string(),
            expected: "MutationType".to_string(),
            found: "Subpopulation".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "argument 1 (mutationType) cannot be object element type Subpopulation; \
         expected object element type MutationType in method addNewMutation()"
    );
}

#[test]
fn class_ignored_for_non_objects_and_unknown_classes() {
    let sig = add_new_mutation();
    let by_id = [int(), ValueShape::singleton(ValueType::Float), int()];
    assert!(sig.check_arguments("method", &by_id).is_ok());

    let unknown = [
        ValueShape::singleton(ValueType::Object),
        ValueShape::singleton(ValueType::Float),
        int(),
    ];
    assert!(sig.check_arguments("method", &unknown).is_ok());
}

#[test]
fn nullable_optional_defaults_to_null() {
    let sig = add_new_mutation();
    let origin = &sig.arguments()[3];
    assert!(origin.is_optional());
    assert!(origin.is_singleton());
    assert!(origin.mask.accepts(ValueType::Null));
    assert_eq!(origin.default, Some(DefaultValue::Null));

    let args = [
        ValueShape::objects("MutationType", 1),
        ValueShape::singleton(ValueType::Float),
        int(),
        ValueShape::null(),
        ValueShape::objects("Subpopulation", 1),
    ];
    assert!(sig.check_arguments("method", &args).is_ok());
}

#[test]
fn explicit_defaults() {
    let sig = Signature::build("output")
        .add_string_osn("filePath")
        .add_logical_os("append")
        .defaults_to(false)
        .add_float_o("scale")
        .defaults_to(0.5)
        .add_string_o("sep")
        .defaults_to("\t")
        .add_int_os("limit")
        .defaults_to(10_i64)
        .finish();
    let defaults: Vec<Option<DefaultValue>> =
        sig.arguments().iter().map(|a| a.default.clone()).collect();
    assert_eq!(
        defaults,
        [
            Some(DefaultValue::Null),
            Some(DefaultValue::Logical(false)),
            Some(DefaultValue::Float(0.5)),
            Some(DefaultValue::Str("\t".to_string())),
            Some(DefaultValue::Int(10)),
        ]
    );
    assert_eq!(
        sig.to_string(),
        "(void)output([NULL|string$ filePath = NULL], [logical$ append = F], \
         [float scale = 0.5], [string sep = \"\\t\"], [integer$ limit = 10])"
    );
}

#[test]
fn prototype_shows_classes() {
    assert_eq!(
        add_new_mutation().to_string(),
        "(object<Mutation>$)addNewMutation(integer|object<MutationType>$ mutationType, \
         numeric$ selectionCoeff, integer$ position, [NULL|integer$ originGeneration = NULL], \
         [NULL|integer|object<Subpopulation>$ originSubpop = NULL])"
    );
}

#[test]
fn return_class_is_checked() {
    let sig = add_new_mutation();
    assert!(sig.check_return("method", &ValueShape::objects("Mutation", 1)).is_ok());

    let err = sig
        .check_return("method", &ValueShape::objects("Genome", 1))
        .unwrap_err();
    assert_eq!(
        err.kind,
        TypeErrorKind::ReturnClass {
            expected: "Mutation".to_string(),
            found: "Genome".to_string(),
        }
    );
    assert_eq!(sig.return_class(), Some("Mutation"));
}
