//! Describe native functions and check call shapes against them.

use eidos_syntax::{Signature, ValueMask, ValueShape, ValueType};

fn main() {
    let signatures = [
        Signature::build("rep")
            .returns(ValueMask::ANY)
            .add_any("x")
            .add_int_s("count")
            .finish(),
        Signature::build("paste")
            .returns(ValueMask::STRING | ValueMask::SINGLETON)
            .add_any_base("x")
            .add_string_os("sep")
            .finish(),
        Signature::build("c")
            .returns(ValueMask::ANY)
            .add_ellipsis()
            .finish(),
    ];

    for sig in &signatures {
        println!("{sig}");
    }
    println!();

    let rep = &signatures[0];
    let calls = [
        vec![ValueShape::new(ValueType::Float, 3), ValueShape::singleton(ValueType::Int)],
        vec![ValueShape::new(ValueType::Float, 3)],
        vec![ValueShape::new(ValueType::Float, 3), ValueShape::new(ValueType::Int, 2)],
        vec![ValueShape::new(ValueType::Float, 3), ValueShape::singleton(ValueType::String)],
    ];
    for args in &calls {
        match rep.check_arguments("function", args) {
            Ok(()) => println!("ok: {} argument(s)", args.len()),
            Err(e) => println!("error: {e}"),
        }
    }

    let paste = &signatures[1];
    match paste.check_return("function", &ValueShape::new(ValueType::String, 2)) {
        Ok(()) => println!("return ok"),
        Err(e) => println!("error: {e}"),
    }
    println!();

    // Methods on host objects can pin the element class of their arguments.
    let count_of_type = Signature::build("countOfMutationsOfType")
        .returns(ValueMask::INT | ValueMask::SINGLETON)
        .add_int_object_of_s("mutType", "MutationType")
        .add_logical_os("substitutions")
        .defaults_to(false)
        .finish();
    println!("{count_of_type}");
    for arg in [
        ValueShape::objects("MutationType", 1),
        ValueShape::objects("Genome", 1),
        ValueShape::singleton(ValueType::Int),
    ] {
        match count_of_type.check_arguments("method", &[arg]) {
            Ok(()) => println!("ok: {:?}", arg.class.unwrap_or("integer id")),
            Err(e) => println!("error: {e}"),
        }
    }
}
