//! Demonstrate error handling for invalid scripts.

use eidos_syntax::{Error, Script, ScriptOptions};

fn show(source: &str) {
    let mut script = Script::new(source, 0);
    match script.compile(ScriptOptions::default()) {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: characters {} to {}", e.span.start, e.span.end);
        }
        Err(Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            if let Some(text) = script.text_for_span(e.span) {
                println!("  Near: {text:?}");
            }
        }
        Err(Error::Type(e)) => println!("Type error: {e}"),
        Err(e @ Error::NotTokenized) => println!("Script error: {e}"),
    }
    println!();
}

fn main() {
    // Unterminated string literal
    show("print(\"unclosed);\n");

    // Exponent without digits
    show("x = 1e;");

    // Missing closing parenthesis
    show("if (x > 1 { y = 2; }");

    // Unclosed brace
    show("while (T) {\n    x = x + 1;\n");
}
