//! Parse a script and dump its tokens and tree.

use eidos_syntax::{Script, ScriptOptions};

fn main() {
    let input = "\
x = c(1, 2, 3);
for (v in x)
{
    if (v % 2 == 0) print(v); else next;
}
total = sum(x) * -1
";

    let mut script = Script::new(input, 0);
    let root = script
        .compile(ScriptOptions::default())
        .expect("parse failed")
        .clone();

    println!("Statements: {}", root.children.len());
    for statement in &root.children {
        let text = script.text_for_span(statement.full_span()).unwrap_or_default();
        println!("  {} => {statement}", text.lines().next().unwrap_or_default());
    }

    println!("\nTokens:\n{}", script.token_dump());
    println!("\nTree:\n{}", script.ast_dump());
}
